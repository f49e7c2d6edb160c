//! Destination normalization and sync eligibility.
//!
//! Converts heterogeneous source data (a flight leg's arrival airport, a
//! manually selected city) into the canonical [`Destination`] shape, and
//! decides per target store whether propagation is currently allowed.
//! Destinations are produced here and nowhere else.
//!
//! Blocking is stored as set membership per target store, not as a property
//! of the destination, so the same destination can be blocked for
//! accommodation while still propagating freely to activity. Override sets
//! are session state: they are not part of any persisted snapshot.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::dates::DateRange;
use crate::domain::models::destination::{
    Destination, DestinationId, DestinationSource,
};
use crate::domain::models::flight::{Airport, FlightLeg};

use super::event_bus::SyncTarget;

/// Sync state of a destination with respect to one target store. Purely for
/// UI display; computing it performs no mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "status")]
pub enum SyncStatus {
    /// Auto-synced from a source surface at the given time.
    Synced { synced_at: DateTime<Utc> },
    /// The user is editing this target independently; propagation is off.
    Blocked,
    /// The destination was entered manually and never auto-synced.
    Manual,
}

/// Per-target eligibility for one propagation attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub eligible: Vec<SyncTarget>,
    pub blocked: Vec<SyncTarget>,
}

/// Destination normalization and per-target propagation gate.
#[derive(Debug, Default)]
pub struct DestinationSyncService {
    overrides: HashMap<SyncTarget, HashSet<DestinationId>>,
}

impl DestinationSyncService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a flight leg's arrival airport into a destination.
    pub fn normalize_from_flight(&self, airport: &Airport, leg_id: Uuid) -> Destination {
        let destination = Destination {
            id: DestinationId::derive(&airport.city, &airport.country_code),
            city: airport.city.trim().to_string(),
            country_code: airport.country_code.trim().to_uppercase(),
            coordinates: airport.coordinates,
            source: DestinationSource::Flight,
            synced_at: Utc::now(),
        };
        tracing::debug!(
            city = %destination.city,
            leg_id = %leg_id,
            "normalized destination from flight leg"
        );
        destination
    }

    /// Normalize a manually selected city.
    pub fn normalize_manual(
        &self,
        city: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Destination {
        let city = city.into();
        let country_code: String = country_code.into();
        Destination {
            id: DestinationId::derive(&city, &country_code),
            city: city.trim().to_string(),
            country_code: country_code.trim().to_uppercase(),
            coordinates: None,
            source: DestinationSource::Manual,
            synced_at: Utc::now(),
        }
    }

    /// Split `targets` into those the destination may propagate to and those
    /// currently blocked by a user override.
    pub fn propagate(&self, destination: &Destination, targets: &[SyncTarget]) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();
        for &target in targets {
            if self.is_blocked(target, destination.id) {
                outcome.blocked.push(target);
            } else {
                outcome.eligible.push(target);
            }
        }
        outcome
    }

    /// Suppress propagation of a destination into one target store. Called
    /// when the user begins editing that destination independently.
    pub fn block_sync(&mut self, target: SyncTarget, destination_id: DestinationId) {
        self.overrides
            .entry(target)
            .or_default()
            .insert(destination_id);
        tracing::info!(%target, %destination_id, "sync blocked by user override");
    }

    /// Re-enable propagation. Explicit, user-initiated.
    pub fn unblock_sync(&mut self, target: SyncTarget, destination_id: DestinationId) {
        if let Some(set) = self.overrides.get_mut(&target) {
            set.remove(&destination_id);
        }
    }

    pub fn is_blocked(&self, target: SyncTarget, destination_id: DestinationId) -> bool {
        self.overrides
            .get(&target)
            .is_some_and(|set| set.contains(&destination_id))
    }

    /// Sync state for display. Side-effect-free and referentially stable for
    /// the same inputs.
    pub fn sync_status(&self, destination: &Destination, target: SyncTarget) -> SyncStatus {
        if self.is_blocked(target, destination.id) {
            return SyncStatus::Blocked;
        }
        match destination.source {
            DestinationSource::Manual => SyncStatus::Manual,
            _ => SyncStatus::Synced {
                synced_at: destination.synced_at,
            },
        }
    }

    /// Derive per-city stay windows from consecutive leg departures: the stay
    /// in leg N's destination runs from leg N's departure to leg N+1's. The
    /// final leg opens no window (the trip ends there or returns home).
    pub fn stay_windows(legs: &[FlightLeg]) -> Vec<(String, DateRange)> {
        let mut windows = Vec::new();
        for pair in legs.windows(2) {
            let (Some(arrive), Some(leave)) = (pair[0].departure, pair[1].departure) else {
                continue;
            };
            if let Some(range) = DateRange::new(arrive, leave) {
                windows.push((pair[0].destination.city.clone(), range));
            }
        }
        windows
    }
}
