//! Flight memory store.
//!
//! Owns the leg list and trip topology. The destination set required of
//! dependent stores is derived here: one destination for one-way and
//! round-trip, one per distinct non-origin city for multi-city. Origin legs
//! never materialize as destinations.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::destination::{normalize_city, Destination};
use crate::domain::models::flight::{FlightLeg, TripType};

use super::super::sync_service::DestinationSyncService;

/// Leg summary exposed to the assistant (no ids).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegSummary {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure: Option<NaiveDate>,
}

/// LLM-consumable store summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedFlightState {
    pub trip_type: TripType,
    pub total_legs: usize,
    pub legs: Vec<LegSummary>,
}

/// Legs plus topology.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlightStore {
    legs: Vec<FlightLeg>,
    trip_type: TripType,
}

impl FlightStore {
    pub fn new(trip_type: TripType) -> Self {
        Self {
            legs: Vec::new(),
            trip_type,
        }
    }

    pub fn trip_type(&self) -> TripType {
        self.trip_type
    }

    /// Switch topology. Returns the transition when it actually changed.
    pub fn set_trip_type(&mut self, trip_type: TripType) -> Option<(TripType, TripType)> {
        if self.trip_type == trip_type {
            return None;
        }
        let previous = self.trip_type;
        self.trip_type = trip_type;
        Some((previous, trip_type))
    }

    /// Insert or replace a leg by id. Returns the new leg count.
    pub fn upsert_leg(&mut self, leg: FlightLeg) -> usize {
        match self.legs.iter_mut().find(|l| l.id == leg.id) {
            Some(existing) => *existing = leg,
            None => self.legs.push(leg),
        }
        self.legs.len()
    }

    pub fn remove_leg(&mut self, id: Uuid) -> bool {
        let before = self.legs.len();
        self.legs.retain(|l| l.id != id);
        self.legs.len() != before
    }

    pub fn legs(&self) -> &[FlightLeg] {
        &self.legs
    }

    pub fn leg(&self, id: Uuid) -> Option<&FlightLeg> {
        self.legs.iter().find(|l| l.id == id)
    }

    /// The destination set the current topology requires of dependent
    /// stores.
    pub fn required_destinations(&self, sync: &DestinationSyncService) -> Vec<Destination> {
        match self.trip_type {
            TripType::OneWay | TripType::RoundTrip => self
                .legs
                .first()
                .map(|leg| sync.normalize_from_flight(&leg.destination, leg.id))
                .into_iter()
                .collect(),
            TripType::MultiCity => {
                // The home origin never becomes a destination, and repeated
                // visits to one city collapse to a single destination.
                let home = self
                    .legs
                    .first()
                    .map(|leg| normalize_city(&leg.origin.city));
                let mut seen = HashSet::new();
                let mut destinations = Vec::new();
                for leg in &self.legs {
                    let city = normalize_city(&leg.destination.city);
                    if Some(&city) == home.as_ref() {
                        continue;
                    }
                    if seen.insert(city) {
                        destinations.push(sync.normalize_from_flight(&leg.destination, leg.id));
                    }
                }
                destinations
            }
        }
    }

    pub fn serialized_state(&self) -> SerializedFlightState {
        SerializedFlightState {
            trip_type: self.trip_type,
            total_legs: self.legs.len(),
            legs: self
                .legs
                .iter()
                .map(|leg| LegSummary {
                    from: leg.origin.city.clone(),
                    to: leg.destination.city.clone(),
                    departure: leg.departure,
                })
                .collect(),
        }
    }
}
