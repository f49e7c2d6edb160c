//! Chat targeting resolver.
//!
//! Maps a structured instruction (produced upstream by intent classification,
//! out of scope here) onto zero, one, or many store entries, then applies the
//! instruction's fields through the conflict policy with `Direct` origin: a
//! chat-issued, city-targeted edit is user intent and sets protection flags
//! exactly as a widget edit would. Store-to-store propagation, by contrast,
//! always runs with `Auto` origin.
//!
//! Targeting never fabricates: an unmatched city name comes back as
//! [`TargetingResult::NotFound`] carrying the attempted name, with zero
//! mutation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::accommodation::AccommodationPatch;
use crate::domain::models::activity::ActivityPatch;
use crate::domain::models::destination::normalize_city;

use super::conflict_policy::{ApplyOutcome, WriteOrigin};
use super::event_bus::SyncTarget;

/// Which entries an instruction addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "city")]
pub enum CityTarget {
    /// No city given: target the sole live entry, if there is exactly one.
    Implicit,
    /// Target every live entry.
    All,
    /// Target the entry matching this city name (case-insensitive).
    Named(String),
}

/// Domain-typed field updates carried by an instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "store", content = "fields")]
pub enum InstructionPatch {
    Accommodation(AccommodationPatch),
    Activity(ActivityPatch),
}

impl InstructionPatch {
    /// The store this instruction routes to.
    pub fn target_store(&self) -> SyncTarget {
        match self {
            Self::Accommodation(_) => SyncTarget::Accommodation,
            Self::Activity(_) => SyncTarget::Activity,
        }
    }
}

/// A structured chat instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub target: CityTarget,
    pub patch: InstructionPatch,
}

impl Instruction {
    pub fn accommodation(patch: AccommodationPatch) -> Self {
        Self {
            target: CityTarget::Implicit,
            patch: InstructionPatch::Accommodation(patch),
        }
    }

    pub fn activity(patch: ActivityPatch) -> Self {
        Self {
            target: CityTarget::Implicit,
            patch: InstructionPatch::Activity(patch),
        }
    }

    pub fn for_city(mut self, city: impl Into<String>) -> Self {
        self.target = CityTarget::Named(city.into());
        self
    }

    pub fn for_all(mut self) -> Self {
        self.target = CityTarget::All;
        self
    }
}

/// Result of resolving and applying one instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum TargetingResult {
    /// The instruction was applied to the listed cities. `outcomes` aligns
    /// with `cities` and records any fields skipped by protection.
    Applied {
        cities: Vec<String>,
        outcomes: Vec<ApplyOutcome>,
    },
    /// The named city matched no entry. Carries the attempted name verbatim;
    /// the resolver never guesses a different city.
    NotFound { city: String },
    /// Implicit targeting with no live entries.
    NoEntries,
    /// Implicit targeting with more than one live entry.
    Ambiguous { count: usize },
}

impl TargetingResult {
    /// User-facing explanation, suitable for echoing back through chat.
    pub fn describe(&self) -> String {
        match self {
            Self::Applied { cities, .. } => {
                format!("updated {}", cities.join(", "))
            }
            Self::NotFound { city } => {
                format!("no entry found for \"{city}\"; nothing was changed")
            }
            Self::NoEntries => "there are no entries to update yet".to_string(),
            Self::Ambiguous { count } => format!(
                "{count} cities are planned; name one (or say \"all\")"
            ),
        }
    }

    pub fn mutated(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Store surface the resolver needs. Implemented by the destination-scoped
/// memory stores.
pub trait Targetable {
    type Patch: Clone;

    /// `(id, city)` for every live entry, in store order.
    fn live_entries(&self) -> Vec<(Uuid, String)>;

    /// Policy-gated update. `None` for an unknown id (silent no-op).
    fn update(
        &mut self,
        id: Uuid,
        patch: Self::Patch,
        origin: WriteOrigin,
    ) -> Option<ApplyOutcome>;
}

/// Resolve `target` against `store` and apply `patch` to every match.
///
/// Each matched entry receives the whole patch in a single `update` call, so
/// multi-field instructions are one observable transition per entry.
pub fn resolve<S: Targetable>(
    store: &mut S,
    target: &CityTarget,
    patch: S::Patch,
) -> TargetingResult {
    let live = store.live_entries();

    let matched: Vec<(Uuid, String)> = match target {
        CityTarget::Implicit => match live.len() {
            0 => return TargetingResult::NoEntries,
            1 => live,
            n => return TargetingResult::Ambiguous { count: n },
        },
        CityTarget::All => {
            if live.is_empty() {
                return TargetingResult::NoEntries;
            }
            live
        }
        CityTarget::Named(name) => {
            let wanted = normalize_city(name);
            let matched: Vec<_> = live
                .into_iter()
                .filter(|(_, city)| normalize_city(city) == wanted)
                .collect();
            if matched.is_empty() {
                return TargetingResult::NotFound { city: name.clone() };
            }
            matched
        }
    };

    let mut cities = Vec::with_capacity(matched.len());
    let mut outcomes = Vec::with_capacity(matched.len());
    for (id, city) in matched {
        // Stale ids between live_entries() and update() cannot happen on the
        // single-threaded path, but update() tolerates them regardless.
        if let Some(outcome) = store.update(id, patch.clone(), WriteOrigin::Direct) {
            tracing::debug!(
                city = %city,
                applied = outcome.applied.len(),
                "chat instruction applied"
            );
            cities.push(city);
            outcomes.push(outcome);
        }
    }

    TargetingResult::Applied { cities, outcomes }
}
