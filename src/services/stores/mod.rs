//! Domain memory stores.
//!
//! Each store owns a collection of domain entries plus defaults, is
//! independently serializable, and exposes a narrow mutation surface
//! (`add` / `remove` / `update` / `update_batch`) so the conflict policy
//! remains the single choke point for protected fields.

pub mod accommodation;
pub mod activity;
pub mod flight;
pub mod traveler;

pub use accommodation::{AccommodationStore, SerializedAccommodationState};
pub use activity::{ActivityStore, SerializedActivityState};
pub use flight::{FlightStore, SerializedFlightState};
pub use traveler::{SerializedTravelerState, TravelerStore};

use uuid::Uuid;

/// Result of routing a destination into a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new entry was created for the destination's city.
    Created(Uuid),
    /// An entry for the city already existed and was linked to the
    /// destination; its fields were left alone.
    Linked(Uuid),
}

impl UpsertOutcome {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Created(id) | Self::Linked(id) => *id,
        }
    }

    pub fn created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}
