//! Traveler memory store.

use serde::{Deserialize, Serialize};

use crate::domain::models::traveler::TravelerGroup;

/// LLM-consumable store summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedTravelerState {
    pub adults: u8,
    pub children: u8,
    pub infants: u8,
    pub total: u16,
    pub suggested_rooms: u16,
}

/// Holds the traveler group. Not destination-scoped; no protection flags
/// apply because nothing propagates into it automatically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TravelerStore {
    group: TravelerGroup,
}

impl TravelerStore {
    pub fn new(group: TravelerGroup) -> Self {
        Self { group }
    }

    pub fn group(&self) -> TravelerGroup {
        self.group
    }

    /// Replace the group after validation. Invalid groups are rejected and
    /// the previous counts stay live.
    pub fn set_group(&mut self, group: TravelerGroup) -> Result<(), String> {
        group.validate()?;
        self.group = group;
        Ok(())
    }

    pub fn serialized_state(&self) -> SerializedTravelerState {
        SerializedTravelerState {
            adults: self.group.adults,
            children: self.group.children,
            infants: self.group.infants,
            total: self.group.total(),
            suggested_rooms: self.group.suggested_rooms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_group_is_rejected() {
        let mut store = TravelerStore::default();
        let err = store.set_group(TravelerGroup::new(0, 2, 0));
        assert!(err.is_err());
        assert_eq!(store.group().adults, 1, "previous group stays live");
    }

    #[test]
    fn test_serialized_state_includes_derived_rooms() {
        let mut store = TravelerStore::default();
        store.set_group(TravelerGroup::new(4, 1, 0)).unwrap();
        let state = store.serialized_state();
        assert_eq!(state.total, 5);
        assert_eq!(state.suggested_rooms, 2);
    }
}
