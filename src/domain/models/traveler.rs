//! Traveler group model.
//!
//! Not destination-scoped: the group is held and mutated independently of
//! destination records and feeds derived computations such as room
//! suggestions.

use serde::{Deserialize, Serialize};

/// Adult/child/infant head counts for the trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelerGroup {
    pub adults: u8,
    pub children: u8,
    pub infants: u8,
}

impl Default for TravelerGroup {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
            infants: 0,
        }
    }
}

impl TravelerGroup {
    pub fn new(adults: u8, children: u8, infants: u8) -> Self {
        Self {
            adults,
            children,
            infants,
        }
    }

    /// Seated travelers (infants ride on laps).
    pub fn seats(&self) -> u16 {
        u16::from(self.adults) + u16::from(self.children)
    }

    pub fn total(&self) -> u16 {
        self.seats() + u16::from(self.infants)
    }

    /// Suggested room count: two adults per room, children folded in one per
    /// room where possible.
    pub fn suggested_rooms(&self) -> u16 {
        if self.adults == 0 {
            return 0;
        }
        let rooms = u16::from(self.adults).div_ceil(2);
        let child_overflow = u16::from(self.children).saturating_sub(rooms);
        rooms + child_overflow.div_ceil(2)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.adults == 0 && self.total() > 0 {
            return Err("children or infants require at least one adult".to_string());
        }
        Ok(())
    }
}
