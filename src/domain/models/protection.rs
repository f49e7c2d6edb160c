//! Field protection flags.
//!
//! Protection flags are plain data on each entry; all interpretation of the
//! flags lives in the conflict policy (`services::conflict_policy`). A flag is
//! monotonic: once a direct user edit sets it, no automated propagation may
//! write the protected family, and nothing clears the flag except an explicit
//! user-initiated un-protect.

use serde::{Deserialize, Serialize};

/// Field families that carry a companion protection flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldFamily {
    Dates,
    Budget,
}

impl FieldFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dates => "dates",
            Self::Budget => "budget",
        }
    }
}

impl std::fmt::Display for FieldFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-entry protection state, one flag per field family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionFlags {
    #[serde(default)]
    pub user_modified_dates: bool,
    #[serde(default)]
    pub user_modified_budget: bool,
}

impl ProtectionFlags {
    pub fn is_protected(&self, family: FieldFamily) -> bool {
        match family {
            FieldFamily::Dates => self.user_modified_dates,
            FieldFamily::Budget => self.user_modified_budget,
        }
    }

    /// Mark a family as user-owned. Only the conflict policy calls this, on
    /// direct writes.
    pub fn protect(&mut self, family: FieldFamily) {
        match family {
            FieldFamily::Dates => self.user_modified_dates = true,
            FieldFamily::Budget => self.user_modified_budget = true,
        }
    }

    /// Clear a family. Only reachable through the store's explicit
    /// user-initiated un-protect operation.
    pub fn clear(&mut self, family: FieldFamily) {
        match family {
            FieldFamily::Dates => self.user_modified_dates = false,
            FieldFamily::Budget => self.user_modified_budget = false,
        }
    }

    pub fn any(&self) -> bool {
        self.user_modified_dates || self.user_modified_budget
    }
}
