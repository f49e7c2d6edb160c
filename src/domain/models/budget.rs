//! Budget presets and explicit nightly ranges.

use serde::{Deserialize, Serialize};

/// Named budget tier. Each preset maps to a default nightly range; the user
/// can override the explicit range without leaving the preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPreset {
    Economy,
    Comfort,
    Premium,
    Luxury,
}

impl Default for BudgetPreset {
    fn default() -> Self {
        Self::Comfort
    }
}

impl BudgetPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Economy => "economy",
            Self::Comfort => "comfort",
            Self::Premium => "premium",
            Self::Luxury => "luxury",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "economy" | "eco" => Some(Self::Economy),
            "comfort" | "mid" => Some(Self::Comfort),
            "premium" => Some(Self::Premium),
            "luxury" => Some(Self::Luxury),
            _ => None,
        }
    }

    /// Default nightly range for the preset, in whole currency units.
    pub fn default_range(&self) -> BudgetRange {
        match self {
            Self::Economy => BudgetRange { min: 30, max: 90 },
            Self::Comfort => BudgetRange { min: 90, max: 180 },
            Self::Premium => BudgetRange { min: 180, max: 350 },
            Self::Luxury => BudgetRange { min: 350, max: 1000 },
        }
    }
}

impl std::fmt::Display for BudgetPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Explicit nightly min/max, overridable independently of the preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: u32,
    pub max: u32,
}

impl BudgetRange {
    /// Validate that the range is ordered.
    pub fn validate(&self) -> Result<(), String> {
        if self.min > self.max {
            return Err(format!(
                "budget min {} exceeds max {}",
                self.min, self.max
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for BudgetRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}
