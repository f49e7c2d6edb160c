//! Activity domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::budget::{BudgetPreset, BudgetRange};
use super::dates::DateRange;
use super::destination::{normalize_city, DestinationId};
use super::protection::ProtectionFlags;

/// Activity category used when searching providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Sightseeing,
    Food,
    Outdoors,
    Culture,
    Nightlife,
    Shopping,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sightseeing => "sightseeing",
            Self::Food => "food",
            Self::Outdoors => "outdoors",
            Self::Culture => "culture",
            Self::Nightlife => "nightlife",
            Self::Shopping => "shopping",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sightseeing" => Some(Self::Sightseeing),
            "food" | "dining" => Some(Self::Food),
            "outdoors" | "outdoor" => Some(Self::Outdoors),
            "culture" | "cultural" => Some(Self::Culture),
            "nightlife" => Some(Self::Nightlife),
            "shopping" => Some(Self::Shopping),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Store-level defaults applied to new entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDefaults {
    pub budget_preset: BudgetPreset,
    pub activity_types: Vec<ActivityType>,
}

impl Default for ActivityDefaults {
    fn default() -> Self {
        Self {
            budget_preset: BudgetPreset::default(),
            activity_types: vec![ActivityType::Sightseeing],
        }
    }
}

/// Planned activities for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    /// Free-text city name; compared case-insensitively.
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_id: Option<DestinationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dates: Option<DateRange>,
    pub budget_preset: BudgetPreset,
    pub budget: BudgetRange,
    pub activity_types: Vec<ActivityType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// True when the sync service created this entry from a destination.
    #[serde(default)]
    pub synced_from_destination: bool,
    #[serde(default)]
    pub protection: ProtectionFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn new(city: impl Into<String>, defaults: &ActivityDefaults) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            city: city.into(),
            destination_id: None,
            dates: None,
            budget_preset: defaults.budget_preset,
            budget: defaults.budget_preset.default_range(),
            activity_types: defaults.activity_types.clone(),
            notes: None,
            synced_from_destination: false,
            protection: ProtectionFlags::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_destination(mut self, id: DestinationId) -> Self {
        self.destination_id = Some(id);
        self.synced_from_destination = true;
        self
    }

    pub fn normalized_city(&self) -> String {
        normalize_city(&self.city)
    }
}

/// Partial, field-level update for an activity entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dates: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_preset: Option<BudgetPreset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_types: Option<Vec<ActivityType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ActivityPatch {
    pub fn dates(mut self, dates: DateRange) -> Self {
        self.dates = Some(dates);
        self
    }

    pub fn budget_preset(mut self, preset: BudgetPreset) -> Self {
        self.budget_preset = Some(preset);
        self
    }

    pub fn budget(mut self, range: BudgetRange) -> Self {
        self.budget = Some(range);
        self
    }

    pub fn activity_types(mut self, types: Vec<ActivityType>) -> Self {
        self.activity_types = Some(types);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_none()
            && self.budget_preset.is_none()
            && self.budget.is_none()
            && self.activity_types.is_none()
            && self.notes.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_inherits_defaults() {
        let defaults = ActivityDefaults {
            budget_preset: BudgetPreset::Economy,
            activity_types: vec![ActivityType::Food, ActivityType::Culture],
        };
        let entry = ActivityEntry::new("Kyoto", &defaults);

        assert_eq!(entry.budget_preset, BudgetPreset::Economy);
        assert_eq!(entry.activity_types.len(), 2);
        assert!(!entry.protection.any());
    }

    #[test]
    fn test_activity_type_parsing() {
        assert_eq!(ActivityType::from_str("dining"), Some(ActivityType::Food));
        assert_eq!(ActivityType::from_str("spelunking"), None);
    }
}
