//! Accommodation domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::budget::{BudgetPreset, BudgetRange};
use super::dates::DateRange;
use super::destination::{normalize_city, DestinationId};
use super::protection::ProtectionFlags;

/// Lodging category for a stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LodgingType {
    Hotel,
    Hostel,
    Apartment,
    Resort,
    Guesthouse,
}

impl Default for LodgingType {
    fn default() -> Self {
        Self::Hotel
    }
}

impl LodgingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hotel => "hotel",
            Self::Hostel => "hostel",
            Self::Apartment => "apartment",
            Self::Resort => "resort",
            Self::Guesthouse => "guesthouse",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "hotel" => Some(Self::Hotel),
            "hostel" => Some(Self::Hostel),
            "apartment" | "flat" => Some(Self::Apartment),
            "resort" => Some(Self::Resort),
            "guesthouse" | "guest_house" => Some(Self::Guesthouse),
            _ => None,
        }
    }
}

impl std::fmt::Display for LodgingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Store-level defaults applied to new entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccommodationDefaults {
    pub budget_preset: BudgetPreset,
    pub lodging_type: LodgingType,
}

impl Default for AccommodationDefaults {
    fn default() -> Self {
        Self {
            budget_preset: BudgetPreset::default(),
            lodging_type: LodgingType::default(),
        }
    }
}

/// One stay, keyed by city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccommodationEntry {
    pub id: Uuid,
    /// Free-text city name; compared case-insensitively.
    pub city: String,
    /// Backing destination when the entry was created or linked by sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_id: Option<DestinationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dates: Option<DateRange>,
    pub budget_preset: BudgetPreset,
    pub budget: BudgetRange,
    pub lodging_type: LodgingType,
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

impl AccommodationEntry {
    /// New entry carrying the given defaults.
    pub fn new(city: impl Into<String>, defaults: AccommodationDefaults) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            city: city.into(),
            destination_id: None,
            dates: None,
            budget_preset: defaults.budget_preset,
            budget: defaults.budget_preset.default_range(),
            lodging_type: defaults.lodging_type,
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

/// Partial, field-level update for an accommodation entry. Absent fields are
/// left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccommodationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dates: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_preset: Option<BudgetPreset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lodging_type: Option<LodgingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AccommodationPatch {
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

    pub fn lodging_type(mut self, lodging: LodgingType) -> Self {
        self.lodging_type = Some(lodging);
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
            && self.lodging_type.is_none()
            && self.notes.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_carries_defaults() {
        let defaults = AccommodationDefaults {
            budget_preset: BudgetPreset::Premium,
            lodging_type: LodgingType::Apartment,
        };
        let entry = AccommodationEntry::new("Lisbon", defaults);

        assert_eq!(entry.budget_preset, BudgetPreset::Premium);
        assert_eq!(entry.budget, BudgetPreset::Premium.default_range());
        assert_eq!(entry.lodging_type, LodgingType::Apartment);
        assert!(!entry.synced_from_destination);
        assert!(!entry.protection.any());
    }

    #[test]
    fn test_with_destination_marks_synced() {
        let entry = AccommodationEntry::new("Lisbon", AccommodationDefaults::default())
            .with_destination(DestinationId::derive("Lisbon", "PT"));
        assert!(entry.synced_from_destination);
        assert!(entry.destination_id.is_some());
    }

    #[test]
    fn test_patch_builder() {
        let patch = AccommodationPatch::default()
            .budget_preset(BudgetPreset::Luxury)
            .notes("near the waterfront");
        assert!(!patch.is_empty());
        assert_eq!(patch.budget_preset, Some(BudgetPreset::Luxury));
    }
}
