//! Canonical destination model.
//!
//! A [`Destination`] is the normalized representation of a trip stop. It is
//! produced only by the sync service and is immutable once created: a later
//! sync replaces it wholesale rather than mutating in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a destination.
///
/// Ids are derived (uuid v5) from the normalized city + country pair so that
/// re-normalizing the same stop always yields the same id. User sync
/// overrides are keyed by destination id and must survive re-propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DestinationId(pub Uuid);

impl DestinationId {
    /// Derive the stable id for a city/country pair.
    pub fn derive(city: &str, country_code: &str) -> Self {
        let key = format!(
            "tripsync:destination:{}/{}",
            normalize_city(city),
            country_code.trim().to_uppercase()
        );
        Self(Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes()))
    }
}

impl std::fmt::Display for DestinationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which surface produced a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationSource {
    Flight,
    Accommodation,
    Activity,
    Manual,
}

impl DestinationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flight => "flight",
            Self::Accommodation => "accommodation",
            Self::Activity => "activity",
            Self::Manual => "manual",
        }
    }
}

impl std::fmt::Display for DestinationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A normalized trip stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    /// Stable id derived from city + country.
    pub id: DestinationId,
    /// Display city name as received from the source surface.
    pub city: String,
    /// ISO 3166-1 alpha-2 country code, uppercased.
    pub country_code: String,
    /// Coordinates when the source record carried them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// Surface that produced this destination.
    pub source: DestinationSource,
    /// When the sync service produced this destination.
    pub synced_at: DateTime<Utc>,
}

impl Destination {
    /// City name normalized for comparison (trimmed, lowercased).
    pub fn normalized_city(&self) -> String {
        normalize_city(&self.city)
    }
}

/// Normalize a city name for matching. All city comparisons in the engine go
/// through this so "Tokyo", " tokyo " and "TOKYO" refer to the same stop.
pub fn normalize_city(city: &str) -> String {
    city.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_id_is_stable() {
        let a = DestinationId::derive("Tokyo", "JP");
        let b = DestinationId::derive("  TOKYO ", "jp");
        assert_eq!(a, b);
    }

    #[test]
    fn test_destination_id_distinguishes_country() {
        let a = DestinationId::derive("Paris", "FR");
        let b = DestinationId::derive("Paris", "US");
        assert_ne!(a, b);
    }

    #[test]
    fn test_normalize_city() {
        assert_eq!(normalize_city("  New York "), "new york");
        assert_eq!(normalize_city("LISBON"), "lisbon");
    }
}
