//! Flight domain model: airports, legs, and trip topology.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::destination::Coordinates;

/// Trip topology. Determines how many destination-scoped entries the
/// dependent stores must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripType {
    OneWay,
    RoundTrip,
    MultiCity,
}

impl Default for TripType {
    fn default() -> Self {
        Self::RoundTrip
    }
}

impl TripType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneWay => "one_way",
            Self::RoundTrip => "round_trip",
            Self::MultiCity => "multi_city",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "one_way" | "oneway" | "one-way" => Some(Self::OneWay),
            "round_trip" | "roundtrip" | "round-trip" => Some(Self::RoundTrip),
            "multi_city" | "multi" | "multi-city" => Some(Self::MultiCity),
            _ => None,
        }
    }

    /// Whether this topology carries more than one destination.
    pub fn is_multi(&self) -> bool {
        matches!(self, Self::MultiCity)
    }
}

impl std::fmt::Display for TripType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Airport record as received from the flight surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    /// IATA code, e.g. "NRT".
    pub code: String,
    pub city: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl Airport {
    pub fn new(
        code: impl Into<String>,
        city: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            city: city.into(),
            country_code: country_code.into(),
            coordinates: None,
        }
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.coordinates = Some(Coordinates {
            latitude,
            longitude,
        });
        self
    }
}

/// A single flight leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightLeg {
    pub id: Uuid,
    pub origin: Airport,
    pub destination: Airport,
    /// Departure date when the user has picked one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure: Option<NaiveDate>,
}

impl FlightLeg {
    pub fn new(origin: Airport, destination: Airport) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            destination,
            departure: None,
        }
    }

    pub fn with_departure(mut self, date: NaiveDate) -> Self {
        self.departure = Some(date);
        self
    }
}
