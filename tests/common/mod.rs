//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across the integration suites.

#![allow(dead_code)]

use tripsync::domain::models::{Airport, FlightLeg};
use tripsync::services::TripEngine;

/// Airport fixture with a real-looking IATA code.
pub fn airport(code: &str, city: &str, country: &str) -> Airport {
    Airport::new(code, city, country)
}

/// Leg fixture between two cities (US origin, JP destinations by default).
pub fn leg(from: &str, to: &str) -> FlightLeg {
    FlightLeg::new(
        Airport::new("XXX", from, "US"),
        Airport::new("YYY", to, "JP"),
    )
}

/// Engine with a Boston -> Tokyo leg already finalized.
pub fn engine_with_tokyo() -> TripEngine {
    let engine = TripEngine::default();
    engine.finalize_flight_leg(leg("Boston", "Tokyo"));
    engine
}

/// Engine in multi-city mode with Tokyo and Osaka finalized.
pub fn engine_with_tokyo_osaka() -> TripEngine {
    let engine = TripEngine::default();
    engine.set_trip_type(tripsync::TripType::MultiCity);
    engine.finalize_flight_leg(leg("Boston", "Tokyo"));
    engine.finalize_flight_leg(leg("Tokyo", "Osaka"));
    engine
}
