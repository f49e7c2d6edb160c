//! Integration tests for topology reconciliation cardinality.
//!
//! Each trip-type transition must land on the exact entry count the new
//! topology requires, and a surviving city must come through any sequence of
//! switches with fields and protection flags intact.

use tripsync::domain::models::{AccommodationPatch, BudgetPreset, TripType};
use tripsync::services::{Instruction, TripEngine};

mod common;
use common::{engine_with_tokyo, engine_with_tokyo_osaka, leg};

#[test]
fn multi_to_round_trip_yields_one_entry() {
    let engine = engine_with_tokyo_osaka();
    assert_eq!(engine.accommodation().len(), 2);

    engine.set_trip_type(TripType::RoundTrip);
    assert_eq!(engine.accommodation().len(), 1);
    assert_eq!(engine.activity().len(), 1);
}

#[test]
fn round_trip_to_multi_yields_two_entries() {
    let engine = TripEngine::default();
    engine.finalize_flight_leg(leg("Boston", "Tokyo"));
    engine.finalize_flight_leg(leg("Tokyo", "Osaka"));
    assert_eq!(
        engine.accommodation().len(),
        1,
        "round-trip materializes only the first destination"
    );

    engine.set_trip_type(TripType::MultiCity);
    assert_eq!(engine.accommodation().len(), 2);
    assert_eq!(engine.activity().len(), 2);
}

#[test]
fn multi_to_one_way_yields_one_entry() {
    let engine = engine_with_tokyo_osaka();
    engine.set_trip_type(TripType::OneWay);
    assert_eq!(engine.accommodation().len(), 1);
}

#[test]
fn one_way_to_multi_yields_two_entries() {
    let engine = TripEngine::default();
    engine.set_trip_type(TripType::OneWay);
    engine.finalize_flight_leg(leg("Boston", "Tokyo"));
    engine.finalize_flight_leg(leg("Tokyo", "Osaka"));
    assert_eq!(engine.accommodation().len(), 1);

    engine.set_trip_type(TripType::MultiCity);
    assert_eq!(engine.accommodation().len(), 2);
}

#[test]
fn round_trip_to_one_way_yields_one_entry() {
    let engine = engine_with_tokyo();
    engine.set_trip_type(TripType::OneWay);
    assert_eq!(engine.accommodation().len(), 1);
}

#[test]
fn one_way_to_round_trip_yields_one_entry() {
    let engine = TripEngine::default();
    engine.set_trip_type(TripType::OneWay);
    engine.finalize_flight_leg(leg("Boston", "Tokyo"));

    engine.set_trip_type(TripType::RoundTrip);
    assert_eq!(engine.accommodation().len(), 1);
}

#[test]
fn switch_away_and_back_is_lossless_for_surviving_city() {
    let engine = engine_with_tokyo_osaka();

    // Customize Tokyo through chat so its budget family is protected.
    engine.apply_instruction(
        Instruction::accommodation(
            AccommodationPatch::default().budget_preset(BudgetPreset::Luxury),
        )
        .for_city("Tokyo"),
    );

    engine.set_trip_type(TripType::RoundTrip);
    engine.set_trip_type(TripType::MultiCity);

    let store = engine.accommodation();
    let tokyo = store.by_city("Tokyo").unwrap();
    assert_eq!(tokyo.budget_preset, BudgetPreset::Luxury);
    assert!(tokyo.protection.user_modified_budget);
    assert_eq!(store.len(), 2, "Osaka is re-materialized");

    // Osaka was removed and recreated, so its customizations started over
    // from defaults.
    let osaka = store.by_city("Osaka").unwrap();
    assert!(!osaka.protection.any());
}

#[test]
fn protected_sibling_presets_do_not_leak_to_newcomers() {
    let engine = engine_with_tokyo_osaka();

    // Chat "change all" is a direct edit: every sibling ends on Economy with
    // its budget family protected.
    let result = engine.apply_instruction(
        Instruction::accommodation(
            AccommodationPatch::default().budget_preset(BudgetPreset::Economy),
        )
        .for_all(),
    );
    assert!(result.mutated());

    engine.finalize_flight_leg(leg("Osaka", "Boston2"));
    let store = engine.accommodation();
    let newcomer = store.by_city("Boston2").unwrap();
    assert_eq!(
        newcomer.budget_preset,
        store.defaults().budget_preset,
        "divergence from protected siblings falls back to the global default"
    );
}

#[test]
fn implicit_instruction_after_reconciliation_uses_stale_id_safely() {
    let engine = engine_with_tokyo_osaka();

    let osaka_id = engine.accommodation().by_city("Osaka").unwrap().id;
    engine.set_trip_type(TripType::RoundTrip);

    // Osaka's entry is gone; a direct probe with the stale id must be a
    // silent no-op rather than an error.
    let result = engine.apply_instruction(
        Instruction::accommodation(
            AccommodationPatch::default().budget_preset(BudgetPreset::Premium),
        )
        .for_city("Osaka"),
    );
    assert_eq!(
        result,
        tripsync::TargetingResult::NotFound {
            city: "Osaka".to_string()
        }
    );
    assert!(engine
        .edit_accommodation(
            osaka_id,
            AccommodationPatch::default().budget_preset(BudgetPreset::Premium)
        )
        .is_none());
}
