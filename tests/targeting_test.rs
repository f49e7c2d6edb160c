//! Integration tests for the chat targeting resolver through the engine.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use tripsync::domain::models::{
    AccommodationPatch, ActivityPatch, ActivityType, BudgetPreset, BudgetRange, DateRange,
};
use tripsync::services::{Instruction, TargetingResult, TripEvent};

mod common;
use common::{engine_with_tokyo, engine_with_tokyo_osaka};

fn dates(start_day: u32, end_day: u32) -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2025, 6, start_day).unwrap(),
        NaiveDate::from_ymd_opt(2025, 6, end_day).unwrap(),
    )
    .unwrap()
}

#[test]
fn uppercase_city_targets_the_titlecase_entry() {
    let engine = engine_with_tokyo();

    let result = engine.apply_instruction(
        Instruction::accommodation(
            AccommodationPatch::default().budget_preset(BudgetPreset::Premium),
        )
        .for_city("TOKYO"),
    );

    match result {
        TargetingResult::Applied { cities, .. } => assert_eq!(cities, vec!["Tokyo"]),
        other => panic!("expected Applied, got {other:?}"),
    }
    assert_eq!(
        engine.accommodation().by_city("Tokyo").unwrap().budget_preset,
        BudgetPreset::Premium
    );
}

#[test]
fn unknown_city_returns_not_found_without_mutation() {
    let engine = engine_with_tokyo();
    let before = engine.accommodation().by_city("Tokyo").unwrap().clone();

    let result = engine.apply_instruction(
        Instruction::accommodation(
            AccommodationPatch::default().budget_preset(BudgetPreset::Luxury),
        )
        .for_city("Kyoto"),
    );

    assert_eq!(
        result,
        TargetingResult::NotFound {
            city: "Kyoto".to_string()
        }
    );
    assert_eq!(
        engine.accommodation().by_city("Tokyo").unwrap().budget_preset,
        before.budget_preset
    );
}

#[test]
fn all_reaches_every_live_entry() {
    let engine = engine_with_tokyo_osaka();

    let result = engine.apply_instruction(
        Instruction::activity(
            ActivityPatch::default().activity_types(vec![ActivityType::Food]),
        )
        .for_all(),
    );

    match result {
        TargetingResult::Applied { cities, .. } => assert_eq!(cities.len(), 2),
        other => panic!("expected Applied, got {other:?}"),
    }
    let store = engine.activity();
    for entry in store.active() {
        assert_eq!(entry.activity_types, vec![ActivityType::Food]);
    }
}

#[test]
fn implicit_target_works_with_a_single_entry() {
    let engine = engine_with_tokyo();

    let result = engine.apply_instruction(Instruction::accommodation(
        AccommodationPatch::default().notes("near the station"),
    ));

    assert!(result.mutated());
    assert_eq!(
        engine
            .accommodation()
            .by_city("Tokyo")
            .unwrap()
            .notes
            .as_deref(),
        Some("near the station")
    );
}

#[test]
fn implicit_target_with_two_entries_is_ambiguous() {
    let engine = engine_with_tokyo_osaka();

    let result = engine.apply_instruction(Instruction::accommodation(
        AccommodationPatch::default().notes("which one?"),
    ));

    assert_eq!(result, TargetingResult::Ambiguous { count: 2 });
}

#[test]
fn multi_field_instruction_is_one_observable_transition() {
    let engine = engine_with_tokyo();

    // All fields of an instruction land in a single store update, so
    // synchronous listeners see exactly one change notification, never a
    // flicker of per-field partial states.
    let flashes = Rc::new(RefCell::new(0u32));
    let sink = Rc::clone(&flashes);
    engine.bus().subscribe(move |_, envelope| {
        if matches!(envelope.event, TripEvent::TabFlash { .. }) {
            *sink.borrow_mut() += 1;
        }
    });

    engine.apply_instruction(
        Instruction::accommodation(
            AccommodationPatch::default()
                .budget_preset(BudgetPreset::Luxury)
                .budget(BudgetRange { min: 400, max: 900 })
                .dates(dates(10, 14)),
        )
        .for_city("Tokyo"),
    );

    assert_eq!(*flashes.borrow(), 1, "three fields, one transition");

    let store = engine.accommodation();
    let entry = store.by_city("Tokyo").unwrap();
    assert_eq!(entry.budget_preset, BudgetPreset::Luxury);
    assert_eq!(entry.budget, BudgetRange { min: 400, max: 900 });
    assert_eq!(entry.dates, Some(dates(10, 14)));
}

#[test]
fn chat_edit_protects_exactly_like_a_widget_edit() {
    let engine = engine_with_tokyo();

    engine.apply_instruction(
        Instruction::accommodation(AccommodationPatch::default().dates(dates(1, 5)))
            .for_city("Tokyo"),
    );

    let store = engine.accommodation();
    let entry = store.by_city("Tokyo").unwrap();
    assert!(entry.protection.user_modified_dates);
    assert!(!entry.protection.user_modified_budget);
}
