//! Integration tests for destination propagation across surfaces.
//!
//! Covers the sync service path end to end: flight finalization fans a
//! normalized destination out to accommodation and activity, user overrides
//! block individual targets, and provenance tags bound propagation to one
//! hop.

use std::cell::RefCell;
use std::rc::Rc;

use tripsync::domain::models::DestinationId;
use tripsync::services::{SyncTarget, Tab, TripEngine, TripEvent};

mod common;
use common::{engine_with_tokyo, leg};

#[test]
fn propagating_the_same_destination_twice_yields_one_entry() {
    let engine = engine_with_tokyo();
    assert_eq!(engine.accommodation().len(), 1);
    assert_eq!(engine.activity().len(), 1);

    // Re-finalizing the same leg destination must not duplicate entries.
    engine.finalize_flight_leg(leg("Boston", "Tokyo"));
    engine.finalize_flight_leg(leg("Boston", "tokyo"));

    assert_eq!(engine.accommodation().len(), 1);
    assert_eq!(engine.activity().len(), 1);
}

#[test]
fn blocked_target_is_skipped_and_reported() {
    let engine = TripEngine::default();
    let blocked_events: Rc<RefCell<Vec<SyncTarget>>> = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&blocked_events);
    engine.bus().subscribe(move |_, envelope| {
        if let TripEvent::SyncBlocked { target, .. } = &envelope.event {
            sink.borrow_mut().push(*target);
        }
    });

    engine.block_sync(
        SyncTarget::Accommodation,
        DestinationId::derive("Tokyo", "JP"),
    );
    engine.finalize_flight_leg(leg("Boston", "Tokyo"));

    assert_eq!(engine.accommodation().len(), 0);
    assert_eq!(engine.activity().len(), 1);
    assert!(blocked_events
        .borrow()
        .contains(&SyncTarget::Accommodation));
}

#[test]
fn unblock_restores_propagation_for_the_same_destination() {
    let engine = TripEngine::default();
    let destination_id = DestinationId::derive("Tokyo", "JP");

    engine.block_sync(SyncTarget::Accommodation, destination_id);
    engine.finalize_flight_leg(leg("Boston", "Tokyo"));
    assert_eq!(engine.accommodation().len(), 0);

    // The id is derived from the city, so the override keys match across
    // repeated finalizations.
    engine.unblock_sync(SyncTarget::Accommodation, destination_id);
    engine.finalize_flight_leg(leg("Boston", "Tokyo"));
    assert_eq!(engine.accommodation().len(), 1);
}

#[test]
fn store_creation_flashes_the_hidden_tab() {
    let engine = TripEngine::default();
    let flashes: Rc<RefCell<Vec<Tab>>> = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&flashes);
    engine.bus().subscribe(move |_, envelope| {
        if let TripEvent::TabFlash { tab } = &envelope.event {
            sink.borrow_mut().push(*tab);
        }
    });

    engine.finalize_flight_leg(leg("Boston", "Tokyo"));

    let flashes = flashes.borrow();
    assert!(flashes.contains(&Tab::Stay));
    assert!(flashes.contains(&Tab::Activities));
}

#[test]
fn propagation_is_bounded_to_one_hop() {
    let engine = TripEngine::default();
    let propagations: Rc<RefCell<u32>> = Rc::new(RefCell::new(0));

    let counter = Rc::clone(&propagations);
    engine.bus().subscribe(move |_, envelope| {
        if matches!(envelope.event, TripEvent::CityPropagated { .. }) {
            *counter.borrow_mut() += 1;
        }
    });

    engine.finalize_flight_leg(leg("Boston", "Tokyo"));

    // One finalization, two targets: exactly two propagation events, no
    // echoes back from the receiving stores.
    assert_eq!(*propagations.borrow(), 2);
}

#[test]
fn manual_city_selection_propagates_like_a_flight() {
    let engine = TripEngine::default();
    engine.select_city("Lisbon", "PT");

    assert_eq!(engine.accommodation().len(), 1);
    let store = engine.accommodation();
    let entry = store.by_city("lisbon").unwrap();
    assert!(entry.synced_from_destination);
}
