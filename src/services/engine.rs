//! Composition root for the trip engine.
//!
//! [`TripEngine`] explicitly constructs the event bus, the four memory
//! stores, the sync service, and the reconciler, and wires them together
//! through bus subscriptions; the components themselves never hold references
//! to one another. Ownership is single-threaded (`Rc<RefCell<_>>`, UI-thread
//! semantics). Handlers scope their store borrows and publish only after
//! dropping them, so nested synchronous dispatch never observes a store
//! mid-mutation.
//!
//! Public methods on the engine are the surfaces' entry points: the flight
//! widget finalizes legs, widgets edit entries directly, and the chat surface
//! submits structured instructions. All of them funnel protected-field writes
//! through the conflict policy inside the stores.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::accommodation::AccommodationPatch;
use crate::domain::models::activity::ActivityPatch;
use crate::domain::models::config::Config;
use crate::domain::models::destination::{Destination, DestinationId};
use crate::domain::models::flight::{FlightLeg, TripType};
use crate::domain::models::interaction::{WidgetInteraction, WidgetInteractionLog};
use crate::domain::models::protection::FieldFamily;
use crate::domain::models::traveler::TravelerGroup;
use crate::domain::ports::snapshot_repository::{SnapshotRepository, StoreKind};

use super::conflict_policy::{ApplyOutcome, WriteOrigin};
use super::event_bus::{EventBus, Provenance, SyncTarget, Tab, TripEvent};
use super::migration;
use super::persistence::PersistenceHandle;
use super::reconciler::TopologyReconciler;
use super::stores::{AccommodationStore, ActivityStore, FlightStore, TravelerStore};
use super::sync_service::{DestinationSyncService, SyncStatus};
use super::targeting::{self, Instruction, InstructionPatch, TargetingResult};

/// Serialized view of every store, consumed by the assistant for grounding.
#[derive(Debug, Clone, Serialize)]
pub struct TripStateSummary {
    pub flight: super::stores::SerializedFlightState,
    pub accommodation: super::stores::SerializedAccommodationState,
    pub activity: super::stores::SerializedActivityState,
    pub traveler: super::stores::SerializedTravelerState,
}

/// The assembled engine.
pub struct TripEngine {
    bus: EventBus,
    flight: Rc<RefCell<FlightStore>>,
    accommodation: Rc<RefCell<AccommodationStore>>,
    activity: Rc<RefCell<ActivityStore>>,
    traveler: Rc<RefCell<TravelerStore>>,
    sync: Rc<RefCell<DestinationSyncService>>,
    interactions: Rc<RefCell<WidgetInteractionLog>>,
    last_targeting: Rc<RefCell<Option<TargetingResult>>>,
    persistence: Rc<RefCell<Option<PersistenceHandle>>>,
}

impl TripEngine {
    pub fn new(config: &Config) -> Self {
        let engine = Self {
            bus: EventBus::new(),
            flight: Rc::new(RefCell::new(FlightStore::default())),
            accommodation: Rc::new(RefCell::new(AccommodationStore::default())),
            activity: Rc::new(RefCell::new(ActivityStore::default())),
            traveler: Rc::new(RefCell::new(TravelerStore::default())),
            sync: Rc::new(RefCell::new(DestinationSyncService::new())),
            interactions: Rc::new(RefCell::new(WidgetInteractionLog::new(
                config.interactions.max_history,
            ))),
            last_targeting: Rc::new(RefCell::new(None)),
            persistence: Rc::new(RefCell::new(None)),
        };
        engine.wire();
        engine
    }

    /// Attach the debounced persistence worker. Snapshots are scheduled from
    /// then on; without a handle the engine runs purely in memory.
    pub fn attach_persistence(&self, handle: PersistenceHandle) {
        *self.persistence.borrow_mut() = Some(handle);
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    // ------------------------------------------------------------------
    // Wiring
    // ------------------------------------------------------------------

    fn wire(&self) {
        self.wire_sync_service();
        self.wire_accommodation();
        self.wire_activity();
        self.wire_reconciler();
        self.wire_persistence();
    }

    /// Flight finalization: normalize the arrival airport and fan the
    /// destination out to every eligible target store.
    fn wire_sync_service(&self) {
        let sync = Rc::clone(&self.sync);
        self.bus.subscribe(move |bus, envelope| {
            let TripEvent::FlightFinalized { leg_id, airport, .. } = &envelope.event else {
                return;
            };
            let (destination, outcome) = {
                let service = sync.borrow();
                let destination = service.normalize_from_flight(airport, *leg_id);
                let outcome = service.propagate(&destination, &SyncTarget::ALL);
                (destination, outcome)
            };
            for target in outcome.eligible {
                bus.publish(TripEvent::CityPropagated {
                    from: Provenance::Flight,
                    to: target,
                    destination: destination.clone(),
                });
            }
            for target in outcome.blocked {
                bus.publish(TripEvent::SyncBlocked {
                    target,
                    destination_id: destination.id,
                    reason: "user sync override".to_string(),
                });
            }
        });
    }

    /// Accommodation store: consumes propagated cities, auto date changes,
    /// and accommodation-typed chat instructions.
    fn wire_accommodation(&self) {
        let store = Rc::clone(&self.accommodation);
        let last_targeting = Rc::clone(&self.last_targeting);
        self.bus.subscribe(move |bus, envelope| match &envelope.event {
            TripEvent::CityPropagated {
                from,
                to: SyncTarget::Accommodation,
                destination,
            } => {
                // Provenance guard: never re-apply our own emissions.
                if *from == Provenance::Accommodation {
                    return;
                }
                let outcome = store.borrow_mut().upsert_from_destination(destination);
                if outcome.created() {
                    bus.publish(TripEvent::TabFlash { tab: Tab::Stay });
                }
            }
            TripEvent::FlightDatesChanged { city, dates } => {
                let result = {
                    let mut store = store.borrow_mut();
                    let found = store.by_city(city).map(|e| (e.id, e.destination_id));
                    found.map(|(id, destination_id)| {
                        let outcome = store.update(
                            id,
                            AccommodationPatch::default().dates(*dates),
                            WriteOrigin::Auto,
                        );
                        (outcome, destination_id)
                    })
                };
                let Some((Some(outcome), destination_id)) = result else {
                    return;
                };
                if outcome.changed() {
                    bus.publish(TripEvent::TabFlash { tab: Tab::Stay });
                }
                if !outcome.skipped.is_empty() {
                    if let Some(destination_id) = destination_id {
                        bus.publish(TripEvent::SyncBlocked {
                            target: SyncTarget::Accommodation,
                            destination_id,
                            reason: outcome.skip_reason(),
                        });
                    }
                }
            }
            TripEvent::ChatInstruction { instruction } => {
                let InstructionPatch::Accommodation(patch) = &instruction.patch else {
                    return;
                };
                let result = targeting::resolve(
                    &mut *store.borrow_mut(),
                    &instruction.target,
                    patch.clone(),
                );
                let mutated = result.mutated();
                *last_targeting.borrow_mut() = Some(result);
                if mutated {
                    bus.publish(TripEvent::TabFlash { tab: Tab::Stay });
                }
            }
            _ => {}
        });
    }

    /// Activity store: mirror of the accommodation handler.
    fn wire_activity(&self) {
        let store = Rc::clone(&self.activity);
        let last_targeting = Rc::clone(&self.last_targeting);
        self.bus.subscribe(move |bus, envelope| match &envelope.event {
            TripEvent::CityPropagated {
                from,
                to: SyncTarget::Activity,
                destination,
            } => {
                if *from == Provenance::Activity {
                    return;
                }
                let outcome = store.borrow_mut().upsert_from_destination(destination);
                if outcome.created() {
                    bus.publish(TripEvent::TabFlash {
                        tab: Tab::Activities,
                    });
                }
            }
            TripEvent::FlightDatesChanged { city, dates } => {
                let result = {
                    let mut store = store.borrow_mut();
                    let found = store.by_city(city).map(|e| e.id);
                    found.and_then(|id| {
                        store.update(
                            id,
                            ActivityPatch::default().dates(*dates),
                            WriteOrigin::Auto,
                        )
                    })
                };
                if result.is_some_and(|outcome| outcome.changed()) {
                    bus.publish(TripEvent::TabFlash {
                        tab: Tab::Activities,
                    });
                }
            }
            TripEvent::ChatInstruction { instruction } => {
                let InstructionPatch::Activity(patch) = &instruction.patch else {
                    return;
                };
                let result = targeting::resolve(
                    &mut *store.borrow_mut(),
                    &instruction.target,
                    patch.clone(),
                );
                let mutated = result.mutated();
                *last_targeting.borrow_mut() = Some(result);
                if mutated {
                    bus.publish(TripEvent::TabFlash {
                        tab: Tab::Activities,
                    });
                }
            }
            _ => {}
        });
    }

    /// Topology changes rewrite the entry set, then route required
    /// destinations back through the propagation path.
    fn wire_reconciler(&self) {
        let flight = Rc::clone(&self.flight);
        let sync = Rc::clone(&self.sync);
        let accommodation = Rc::clone(&self.accommodation);
        let activity = Rc::clone(&self.activity);
        self.bus.subscribe(move |bus, envelope| {
            if !matches!(
                envelope.event,
                TripEvent::TripTypeChanged { .. } | TripEvent::LegsChanged { .. }
            ) {
                return;
            }
            let (report, additions) = {
                let flight = flight.borrow();
                let service = sync.borrow();
                let mut accommodation = accommodation.borrow_mut();
                let mut activity = activity.borrow_mut();
                TopologyReconciler::reconcile(
                    &flight,
                    &service,
                    &mut accommodation,
                    &mut activity,
                )
            };
            if !report.removed.is_empty() {
                bus.publish(TripEvent::TabFlash { tab: Tab::Stay });
                bus.publish(TripEvent::TabFlash {
                    tab: Tab::Activities,
                });
            }
            for addition in additions {
                let outcome = {
                    let service = sync.borrow();
                    service.propagate(&addition.destination, &addition.missing_from)
                };
                for target in outcome.eligible {
                    bus.publish(TripEvent::CityPropagated {
                        from: Provenance::Flight,
                        to: target,
                        destination: addition.destination.clone(),
                    });
                }
                for target in outcome.blocked {
                    bus.publish(TripEvent::SyncBlocked {
                        target,
                        destination_id: addition.destination.id,
                        reason: "user sync override".to_string(),
                    });
                }
            }
        });
    }

    /// Any store change schedules a debounced snapshot of that store.
    fn wire_persistence(&self) {
        let flight = Rc::clone(&self.flight);
        let accommodation = Rc::clone(&self.accommodation);
        let activity = Rc::clone(&self.activity);
        let traveler = Rc::clone(&self.traveler);
        let persistence = Rc::clone(&self.persistence);
        self.bus.subscribe(move |_, envelope| {
            let Some(handle) = persistence.borrow().clone() else {
                return;
            };
            let kind = match &envelope.event {
                TripEvent::TabFlash { tab } => match tab {
                    Tab::Flights => StoreKind::Flight,
                    Tab::Stay => StoreKind::Accommodation,
                    Tab::Activities => StoreKind::Activity,
                    Tab::Travelers => StoreKind::Traveler,
                },
                TripEvent::FlightFinalized { .. }
                | TripEvent::TripTypeChanged { .. }
                | TripEvent::LegsChanged { .. } => StoreKind::Flight,
                _ => return,
            };
            let payload = match kind {
                StoreKind::Flight => migration::snapshot(kind, &*flight.borrow()),
                StoreKind::Accommodation => {
                    migration::snapshot(kind, &*accommodation.borrow())
                }
                StoreKind::Activity => migration::snapshot(kind, &*activity.borrow()),
                StoreKind::Traveler => migration::snapshot(kind, &*traveler.borrow()),
            };
            match payload {
                Ok(payload) => handle.schedule(kind, payload),
                Err(err) => {
                    tracing::warn!(store = %kind, error = %err, "snapshot serialization failed");
                }
            }
        });
    }

    // ------------------------------------------------------------------
    // Flight surface
    // ------------------------------------------------------------------

    /// A leg's destination was finalized in the flight widget.
    ///
    /// Only destination legs propagate (a return leg's arrival is the home
    /// origin and never materializes). Any change to the required destination
    /// set triggers reconciliation, including in-place destination edits
    /// that leave the leg count unchanged.
    pub fn finalize_flight_leg(&self, leg: FlightLeg) {
        let leg_city = crate::domain::models::destination::normalize_city(&leg.destination.city);
        let (leg_count, required_changed, is_destination_leg, is_multi_city) = {
            let mut flight = self.flight.borrow_mut();
            let service = self.sync.borrow();
            let before: std::collections::HashSet<String> = flight
                .required_destinations(&service)
                .iter()
                .map(Destination::normalized_city)
                .collect();
            let leg_count = flight.upsert_leg(leg.clone());
            let after: std::collections::HashSet<String> = flight
                .required_destinations(&service)
                .iter()
                .map(Destination::normalized_city)
                .collect();
            (
                leg_count,
                before != after,
                after.contains(&leg_city),
                flight.trip_type().is_multi(),
            )
        };

        if is_destination_leg {
            self.bus.publish(TripEvent::FlightFinalized {
                leg_id: leg.id,
                airport: leg.destination.clone(),
                is_multi_city,
            });
        }
        if required_changed {
            self.bus.publish(TripEvent::LegsChanged { leg_count });
        }
        self.publish_stay_windows();
    }

    /// Switch topology; the reconciler listens for the transition.
    pub fn set_trip_type(&self, trip_type: TripType) {
        let transition = self.flight.borrow_mut().set_trip_type(trip_type);
        if let Some((previous, current)) = transition {
            self.bus
                .publish(TripEvent::TripTypeChanged { previous, current });
        }
    }

    fn publish_stay_windows(&self) {
        let windows = DestinationSyncService::stay_windows(self.flight.borrow().legs());
        for (city, dates) in windows {
            self.bus
                .publish(TripEvent::FlightDatesChanged { city, dates });
        }
    }

    // ------------------------------------------------------------------
    // Widget surface
    // ------------------------------------------------------------------

    /// Manual city selection from the city-selector widget.
    pub fn select_city(&self, city: &str, country_code: &str) {
        let (destination, outcome) = {
            let service = self.sync.borrow();
            let destination = service.normalize_manual(city, country_code);
            let outcome = service.propagate(&destination, &SyncTarget::ALL);
            (destination, outcome)
        };
        for target in outcome.eligible {
            self.bus.publish(TripEvent::CityPropagated {
                from: Provenance::Widget,
                to: target,
                destination: destination.clone(),
            });
        }
        for target in outcome.blocked {
            self.bus.publish(TripEvent::SyncBlocked {
                target,
                destination_id: destination.id,
                reason: "user sync override".to_string(),
            });
        }
    }

    /// Manually add a stay for a city (no backing destination). Returns the
    /// existing entry's id when the city is already planned.
    pub fn add_accommodation(&self, city: &str) -> Uuid {
        let (id, added) = {
            let mut store = self.accommodation.borrow_mut();
            let before = store.len();
            let id = store.add_manual(city);
            (id, store.len() != before)
        };
        if added {
            self.bus.publish(TripEvent::TabFlash { tab: Tab::Stay });
        }
        id
    }

    /// Manually add an activity plan for a city.
    pub fn add_activity(&self, city: &str) -> Uuid {
        let (id, added) = {
            let mut store = self.activity.borrow_mut();
            let before = store.len();
            let id = store.add_manual(city);
            (id, store.len() != before)
        };
        if added {
            self.bus.publish(TripEvent::TabFlash {
                tab: Tab::Activities,
            });
        }
        id
    }

    /// Remove a stay.
    pub fn remove_accommodation(&self, id: Uuid) -> bool {
        let removed = self.accommodation.borrow_mut().remove(id);
        if removed {
            self.bus.publish(TripEvent::TabFlash { tab: Tab::Stay });
        }
        removed
    }

    /// Remove an activity plan.
    pub fn remove_activity(&self, id: Uuid) -> bool {
        let removed = self.activity.borrow_mut().remove(id);
        if removed {
            self.bus.publish(TripEvent::TabFlash {
                tab: Tab::Activities,
            });
        }
        removed
    }

    /// Direct widget edit of a stay. Sets protection flags and suppresses
    /// future auto propagation into this entry's destination.
    pub fn edit_accommodation(
        &self,
        id: Uuid,
        patch: AccommodationPatch,
    ) -> Option<ApplyOutcome> {
        let (outcome, destination_id) = {
            let mut store = self.accommodation.borrow_mut();
            let destination_id = store.active().iter().find(|e| e.id == id).and_then(|e| e.destination_id);
            (store.update(id, patch, WriteOrigin::Direct), destination_id)
        };
        if outcome.is_some() {
            if let Some(destination_id) = destination_id {
                self.sync
                    .borrow_mut()
                    .block_sync(SyncTarget::Accommodation, destination_id);
            }
        }
        if outcome.as_ref().is_some_and(ApplyOutcome::changed) {
            self.bus.publish(TripEvent::TabFlash { tab: Tab::Stay });
        }
        outcome
    }

    /// Direct widget edit of an activity plan.
    pub fn edit_activity(&self, id: Uuid, patch: ActivityPatch) -> Option<ApplyOutcome> {
        let (outcome, destination_id) = {
            let mut store = self.activity.borrow_mut();
            let destination_id = store.active().iter().find(|e| e.id == id).and_then(|e| e.destination_id);
            (store.update(id, patch, WriteOrigin::Direct), destination_id)
        };
        if outcome.is_some() {
            if let Some(destination_id) = destination_id {
                self.sync
                    .borrow_mut()
                    .block_sync(SyncTarget::Activity, destination_id);
            }
        }
        if outcome.as_ref().is_some_and(ApplyOutcome::changed) {
            self.bus.publish(TripEvent::TabFlash {
                tab: Tab::Activities,
            });
        }
        outcome
    }

    /// Replace the traveler group.
    pub fn set_travelers(&self, group: TravelerGroup) -> Result<(), String> {
        self.traveler.borrow_mut().set_group(group)?;
        self.bus.publish(TripEvent::TabFlash {
            tab: Tab::Travelers,
        });
        Ok(())
    }

    /// Suppress propagation of one destination into one store.
    pub fn block_sync(&self, target: SyncTarget, destination_id: DestinationId) {
        self.sync.borrow_mut().block_sync(target, destination_id);
    }

    /// Explicit user-initiated re-enable of propagation.
    pub fn unblock_sync(&self, target: SyncTarget, destination_id: DestinationId) {
        self.sync.borrow_mut().unblock_sync(target, destination_id);
    }

    /// Explicit user-initiated un-protect of a field family.
    pub fn clear_protection(&self, target: SyncTarget, id: Uuid, family: FieldFamily) -> bool {
        match target {
            SyncTarget::Accommodation => {
                self.accommodation.borrow_mut().clear_protection(id, family)
            }
            SyncTarget::Activity => self.activity.borrow_mut().clear_protection(id, family),
        }
    }

    /// Append a widget interaction to the observational log.
    pub fn record_interaction(&self, interaction: WidgetInteraction) {
        self.interactions.borrow_mut().record(interaction.clone());
        self.bus
            .publish(TripEvent::InteractionRecorded { interaction });
    }

    // ------------------------------------------------------------------
    // Chat surface
    // ------------------------------------------------------------------

    /// Submit a structured instruction. The instruction travels over the bus
    /// (`chat:instruction`), the owning store's handler resolves and applies
    /// it, and the synchronous dispatch guarantee makes the result available
    /// when `publish` returns.
    pub fn apply_instruction(&self, instruction: Instruction) -> TargetingResult {
        self.last_targeting.borrow_mut().take();
        self.bus.publish(TripEvent::ChatInstruction { instruction });
        self.last_targeting
            .borrow_mut()
            .take()
            .unwrap_or(TargetingResult::NoEntries)
    }

    // ------------------------------------------------------------------
    // Read surface
    // ------------------------------------------------------------------

    pub fn flight(&self) -> Ref<'_, FlightStore> {
        self.flight.borrow()
    }

    pub fn accommodation(&self) -> Ref<'_, AccommodationStore> {
        self.accommodation.borrow()
    }

    pub fn activity(&self) -> Ref<'_, ActivityStore> {
        self.activity.borrow()
    }

    pub fn traveler(&self) -> Ref<'_, TravelerStore> {
        self.traveler.borrow()
    }

    pub fn interactions(&self) -> Ref<'_, WidgetInteractionLog> {
        self.interactions.borrow()
    }

    /// Sync state of a destination for one target store (UI display).
    pub fn sync_status(&self, destination: &Destination, target: SyncTarget) -> SyncStatus {
        self.sync.borrow().sync_status(destination, target)
    }

    /// Plain-object summary of every store for assistant grounding.
    pub fn serialized_state(&self) -> TripStateSummary {
        TripStateSummary {
            flight: self.flight.borrow().serialized_state(),
            accommodation: self.accommodation.borrow().serialized_state(),
            activity: self.activity.borrow().serialized_state(),
            traveler: self.traveler.borrow().serialized_state(),
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Schedule snapshots of every store.
    pub fn snapshot_all(&self) {
        let Some(handle) = self.persistence.borrow().clone() else {
            return;
        };
        for kind in StoreKind::ALL {
            let payload = match kind {
                StoreKind::Flight => migration::snapshot(kind, &*self.flight.borrow()),
                StoreKind::Accommodation => {
                    migration::snapshot(kind, &*self.accommodation.borrow())
                }
                StoreKind::Activity => migration::snapshot(kind, &*self.activity.borrow()),
                StoreKind::Traveler => migration::snapshot(kind, &*self.traveler.borrow()),
            };
            match payload {
                Ok(payload) => handle.schedule(kind, payload),
                Err(err) => {
                    tracing::warn!(store = %kind, error = %err, "snapshot serialization failed");
                }
            }
        }
    }

    /// Load every store from persisted snapshots, migrating old versions.
    /// Corrupt or missing snapshots fall back to compiled-in defaults, and
    /// upgraded forms are re-persisted via the normal debounced path.
    pub async fn hydrate(&self, repository: &dyn SnapshotRepository) -> DomainResult<()> {
        if let Some(raw) = repository.load(StoreKind::Flight).await? {
            if let Some(state) =
                migration::load_store::<FlightStore>(StoreKind::Flight, &raw)
            {
                *self.flight.borrow_mut() = state;
            }
        }
        if let Some(raw) = repository.load(StoreKind::Accommodation).await? {
            if let Some(state) =
                migration::load_store::<AccommodationStore>(StoreKind::Accommodation, &raw)
            {
                *self.accommodation.borrow_mut() = state;
            }
        }
        if let Some(raw) = repository.load(StoreKind::Activity).await? {
            if let Some(state) =
                migration::load_store::<ActivityStore>(StoreKind::Activity, &raw)
            {
                *self.activity.borrow_mut() = state;
            }
        }
        if let Some(raw) = repository.load(StoreKind::Traveler).await? {
            if let Some(state) =
                migration::load_store::<TravelerStore>(StoreKind::Traveler, &raw)
            {
                *self.traveler.borrow_mut() = state;
            }
        }
        self.snapshot_all();
        Ok(())
    }

    /// Flush pending snapshot writes and stop the persistence worker. Called
    /// on visibility loss or unmount.
    pub async fn shutdown(&self) -> DomainResult<()> {
        let handle = self.persistence.borrow_mut().take();
        if let Some(handle) = handle {
            self.snapshot_all_with(&handle);
            handle.shutdown().await?;
        }
        Ok(())
    }

    fn snapshot_all_with(&self, handle: &PersistenceHandle) {
        for kind in StoreKind::ALL {
            let payload = match kind {
                StoreKind::Flight => migration::snapshot(kind, &*self.flight.borrow()),
                StoreKind::Accommodation => {
                    migration::snapshot(kind, &*self.accommodation.borrow())
                }
                StoreKind::Activity => migration::snapshot(kind, &*self.activity.borrow()),
                StoreKind::Traveler => migration::snapshot(kind, &*self.traveler.borrow()),
            };
            if let Ok(payload) = payload {
                handle.schedule(kind, payload);
            }
        }
    }
}

impl Default for TripEngine {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::budget::BudgetPreset;
    use crate::domain::models::flight::Airport;

    fn leg(from: &str, to: &str) -> FlightLeg {
        FlightLeg::new(
            Airport::new("XXX", from, "US"),
            Airport::new("YYY", to, "JP"),
        )
    }

    #[test]
    fn test_flight_finalization_propagates_to_both_stores() {
        let engine = TripEngine::default();
        engine.finalize_flight_leg(leg("Boston", "Tokyo"));

        assert_eq!(engine.accommodation().len(), 1);
        assert_eq!(engine.activity().len(), 1);
        assert!(engine
            .accommodation()
            .by_city("Tokyo")
            .unwrap()
            .synced_from_destination);
    }

    #[test]
    fn test_blocked_target_receives_no_entry() {
        let engine = TripEngine::default();
        let destination_id =
            crate::domain::models::destination::DestinationId::derive("Tokyo", "JP");
        engine.block_sync(SyncTarget::Accommodation, destination_id);

        engine.finalize_flight_leg(leg("Boston", "Tokyo"));

        assert_eq!(engine.accommodation().len(), 0, "blocked store untouched");
        assert_eq!(engine.activity().len(), 1, "other store still propagates");
    }

    #[test]
    fn test_chat_instruction_round_trips_through_bus() {
        let engine = TripEngine::default();
        engine.finalize_flight_leg(leg("Boston", "Tokyo"));

        let result = engine.apply_instruction(
            Instruction::accommodation(
                AccommodationPatch::default().budget_preset(BudgetPreset::Premium),
            )
            .for_city("TOKYO"),
        );

        assert!(result.mutated());
        let store = engine.accommodation();
        let entry = store.by_city("Tokyo").unwrap();
        assert_eq!(entry.budget_preset, BudgetPreset::Premium);
        assert!(entry.protection.user_modified_budget);
    }

    #[test]
    fn test_widget_edit_blocks_future_sync() {
        let engine = TripEngine::default();
        engine.finalize_flight_leg(leg("Boston", "Tokyo"));

        let id = engine.accommodation().by_city("Tokyo").unwrap().id;
        engine.edit_accommodation(
            id,
            AccommodationPatch::default().budget_preset(BudgetPreset::Luxury),
        );

        let destination =
            crate::services::sync_service::DestinationSyncService::new()
                .normalize_manual("Tokyo", "JP");
        assert_eq!(
            engine.sync_status(&destination, SyncTarget::Accommodation),
            SyncStatus::Blocked
        );
    }

    #[test]
    fn test_trip_type_switch_reconciles_entries() {
        let engine = TripEngine::default();
        engine.set_trip_type(TripType::MultiCity);
        engine.finalize_flight_leg(leg("Boston", "Tokyo"));
        engine.finalize_flight_leg(leg("Tokyo", "Osaka"));
        assert_eq!(engine.accommodation().len(), 2);

        engine.set_trip_type(TripType::RoundTrip);
        assert_eq!(engine.accommodation().len(), 1);
        assert!(engine.accommodation().by_city("Tokyo").is_some());
    }

    #[test]
    fn test_recorded_interaction_is_observable_but_not_authoritative() {
        use crate::domain::models::interaction::{
            InteractionType, WidgetInteraction, WidgetType,
        };

        let engine = TripEngine::default();
        let seen = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&seen);
        engine.bus().subscribe(move |_, envelope| {
            if matches!(envelope.event, TripEvent::InteractionRecorded { .. }) {
                *sink.borrow_mut() += 1;
            }
        });

        engine.record_interaction(WidgetInteraction::new(
            WidgetType::BudgetSlider,
            InteractionType::Adjust,
            serde_json::json!({"value": 150}),
            "budget slider moved to 150",
        ));

        assert_eq!(*seen.borrow(), 1);
        assert_eq!(engine.interactions().len(), 1);
        // Observational only: no store changed.
        assert_eq!(engine.accommodation().len(), 0);
    }

    #[test]
    fn test_serialized_state_covers_all_stores() {
        let engine = TripEngine::default();
        engine.finalize_flight_leg(leg("Boston", "Tokyo"));

        let summary = engine.serialized_state();
        assert_eq!(summary.flight.total_legs, 1);
        assert_eq!(summary.accommodation.total_entries, 1);
        assert_eq!(summary.activity.total_entries, 1);
        assert_eq!(summary.traveler.adults, 1);
    }
}
