//! Typed event bus for cross-surface synchronization.
//!
//! The bus is the sole communication path between the chat surface, widgets,
//! and memory stores; no component holds a direct reference to another. It is
//! an explicitly constructed, dependency-injected instance (no global
//! singleton), and dispatch is synchronous and reentrant: a handler may
//! publish while handling, and the nested event is dispatched to completion
//! (depth-first) before control returns to the original publisher.
//!
//! The catalog is a closed tagged union ([`TripEvent`]) so adding an event is
//! a compile-time-checked change. Every propagation event carries a
//! provenance tag; a receiving store's handler ignores events whose origin is
//! itself, bounding recursion to one hop per logical change. As a second
//! structural bound, a subscriber that is currently executing is skipped by
//! nested dispatch: a handler never observes events published from within
//! itself.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::dates::DateRange;
use crate::domain::models::destination::{Destination, DestinationId};
use crate::domain::models::flight::{Airport, TripType};
use crate::domain::models::interaction::WidgetInteraction;

use super::targeting::Instruction;

/// Unique identifier for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonically increasing sequence number assigned by the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SequenceNumber(pub u64);

impl std::fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Origin tag carried by propagation events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Flight,
    Accommodation,
    Activity,
    Traveler,
    Chat,
    Widget,
    System,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Flight => "flight",
            Self::Accommodation => "accommodation",
            Self::Activity => "activity",
            Self::Traveler => "traveler",
            Self::Chat => "chat",
            Self::Widget => "widget",
            Self::System => "system",
        };
        write!(f, "{s}")
    }
}

/// A store that destination propagation can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncTarget {
    Accommodation,
    Activity,
}

impl SyncTarget {
    pub const ALL: [Self; 2] = [Self::Accommodation, Self::Activity];

    /// The provenance a store of this kind stamps on its own emissions.
    pub fn provenance(&self) -> Provenance {
        match self {
            Self::Accommodation => Provenance::Accommodation,
            Self::Activity => Provenance::Activity,
        }
    }

    /// The UI tab backing this store.
    pub fn tab(&self) -> Tab {
        match self {
            Self::Accommodation => Tab::Stay,
            Self::Activity => Tab::Activities,
        }
    }
}

impl std::fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accommodation => write!(f, "accommodation"),
            Self::Activity => write!(f, "activity"),
        }
    }
}

/// UI tabs that can flash when an invisible surface changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Flights,
    Stay,
    Activities,
    Travelers,
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Flights => "flights",
            Self::Stay => "stay",
            Self::Activities => "activities",
            Self::Travelers => "travelers",
        };
        write!(f, "{s}")
    }
}

/// Closed event catalog, one variant per event name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum TripEvent {
    /// A flight leg's destination was finalized by the flight surface.
    FlightFinalized {
        leg_id: Uuid,
        airport: Airport,
        is_multi_city: bool,
    },
    /// Flight date edits produced a new stay window for a city.
    FlightDatesChanged { city: String, dates: DateRange },
    /// Trip topology switched.
    TripTypeChanged {
        previous: TripType,
        current: TripType,
    },
    /// Leg count changed under an unchanged trip type.
    LegsChanged { leg_count: usize },
    /// The sync service cleared a destination for propagation to a target
    /// store.
    CityPropagated {
        from: Provenance,
        to: SyncTarget,
        destination: Destination,
    },
    /// A propagation attempt was rejected by a user override or protected
    /// fields.
    SyncBlocked {
        target: SyncTarget,
        destination_id: DestinationId,
        reason: String,
    },
    /// Structured instruction from the chat surface.
    ChatInstruction { instruction: Instruction },
    /// UI notification that a store changed while its tab may be hidden.
    TabFlash { tab: Tab },
    /// A widget interaction was appended to the observational log.
    InteractionRecorded { interaction: WidgetInteraction },
}

impl TripEvent {
    /// Stable event name for logs and tracing.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FlightFinalized { .. } => "destination:flight_finalized",
            Self::FlightDatesChanged { .. } => "flight:dates_changed",
            Self::TripTypeChanged { .. } => "trip:type_changed",
            Self::LegsChanged { .. } => "trip:legs_changed",
            Self::CityPropagated { .. } => "sync:city_propagated",
            Self::SyncBlocked { .. } => "sync:blocked",
            Self::ChatInstruction { .. } => "chat:instruction",
            Self::TabFlash { .. } => "tab:flash",
            Self::InteractionRecorded { .. } => "widget:interaction",
        }
    }
}

/// Event plus bus-assigned metadata.
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub sequence: SequenceNumber,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: TripEvent,
}

/// Handle for removing a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&EventBus, &EventEnvelope)>;

struct Subscriber {
    id: SubscriptionId,
    handler: Rc<RefCell<Handler>>,
}

struct BusInner {
    subscribers: RefCell<Vec<Subscriber>>,
    next_subscription: Cell<u64>,
    sequence: Cell<u64>,
}

/// Synchronous, reentrant publish/subscribe channel.
///
/// Single-threaded by construction (`Rc` interior); clones share the same
/// subscriber list and sequence counter.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<BusInner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(BusInner {
                subscribers: RefCell::new(Vec::new()),
                next_subscription: Cell::new(0),
                sequence: Cell::new(0),
            }),
        }
    }

    /// Register a handler. Handlers run in subscription order.
    pub fn subscribe(
        &self,
        handler: impl FnMut(&EventBus, &EventEnvelope) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_subscription.get());
        self.inner.next_subscription.set(id.0 + 1);
        self.inner.subscribers.borrow_mut().push(Subscriber {
            id,
            handler: Rc::new(RefCell::new(Box::new(handler))),
        });
        id
    }

    /// Remove a subscriber. Safe to call with an already-removed id.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .subscribers
            .borrow_mut()
            .retain(|sub| sub.id != id);
    }

    /// Publish an event, dispatching to every subscriber before returning.
    ///
    /// A subscriber currently executing (i.e. this publish is nested inside
    /// its own handling) is skipped; self-echoes are structurally impossible.
    pub fn publish(&self, event: TripEvent) {
        let sequence = SequenceNumber(self.inner.sequence.get());
        self.inner.sequence.set(sequence.0 + 1);

        let envelope = EventEnvelope {
            id: EventId::new(),
            sequence,
            timestamp: Utc::now(),
            event,
        };
        tracing::debug!(
            event = envelope.event.name(),
            sequence = sequence.0,
            "dispatching event"
        );

        // Snapshot the subscriber list so handlers may subscribe/unsubscribe
        // during dispatch without invalidating this iteration.
        let handlers: Vec<Rc<RefCell<Handler>>> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|sub| Rc::clone(&sub.handler))
            .collect();

        for handler in handlers {
            match handler.try_borrow_mut() {
                Ok(mut f) => f(self, &envelope),
                Err(_) => {
                    tracing::trace!(
                        event = envelope.event.name(),
                        "skipping reentrant delivery to the emitting subscriber"
                    );
                }
            }
        }
    }

    /// Next sequence number to be assigned.
    pub fn sequence(&self) -> SequenceNumber {
        SequenceNumber(self.inner.sequence.get())
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_assignment() {
        let bus = EventBus::new();
        let seen: Rc<RefCell<Vec<u64>>> = Rc::new(RefCell::new(Vec::new()));

        let seen_by_handler = Rc::clone(&seen);
        bus.subscribe(move |_, envelope| {
            seen_by_handler.borrow_mut().push(envelope.sequence.0);
        });

        bus.publish(TripEvent::TabFlash { tab: Tab::Stay });
        bus.publish(TripEvent::TabFlash { tab: Tab::Flights });

        assert_eq!(*seen.borrow(), vec![0, 1]);
        assert_eq!(bus.sequence().0, 2);
    }

    #[test]
    fn test_depth_first_nested_dispatch() {
        let bus = EventBus::new();
        let order: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

        // First subscriber republishes once, creating a nested dispatch.
        let order_a = Rc::clone(&order);
        bus.subscribe(move |bus, envelope| {
            order_a
                .borrow_mut()
                .push(format!("a:{}", envelope.event.name()));
            if matches!(envelope.event, TripEvent::LegsChanged { .. }) {
                bus.publish(TripEvent::TabFlash { tab: Tab::Stay });
            }
        });

        let order_b = Rc::clone(&order);
        bus.subscribe(move |_, envelope| {
            order_b
                .borrow_mut()
                .push(format!("b:{}", envelope.event.name()));
        });

        bus.publish(TripEvent::LegsChanged { leg_count: 2 });

        // The nested tab:flash completes (delivered to b) before the outer
        // legs-changed dispatch reaches b.
        assert_eq!(
            *order.borrow(),
            vec![
                "a:trip:legs_changed".to_string(),
                "b:tab:flash".to_string(),
                "b:trip:legs_changed".to_string(),
            ]
        );
    }

    #[test]
    fn test_emitter_never_observes_its_own_event() {
        let bus = EventBus::new();
        let count = Rc::new(RefCell::new(0u32));

        let count_inner = Rc::clone(&count);
        bus.subscribe(move |bus, envelope| {
            *count_inner.borrow_mut() += 1;
            // Without the reentrancy guard this would recurse forever.
            if matches!(envelope.event, TripEvent::LegsChanged { .. }) {
                bus.publish(TripEvent::LegsChanged { leg_count: 0 });
            }
        });

        bus.publish(TripEvent::LegsChanged { leg_count: 1 });
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let count = Rc::new(RefCell::new(0u32));

        let count_inner = Rc::clone(&count);
        let id = bus.subscribe(move |_, _| {
            *count_inner.borrow_mut() += 1;
        });

        bus.publish(TripEvent::TabFlash { tab: Tab::Stay });
        bus.unsubscribe(id);
        bus.publish(TripEvent::TabFlash { tab: Tab::Stay });

        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_names() {
        assert_eq!(TripEvent::TabFlash { tab: Tab::Stay }.name(), "tab:flash");
        assert_eq!(
            TripEvent::LegsChanged { leg_count: 1 }.name(),
            "trip:legs_changed"
        );
    }
}
