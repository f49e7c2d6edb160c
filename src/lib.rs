//! Tripsync - Cross-Surface Trip Planning Engine
//!
//! Tripsync keeps a multi-destination trip consistent across three
//! interchangeable surfaces: a conversational assistant, domain memory stores
//! (flights, accommodations, activities, traveler profile), and interactive
//! widgets. Any surface may originate a change; the engine normalizes it,
//! propagates it to dependent stores, and refuses to overwrite anything the
//! user deliberately customized.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure models, protection flags, and ports
//! - **Service Layer** (`services`): Event bus, sync service, conflict
//!   policy, targeting resolver, topology reconciler, memory stores,
//!   migration, and the composition-root engine
//! - **Infrastructure Layer** (`infrastructure`): Configuration loading
//! - **Adapters** (`adapters`): SQLite snapshot storage
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```
//! use tripsync::domain::models::{Airport, FlightLeg};
//! use tripsync::services::TripEngine;
//!
//! let engine = TripEngine::default();
//! engine.finalize_flight_leg(FlightLeg::new(
//!     Airport::new("BOS", "Boston", "US"),
//!     Airport::new("NRT", "Tokyo", "JP"),
//! ));
//! assert_eq!(engine.accommodation().len(), 1);
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AccommodationEntry, AccommodationPatch, ActivityEntry, ActivityPatch, Airport, BudgetPreset,
    BudgetRange, Config, DateRange, Destination, DestinationId, FieldFamily, FlightLeg,
    TravelerGroup, TripType, WidgetInteraction,
};
pub use domain::ports::{InMemorySnapshotRepository, SnapshotRepository};
pub use services::{
    CityTarget, DestinationSyncService, EventBus, Instruction, PersistenceHandle, SyncTarget,
    TargetingResult, TripEngine, TripEvent, WriteOrigin,
};
