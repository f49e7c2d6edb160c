pub mod conflict_policy;
pub mod engine;
pub mod event_bus;
pub mod migration;
pub mod persistence;
pub mod reconciler;
pub mod stores;
pub mod sync_service;
pub mod targeting;

pub use conflict_policy::{apply_protected, ApplyOutcome, WriteOrigin};
pub use engine::{TripEngine, TripStateSummary};
pub use event_bus::{EventBus, Provenance, SyncTarget, Tab, TripEvent};
pub use migration::{migrate, VersionedMemory};
pub use persistence::PersistenceHandle;
pub use reconciler::{ReconcileReport, RequiredAddition, TopologyReconciler};
pub use stores::{AccommodationStore, ActivityStore, FlightStore, TravelerStore};
pub use sync_service::{DestinationSyncService, SyncStatus};
pub use targeting::{CityTarget, Instruction, InstructionPatch, TargetingResult};
