//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces that infrastructure adapters implement:
//! - `SnapshotRepository`: versioned snapshot storage per domain store
//!
//! The engine itself performs no I/O; adapters behind these ports do.

pub mod snapshot_repository;

pub use snapshot_repository::{InMemorySnapshotRepository, SnapshotRepository};
