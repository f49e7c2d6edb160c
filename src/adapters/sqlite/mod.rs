//! SQLite adapters for the Tripsync engine.

pub mod connection;
pub mod snapshot_repository;

pub use connection::{create_pool, create_test_pool, ConnectionError, PoolConfig};
pub use snapshot_repository::SqliteSnapshotRepository;
