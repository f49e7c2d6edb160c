//! Domain errors for the Tripsync engine.
//!
//! Nothing in the engine is allowed to crash the surrounding surface: every
//! failure mode degrades to "use defaults" or "no-op with explanation". The
//! variants here cover the boundaries where a caller still needs a typed
//! reason (persistence, migration, validation).

use thiserror::Error;

use super::models::destination::DestinationId;

/// Domain-level errors that can occur in the Tripsync engine.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Destination not found: {0}")]
    DestinationNotFound(DestinationId),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Snapshot storage error: {0}")]
    SnapshotStorage(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Persistence worker unavailable: {0}")]
    PersistenceUnavailable(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::SnapshotStorage(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
