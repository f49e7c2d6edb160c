//! Snapshot storage port.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainResult;

/// Snapshot key, one per domain store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    Flight,
    Accommodation,
    Activity,
    Traveler,
}

impl StoreKind {
    pub const ALL: [Self; 4] = [
        Self::Flight,
        Self::Accommodation,
        Self::Activity,
        Self::Traveler,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flight => "flight",
            Self::Accommodation => "accommodation",
            Self::Activity => "activity",
            Self::Traveler => "traveler",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "flight" => Some(Self::Flight),
            "accommodation" => Some(Self::Accommodation),
            "activity" => Some(Self::Activity),
            "traveler" => Some(Self::Traveler),
            _ => None,
        }
    }
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Storage for versioned store snapshots.
///
/// Payloads are opaque JSON strings; versioning and migration happen above
/// this port in `services::migration`.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Persist the latest snapshot for a store, replacing any previous one.
    async fn save(&self, kind: StoreKind, payload: &str) -> DomainResult<()>;

    /// Load the latest snapshot for a store, if any.
    async fn load(&self, kind: StoreKind) -> DomainResult<Option<String>>;

    /// Remove the snapshot for a store.
    async fn delete(&self, kind: StoreKind) -> DomainResult<()>;
}

/// In-memory repository for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemorySnapshotRepository {
    snapshots: Mutex<HashMap<StoreKind, String>>,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotRepository for InMemorySnapshotRepository {
    async fn save(&self, kind: StoreKind, payload: &str) -> DomainResult<()> {
        let mut snapshots = self.snapshots.lock().expect("snapshot lock poisoned");
        snapshots.insert(kind, payload.to_string());
        Ok(())
    }

    async fn load(&self, kind: StoreKind) -> DomainResult<Option<String>> {
        let snapshots = self.snapshots.lock().expect("snapshot lock poisoned");
        Ok(snapshots.get(&kind).cloned())
    }

    async fn delete(&self, kind: StoreKind) -> DomainResult<()> {
        let mut snapshots = self.snapshots.lock().expect("snapshot lock poisoned");
        snapshots.remove(&kind);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let repo = InMemorySnapshotRepository::new();
        assert!(repo.load(StoreKind::Flight).await.unwrap().is_none());

        repo.save(StoreKind::Flight, "{\"version\":1}").await.unwrap();
        assert_eq!(
            repo.load(StoreKind::Flight).await.unwrap().as_deref(),
            Some("{\"version\":1}")
        );

        repo.delete(StoreKind::Flight).await.unwrap();
        assert!(repo.load(StoreKind::Flight).await.unwrap().is_none());
    }

    #[test]
    fn test_store_kind_round_trip() {
        for kind in StoreKind::ALL {
            assert_eq!(StoreKind::from_str(kind.as_str()), Some(kind));
        }
    }
}
