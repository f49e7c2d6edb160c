//! SQLite implementation of the SnapshotRepository.
//!
//! One row per domain store, replaced wholesale on every save. The schema is
//! bootstrapped on construction; payloads stay opaque JSON so schema
//! evolution lives entirely in `services::migration`.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::errors::DomainResult;
use crate::domain::ports::snapshot_repository::{SnapshotRepository, StoreKind};

#[derive(Clone)]
pub struct SqliteSnapshotRepository {
    pool: SqlitePool,
}

impl SqliteSnapshotRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the snapshot table if it does not exist yet.
    pub async fn ensure_schema(&self) -> DomainResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS trip_snapshots (
                store TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotRepository for SqliteSnapshotRepository {
    async fn save(&self, kind: StoreKind, payload: &str) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO trip_snapshots (store, payload, updated_at)
             VALUES (?, ?, datetime('now'))
             ON CONFLICT(store) DO UPDATE SET
               payload = excluded.payload,
               updated_at = excluded.updated_at",
        )
        .bind(kind.as_str())
        .bind(payload)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load(&self, kind: StoreKind) -> DomainResult<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT payload FROM trip_snapshots WHERE store = ?")
                .bind(kind.as_str())
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(payload,)| payload))
    }

    async fn delete(&self, kind: StoreKind) -> DomainResult<()> {
        sqlx::query("DELETE FROM trip_snapshots WHERE store = ?")
            .bind(kind.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
