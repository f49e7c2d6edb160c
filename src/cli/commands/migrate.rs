//! Implementation of the `tripsync migrate` command.
//!
//! Loads each persisted snapshot, runs the upgrade chain, and writes the
//! upgraded form back so later loads start at the current version.

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::sqlite::{create_pool, SqliteSnapshotRepository};
use crate::cli::output::{output, CommandOutput};
use crate::domain::ports::snapshot_repository::{SnapshotRepository, StoreKind};
use crate::infrastructure::config::ConfigLoader;
use crate::services::migration;

#[derive(Args, Debug)]
pub struct MigrateArgs {}

#[derive(Debug, serde::Serialize)]
pub struct MigrateOutput {
    pub migrated: Vec<StoreMigration>,
}

#[derive(Debug, serde::Serialize)]
pub struct StoreMigration {
    pub store: String,
    pub from_version: Option<u32>,
    pub to_version: u32,
    pub status: String,
}

impl CommandOutput for MigrateOutput {
    fn to_human(&self) -> String {
        self.migrated
            .iter()
            .map(|m| {
                let from = m
                    .from_version
                    .map_or_else(|| "-".to_string(), |v| v.to_string());
                format!("{:<14} v{} -> v{}  {}", m.store, from, m.to_version, m.status)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(_args: MigrateArgs, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let pool = create_pool(&config.database.path, None)
        .await
        .context("Failed to open snapshot database (run `tripsync init` first)")?;
    let repository = SqliteSnapshotRepository::new(pool);
    repository.ensure_schema().await?;

    let mut migrated = Vec::new();
    for kind in StoreKind::ALL {
        let target = migration::current_version(kind);
        let Some(raw) = repository.load(kind).await? else {
            migrated.push(StoreMigration {
                store: kind.to_string(),
                from_version: None,
                to_version: target,
                status: "no snapshot".to_string(),
            });
            continue;
        };

        match migration::migrate(kind, &raw) {
            Some(upgraded) => {
                let stored_version: Option<u32> = serde_json::from_str::<serde_json::Value>(&raw)
                    .ok()
                    .and_then(|v| v.get("version").and_then(serde_json::Value::as_u64))
                    .and_then(|v| u32::try_from(v).ok());

                if stored_version == Some(upgraded.version) {
                    migrated.push(StoreMigration {
                        store: kind.to_string(),
                        from_version: stored_version,
                        to_version: upgraded.version,
                        status: "up to date".to_string(),
                    });
                    continue;
                }

                let payload = serde_json::to_string(&upgraded)?;
                repository.save(kind, &payload).await?;
                migrated.push(StoreMigration {
                    store: kind.to_string(),
                    from_version: stored_version,
                    to_version: upgraded.version,
                    status: "migrated".to_string(),
                });
            }
            None => {
                migrated.push(StoreMigration {
                    store: kind.to_string(),
                    from_version: None,
                    to_version: target,
                    status: "corrupt snapshot, left untouched".to_string(),
                });
            }
        }
    }

    output(&MigrateOutput { migrated }, json_mode);
    Ok(())
}
