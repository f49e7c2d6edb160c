//! Implementation of the `tripsync init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::fs;

use crate::adapters::sqlite::{create_pool, SqliteSnapshotRepository};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::config::Config;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force reinitialization even if a config already exists
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_path: PathBuf,
    pub database_initialized: bool,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        lines.push(format!("Config written to {}", self.config_path.display()));
        if self.database_initialized {
            lines.push("Snapshot database initialized".to_string());
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let base = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&args.path)
    };
    let dir = base.join(".tripsync");
    let config_path = dir.join("config.yaml");

    if config_path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let config = Config::default();
    let yaml = serde_yaml::to_string(&config).context("Failed to serialize default config")?;
    fs::write(&config_path, yaml)
        .await
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let db_path = base.join(&config.database.path);
    let pool = create_pool(
        db_path.to_str().context("Database path is not UTF-8")?,
        None,
    )
    .await
    .context("Failed to open snapshot database")?;
    SqliteSnapshotRepository::new(pool)
        .ensure_schema()
        .await
        .context("Failed to initialize snapshot schema")?;

    output(
        &InitOutput {
            success: true,
            message: "Initialized tripsync".to_string(),
            config_path,
            database_initialized: true,
        },
        json_mode,
    );
    Ok(())
}
