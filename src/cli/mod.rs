//! Command-line interface for inspecting and maintaining persisted trip
//! state.

pub mod commands;
pub mod display;
pub mod output;

use clap::{Parser, Subcommand};

/// Tripsync - cross-surface trip planning engine
#[derive(Parser, Debug)]
#[command(name = "tripsync", version, about)]
pub struct Cli {
    /// Emit machine-readable JSON instead of human output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize .tripsync/ with a default config and snapshot database
    Init(commands::init::InitArgs),
    /// Show the persisted trip state
    State(commands::state::StateArgs),
    /// Upgrade persisted snapshots to the current schema versions
    Migrate(commands::migrate::MigrateArgs),
}

/// Print an error and exit non-zero, honoring `--json`.
pub fn handle_error(err: anyhow::Error, json_mode: bool) {
    if json_mode {
        let payload = serde_json::json!({ "success": false, "error": format!("{err:#}") });
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&payload).unwrap_or_default()
        );
    } else {
        eprintln!("{} {err:#}", console::style("error:").red().bold());
    }
    std::process::exit(1);
}
