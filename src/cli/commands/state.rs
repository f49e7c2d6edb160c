//! Implementation of the `tripsync state` command.

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::sqlite::{create_pool, SqliteSnapshotRepository};
use crate::cli::display::{list_table, render_section};
use crate::cli::output::{output, truncate, CommandOutput};
use crate::infrastructure::config::ConfigLoader;
use crate::services::engine::{TripEngine, TripStateSummary};

#[derive(Args, Debug)]
pub struct StateArgs {}

#[derive(Debug, serde::Serialize)]
pub struct StateOutput {
    pub state: TripStateSummary,
}

impl CommandOutput for StateOutput {
    fn to_human(&self) -> String {
        let mut sections = Vec::new();

        let mut legs = list_table(&["from", "to", "departure"]);
        for leg in &self.state.flight.legs {
            legs.add_row(vec![
                leg.from.clone(),
                leg.to.clone(),
                leg.departure.map_or_else(|| "-".to_string(), |d| d.to_string()),
            ]);
        }
        sections.push(render_section(
            &format!("Flights ({})", self.state.flight.trip_type),
            legs,
            self.state.flight.total_legs,
        ));

        let mut stays = list_table(&["city", "dates", "budget", "lodging", "notes"]);
        for (city, entries) in &self.state.accommodation.entries_by_city {
            for entry in entries {
                stays.add_row(vec![
                    city.clone(),
                    entry
                        .dates
                        .map_or_else(|| "-".to_string(), |d| d.to_string()),
                    format!("{} ({})", entry.budget_preset, entry.budget),
                    entry.lodging_type.to_string(),
                    truncate(entry.notes.as_deref().unwrap_or("-"), 30),
                ]);
            }
        }
        sections.push(render_section(
            "Stays",
            stays,
            self.state.accommodation.total_entries,
        ));

        let mut activities = list_table(&["city", "dates", "budget", "types"]);
        for (city, entries) in &self.state.activity.entries_by_city {
            for entry in entries {
                let types: Vec<String> =
                    entry.activity_types.iter().map(ToString::to_string).collect();
                activities.add_row(vec![
                    city.clone(),
                    entry
                        .dates
                        .map_or_else(|| "-".to_string(), |d| d.to_string()),
                    format!("{} ({})", entry.budget_preset, entry.budget),
                    types.join(", "),
                ]);
            }
        }
        sections.push(render_section(
            "Activities",
            activities,
            self.state.activity.total_entries,
        ));

        let travelers = &self.state.traveler;
        sections.push(format!(
            "{}\n  {} adult(s), {} child(ren), {} infant(s) - {} room(s) suggested",
            crate::cli::display::section("Travelers"),
            travelers.adults,
            travelers.children,
            travelers.infants,
            travelers.suggested_rooms,
        ));

        sections.join("\n\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(_args: StateArgs, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let pool = create_pool(&config.database.path, None)
        .await
        .context("Failed to open snapshot database (run `tripsync init` first)")?;
    let repository = SqliteSnapshotRepository::new(pool);
    repository.ensure_schema().await?;

    let engine = TripEngine::new(&config);
    engine.hydrate(&repository).await?;

    output(
        &StateOutput {
            state: engine.serialized_state(),
        },
        json_mode,
    );
    Ok(())
}
