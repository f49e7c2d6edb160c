//! Versioned snapshot contract and schema migration.
//!
//! Every persisted store is wrapped in [`VersionedMemory`]. Loading parses
//! the wrapper, applies single next-version upgrade steps until the stored
//! version reaches the compiled-in current version, and hands the result to
//! the typed store. A missing upgrade step degrades to a best-effort
//! pass-through with a logged warning; unparseable input yields `None` and
//! the caller substitutes the store's compiled-in default. Nothing here
//! throws past the load boundary.
//!
//! Upgrade steps are pure `Value -> Value` functions with no side effects;
//! re-persisting the upgraded form is the engine's job after hydration.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::errors::DomainResult;
use crate::domain::models::budget::BudgetPreset;
use crate::domain::ports::snapshot_repository::StoreKind;

/// Versioned wrapper around persisted store state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedMemory<T> {
    pub version: u32,
    pub data: T,
}

/// Compiled-in current schema version per store.
pub fn current_version(kind: StoreKind) -> u32 {
    match kind {
        StoreKind::Flight => 2,
        StoreKind::Accommodation => 3,
        StoreKind::Activity => 2,
        StoreKind::Traveler => 1,
    }
}

/// Serialize live store state into its versioned snapshot payload.
pub fn snapshot<T: Serialize>(kind: StoreKind, data: &T) -> DomainResult<String> {
    let wrapped = VersionedMemory {
        version: current_version(kind),
        data,
    };
    Ok(serde_json::to_string(&wrapped)?)
}

/// Parse and upgrade a stored snapshot.
///
/// Returns `None` for unparseable input or a malformed wrapper. Otherwise
/// returns the best-effort upgraded value; the version equals
/// [`current_version`] unless an upgrade step was missing.
pub fn migrate(kind: StoreKind, raw: &str) -> Option<VersionedMemory<Value>> {
    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(store = %kind, error = %err, "corrupt snapshot, falling back to defaults");
            return None;
        }
    };

    let Some(version) = parsed.get("version").and_then(Value::as_u64) else {
        tracing::warn!(store = %kind, "snapshot missing version field, falling back to defaults");
        return None;
    };
    #[allow(clippy::cast_possible_truncation)]
    let mut version = version as u32;
    let Some(mut data) = parsed.get("data").cloned() else {
        tracing::warn!(store = %kind, "snapshot missing data field, falling back to defaults");
        return None;
    };

    let target = current_version(kind);
    if version > target {
        tracing::warn!(
            store = %kind,
            stored = version,
            current = target,
            "snapshot from a newer schema, passing through unchanged"
        );
    }

    while version < target {
        match upgrade_step(kind, version, data.clone()) {
            Some(upgraded) => {
                tracing::info!(store = %kind, from = version, to = version + 1, "migrated snapshot");
                data = upgraded;
                version += 1;
            }
            None => {
                tracing::warn!(
                    store = %kind,
                    stuck_at = version,
                    current = target,
                    "no migration defined, using best-effort state"
                );
                break;
            }
        }
    }

    Some(VersionedMemory { version, data })
}

/// Migrate and deserialize into the typed store state. `None` means the
/// caller must substitute the compiled-in default.
pub fn load_store<T: DeserializeOwned>(kind: StoreKind, raw: &str) -> Option<T> {
    let migrated = migrate(kind, raw)?;
    match serde_json::from_value(migrated.data) {
        Ok(state) => Some(state),
        Err(err) => {
            tracing::warn!(store = %kind, error = %err, "snapshot shape mismatch, falling back to defaults");
            None
        }
    }
}

/// The single upgrade step from `version` to `version + 1`.
fn upgrade_step(kind: StoreKind, version: u32, mut data: Value) -> Option<Value> {
    match (kind, version) {
        // v1 stored one budget string per entry; v2 splits it into a preset
        // plus an explicit nightly range.
        (StoreKind::Accommodation, 1) => {
            if let Some(entries) = data.get_mut("entries").and_then(Value::as_array_mut) {
                for entry in entries {
                    let preset = entry
                        .get("budget")
                        .and_then(Value::as_str)
                        .and_then(BudgetPreset::from_str)
                        .unwrap_or_default();
                    entry["budget_preset"] = json!(preset);
                    entry["budget"] = json!(preset.default_range());
                }
            }
            if let Some(defaults) = data.get_mut("defaults") {
                let preset = defaults
                    .get("budget")
                    .and_then(Value::as_str)
                    .and_then(BudgetPreset::from_str)
                    .unwrap_or_default();
                *defaults = json!({ "budget_preset": preset });
            }
            Some(data)
        }
        // v3 adds lodging type to entries and defaults.
        (StoreKind::Accommodation, 2) => {
            if let Some(entries) = data.get_mut("entries").and_then(Value::as_array_mut) {
                for entry in entries {
                    if entry.get("lodging_type").is_none() {
                        entry["lodging_type"] = json!("hotel");
                    }
                }
            }
            if let Some(defaults) = data.get_mut("defaults").and_then(Value::as_object_mut) {
                defaults
                    .entry("lodging_type")
                    .or_insert_with(|| json!("hotel"));
            }
            Some(data)
        }
        // v1 stored a single activity type per entry; v2 holds a list.
        (StoreKind::Activity, 1) => {
            if let Some(entries) = data.get_mut("entries").and_then(Value::as_array_mut) {
                for entry in entries {
                    let types = match entry.get("activity_type").and_then(Value::as_str) {
                        Some(single) => json!([single]),
                        None => json!(["sightseeing"]),
                    };
                    entry["activity_types"] = types;
                    if let Some(fields) = entry.as_object_mut() {
                        fields.remove("activity_type");
                    }
                }
            }
            if let Some(defaults) = data.get_mut("defaults").and_then(Value::as_object_mut) {
                if let Some(single) = defaults.remove("activity_type") {
                    defaults.insert("activity_types".to_string(), json!([single]));
                } else {
                    defaults
                        .entry("activity_types")
                        .or_insert_with(|| json!(["sightseeing"]));
                }
            }
            Some(data)
        }
        // v1 stored camelCase trip types.
        (StoreKind::Flight, 1) => {
            if let Some(trip_type) = data.get("trip_type").and_then(Value::as_str) {
                let renamed = match trip_type {
                    "oneWay" => "one_way",
                    "roundTrip" => "round_trip",
                    "multiCity" => "multi_city",
                    other => other,
                };
                data["trip_type"] = json!(renamed);
            }
            Some(data)
        }
        _ => None,
    }
}
