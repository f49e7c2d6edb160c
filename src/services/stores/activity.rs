//! Activity memory store.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::activity::{
    ActivityDefaults, ActivityEntry, ActivityPatch, ActivityType,
};
use crate::domain::models::budget::{BudgetPreset, BudgetRange};
use crate::domain::models::dates::DateRange;
use crate::domain::models::destination::{normalize_city, Destination, DestinationId};
use crate::domain::models::protection::{FieldFamily, ProtectionFlags};

use super::super::conflict_policy::{
    apply_protected, ApplyOutcome, FieldWrite, Patchable, WriteOrigin,
};
use super::super::targeting::Targetable;
use super::UpsertOutcome;

impl Patchable for ActivityEntry {
    type Patch = ActivityPatch;

    fn protection(&self) -> &ProtectionFlags {
        &self.protection
    }

    fn protection_mut(&mut self) -> &mut ProtectionFlags {
        &mut self.protection
    }

    fn field_writes(patch: ActivityPatch) -> Vec<FieldWrite<Self>> {
        let mut writes = Vec::new();
        if let Some(dates) = patch.dates {
            writes.push(FieldWrite::protected(
                "dates",
                FieldFamily::Dates,
                move |entry: &mut Self| entry.dates = Some(dates),
            ));
        }
        if let Some(preset) = patch.budget_preset {
            writes.push(FieldWrite::protected(
                "budget_preset",
                FieldFamily::Budget,
                move |entry: &mut Self| {
                    entry.budget_preset = preset;
                    entry.budget = preset.default_range();
                },
            ));
        }
        if let Some(budget) = patch.budget {
            writes.push(FieldWrite::protected(
                "budget",
                FieldFamily::Budget,
                move |entry: &mut Self| entry.budget = budget,
            ));
        }
        if let Some(types) = patch.activity_types {
            writes.push(FieldWrite::unprotected(
                "activity_types",
                move |entry: &mut Self| entry.activity_types = types,
            ));
        }
        if let Some(notes) = patch.notes {
            writes.push(FieldWrite::unprotected("notes", move |entry: &mut Self| {
                entry.notes = Some(notes);
            }));
        }
        writes
    }
}

/// Per-city activity summary exposed to the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dates: Option<DateRange>,
    pub budget_preset: BudgetPreset,
    pub budget: BudgetRange,
    pub activity_types: Vec<ActivityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// LLM-consumable store summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedActivityState {
    pub total_entries: usize,
    pub entries_by_city: BTreeMap<String, Vec<ActivitySummary>>,
    pub defaults: ActivityDefaults,
}

/// Collection of per-city activity plans plus store defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityStore {
    entries: Vec<ActivityEntry>,
    defaults: ActivityDefaults,
}

impl ActivityStore {
    pub fn new(defaults: ActivityDefaults) -> Self {
        Self {
            entries: Vec::new(),
            defaults,
        }
    }

    /// Manually add an activity plan for a city, reusing any existing entry
    /// for the same normalized city.
    pub fn add_manual(&mut self, city: impl Into<String>) -> Uuid {
        let city = city.into();
        if let Some(existing) = self.by_city(&city) {
            return existing.id;
        }
        let entry = ActivityEntry::new(city, &self.inherited_defaults());
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    /// Route a destination into the store (auto path).
    pub fn upsert_from_destination(&mut self, destination: &Destination) -> UpsertOutcome {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.normalized_city() == destination.normalized_city())
        {
            entry.destination_id = Some(destination.id);
            entry.synced_from_destination = true;
            return UpsertOutcome::Linked(entry.id);
        }

        let entry = ActivityEntry::new(destination.city.clone(), &self.inherited_defaults())
            .with_destination(destination.id);
        let id = entry.id;
        self.entries.push(entry);
        UpsertOutcome::Created(id)
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Policy-gated partial update; unknown ids are a silent no-op.
    pub fn update(
        &mut self,
        id: Uuid,
        patch: ActivityPatch,
        origin: WriteOrigin,
    ) -> Option<ApplyOutcome> {
        let entry = match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => entry,
            None => {
                tracing::debug!(%id, "update for unknown activity entry ignored");
                return None;
            }
        };
        let outcome = apply_protected(entry, patch, origin);
        if outcome.changed() {
            entry.updated_at = Utc::now();
        }
        Some(outcome)
    }

    /// Bulk rewrite used by the topology reconciler.
    pub fn update_batch(
        &mut self,
        f: impl FnOnce(Vec<ActivityEntry>) -> Vec<ActivityEntry>,
    ) {
        let entries = std::mem::take(&mut self.entries);
        self.entries = f(entries);
    }

    /// Explicit user-initiated un-protect of one field family.
    pub fn clear_protection(&mut self, id: Uuid, family: FieldFamily) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.protection.clear(family);
                true
            }
            None => false,
        }
    }

    pub fn by_city(&self, city: &str) -> Option<&ActivityEntry> {
        let wanted = normalize_city(city);
        self.entries.iter().find(|e| e.normalized_city() == wanted)
    }

    pub fn by_destination(&self, id: DestinationId) -> Option<&ActivityEntry> {
        self.entries.iter().find(|e| e.destination_id == Some(id))
    }

    pub fn active(&self) -> &[ActivityEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn defaults(&self) -> &ActivityDefaults {
        &self.defaults
    }

    /// Sibling-preset inheritance, same rule as the accommodation store.
    pub fn inherited_defaults(&self) -> ActivityDefaults {
        let mut presets = self.entries.iter().map(|e| e.budget_preset);
        let Some(first) = presets.next() else {
            return self.defaults.clone();
        };
        let shared = presets.all(|p| p == first);
        let untouched = self
            .entries
            .iter()
            .all(|e| !e.protection.user_modified_budget);

        if shared && untouched {
            ActivityDefaults {
                budget_preset: first,
                ..self.defaults.clone()
            }
        } else {
            self.defaults.clone()
        }
    }

    pub fn serialized_state(&self) -> SerializedActivityState {
        let mut entries_by_city: BTreeMap<String, Vec<ActivitySummary>> = BTreeMap::new();
        for entry in &self.entries {
            entries_by_city
                .entry(entry.city.clone())
                .or_default()
                .push(ActivitySummary {
                    dates: entry.dates,
                    budget_preset: entry.budget_preset,
                    budget: entry.budget,
                    activity_types: entry.activity_types.clone(),
                    notes: entry.notes.clone(),
                });
        }
        SerializedActivityState {
            total_entries: self.entries.len(),
            entries_by_city,
            defaults: self.defaults.clone(),
        }
    }
}

impl Targetable for ActivityStore {
    type Patch = ActivityPatch;

    fn live_entries(&self) -> Vec<(Uuid, String)> {
        self.entries.iter().map(|e| (e.id, e.city.clone())).collect()
    }

    fn update(
        &mut self,
        id: Uuid,
        patch: ActivityPatch,
        origin: WriteOrigin,
    ) -> Option<ApplyOutcome> {
        Self::update(self, id, patch, origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::sync_service::DestinationSyncService;

    #[test]
    fn test_upsert_links_existing_entry() {
        let mut store = ActivityStore::default();
        let id = store.add_manual("Tokyo");

        let destination = DestinationSyncService::new().normalize_manual("tokyo", "JP");
        let outcome = store.upsert_from_destination(&destination);

        assert_eq!(outcome.id(), id);
        assert!(!outcome.created());
        assert!(store.by_city("Tokyo").unwrap().synced_from_destination);
    }

    #[test]
    fn test_auto_preset_write_keeps_inheritance_alive() {
        let mut store = ActivityStore::default();
        let id = store.add_manual("Tokyo");

        // Auto writes never set the protection flag, so a shared auto-written
        // preset still propagates to new siblings.
        store
            .update(
                id,
                ActivityPatch::default().budget_preset(BudgetPreset::Economy),
                WriteOrigin::Auto,
            )
            .unwrap();
        assert_eq!(
            store.inherited_defaults().budget_preset,
            BudgetPreset::Economy
        );

        let sibling = store.add_manual("Osaka");
        assert_eq!(
            store.active().iter().find(|e| e.id == sibling).unwrap().budget_preset,
            BudgetPreset::Economy
        );
    }

    #[test]
    fn test_protected_dates_survive_auto_update() {
        let mut store = ActivityStore::default();
        let id = store.add_manual("Tokyo");
        let user_dates = DateRange::new(
            chrono::NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2025, 6, 6).unwrap(),
        )
        .unwrap();
        let flight_dates = DateRange::new(
            chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2025, 6, 9).unwrap(),
        )
        .unwrap();

        store
            .update(
                id,
                ActivityPatch::default().dates(user_dates),
                WriteOrigin::Direct,
            )
            .unwrap();
        let outcome = store
            .update(
                id,
                ActivityPatch::default().dates(flight_dates),
                WriteOrigin::Auto,
            )
            .unwrap();

        assert_eq!(outcome.skipped, vec!["dates"]);
        assert_eq!(store.by_city("Tokyo").unwrap().dates, Some(user_dates));
    }
}
