//! Accommodation memory store.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::accommodation::{
    AccommodationDefaults, AccommodationEntry, AccommodationPatch, LodgingType,
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

impl Patchable for AccommodationEntry {
    type Patch = AccommodationPatch;

    fn protection(&self) -> &ProtectionFlags {
        &self.protection
    }

    fn protection_mut(&mut self) -> &mut ProtectionFlags {
        &mut self.protection
    }

    fn field_writes(patch: AccommodationPatch) -> Vec<FieldWrite<Self>> {
        let mut writes = Vec::new();
        if let Some(dates) = patch.dates {
            writes.push(FieldWrite::protected(
                "dates",
                FieldFamily::Dates,
                move |entry: &mut Self| entry.dates = Some(dates),
            ));
        }
        if let Some(preset) = patch.budget_preset {
            // Choosing a preset re-derives the explicit range; an explicit
            // range in the same patch applies afterwards and wins.
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
        if let Some(lodging) = patch.lodging_type {
            writes.push(FieldWrite::unprotected(
                "lodging_type",
                move |entry: &mut Self| entry.lodging_type = lodging,
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

/// Per-city stay summary exposed to the assistant. Carries only
/// domain-meaningful values: no ids, timestamps, or protection flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccommodationSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dates: Option<DateRange>,
    pub budget_preset: BudgetPreset,
    pub budget: BudgetRange,
    pub lodging_type: LodgingType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// LLM-consumable store summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedAccommodationState {
    pub total_entries: usize,
    pub entries_by_city: BTreeMap<String, Vec<AccommodationSummary>>,
    pub defaults: AccommodationDefaults,
}

/// Collection of stays plus store defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccommodationStore {
    entries: Vec<AccommodationEntry>,
    defaults: AccommodationDefaults,
}

impl AccommodationStore {
    pub fn new(defaults: AccommodationDefaults) -> Self {
        Self {
            entries: Vec::new(),
            defaults,
        }
    }

    /// Manually add a stay for a city. If an entry for the normalized city
    /// already exists its id is returned instead; two entries never coexist
    /// for one city.
    pub fn add_manual(&mut self, city: impl Into<String>) -> Uuid {
        let city = city.into();
        if let Some(existing) = self.by_city(&city) {
            tracing::debug!(city = %city, "manual add matched existing entry");
            return existing.id;
        }
        let entry = AccommodationEntry::new(city, self.inherited_defaults());
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    /// Route a destination into the store (auto path). Existing entries are
    /// linked, never rewritten; new entries inherit sibling defaults.
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

        let entry = AccommodationEntry::new(destination.city.clone(), self.inherited_defaults())
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

    /// Policy-gated partial update. Unknown ids are a silent no-op (`None`):
    /// callers routinely probe with stale ids after a reconciliation pass.
    pub fn update(
        &mut self,
        id: Uuid,
        patch: AccommodationPatch,
        origin: WriteOrigin,
    ) -> Option<ApplyOutcome> {
        let entry = match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => entry,
            None => {
                tracing::debug!(%id, "update for unknown accommodation entry ignored");
                return None;
            }
        };
        let outcome = apply_protected(entry, patch, origin);
        if outcome.changed() {
            entry.updated_at = Utc::now();
        }
        Some(outcome)
    }

    /// Bulk rewrite of the whole entry set. Used by the topology reconciler;
    /// entries returned untouched keep all fields and protection flags.
    pub fn update_batch(
        &mut self,
        f: impl FnOnce(Vec<AccommodationEntry>) -> Vec<AccommodationEntry>,
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

    pub fn by_city(&self, city: &str) -> Option<&AccommodationEntry> {
        let wanted = normalize_city(city);
        self.entries.iter().find(|e| e.normalized_city() == wanted)
    }

    pub fn by_destination(&self, id: DestinationId) -> Option<&AccommodationEntry> {
        self.entries.iter().find(|e| e.destination_id == Some(id))
    }

    pub fn active(&self) -> &[AccommodationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn defaults(&self) -> AccommodationDefaults {
        self.defaults
    }

    /// Defaults for a newly added entry.
    ///
    /// Siblings' shared budget preset is inherited only when every sibling
    /// still carries it unmodified; any user-modified or divergent sibling
    /// falls the new entry back to the store's global default.
    pub fn inherited_defaults(&self) -> AccommodationDefaults {
        let mut presets = self.entries.iter().map(|e| e.budget_preset);
        let Some(first) = presets.next() else {
            return self.defaults;
        };
        let shared = presets.all(|p| p == first);
        let untouched = self
            .entries
            .iter()
            .all(|e| !e.protection.user_modified_budget);

        if shared && untouched {
            AccommodationDefaults {
                budget_preset: first,
                ..self.defaults
            }
        } else {
            self.defaults
        }
    }

    pub fn serialized_state(&self) -> SerializedAccommodationState {
        let mut entries_by_city: BTreeMap<String, Vec<AccommodationSummary>> = BTreeMap::new();
        for entry in &self.entries {
            entries_by_city
                .entry(entry.city.clone())
                .or_default()
                .push(AccommodationSummary {
                    dates: entry.dates,
                    budget_preset: entry.budget_preset,
                    budget: entry.budget,
                    lodging_type: entry.lodging_type,
                    notes: entry.notes.clone(),
                });
        }
        SerializedAccommodationState {
            total_entries: self.entries.len(),
            entries_by_city,
            defaults: self.defaults,
        }
    }
}

impl Targetable for AccommodationStore {
    type Patch = AccommodationPatch;

    fn live_entries(&self) -> Vec<(Uuid, String)> {
        self.entries.iter().map(|e| (e.id, e.city.clone())).collect()
    }

    fn update(
        &mut self,
        id: Uuid,
        patch: AccommodationPatch,
        origin: WriteOrigin,
    ) -> Option<ApplyOutcome> {
        Self::update(self, id, patch, origin)
    }
}
