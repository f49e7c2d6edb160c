//! Widget interaction log.
//!
//! Append-only, bounded history of user widget interactions. Purely
//! observational: the log is never authoritative for trip state and is never
//! synchronized. It exists so the assistant can reconstruct recent user
//! intent when resolving instructions.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Widget kind that produced an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetType {
    DatePicker,
    BudgetSlider,
    CitySelector,
    TravelerCounter,
}

impl WidgetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DatePicker => "date_picker",
            Self::BudgetSlider => "budget_slider",
            Self::CitySelector => "city_selector",
            Self::TravelerCounter => "traveler_counter",
        }
    }
}

impl std::fmt::Display for WidgetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the user did with the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    Select,
    Adjust,
    Clear,
}

/// One logged interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetInteraction {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub widget_type: WidgetType,
    pub interaction_type: InteractionType,
    /// Widget-specific payload, opaque to the engine.
    pub data: serde_json::Value,
    /// Human-readable one-liner for assistant grounding.
    pub summary: String,
}

impl WidgetInteraction {
    pub fn new(
        widget_type: WidgetType,
        interaction_type: InteractionType,
        data: serde_json::Value,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            widget_type,
            interaction_type,
            data,
            summary: summary.into(),
        }
    }
}

/// Bounded, append-only interaction history (most-recent-N retained).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetInteractionLog {
    entries: VecDeque<WidgetInteraction>,
    capacity: usize,
}

impl WidgetInteractionLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity: capacity.max(1),
        }
    }

    /// Append an interaction, evicting the oldest when full.
    pub fn record(&mut self, interaction: WidgetInteraction) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(interaction);
    }

    /// Most recent first.
    pub fn recent(&self, limit: usize) -> Vec<&WidgetInteraction> {
        self.entries.iter().rev().take(limit).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for WidgetInteractionLog {
    fn default() -> Self {
        Self::new(50)
    }
}
