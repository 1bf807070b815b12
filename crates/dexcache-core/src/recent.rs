use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::PokemonSummary;

/// How many recent selections are kept.
pub const MAX_RECENT_SELECTIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSelection {
    pub id: u32,
    pub name: String,
    pub selected_at: DateTime<Utc>,
}

/// Most recently selected entities, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentSelections {
    entries: Vec<RecentSelection>,
}

impl RecentSelections {
    /// Move `summary` to the front, dropping the oldest entry past capacity.
    pub fn add(&mut self, summary: &PokemonSummary, at: DateTime<Utc>) {
        self.entries.retain(|e| e.id != summary.id);
        self.entries.insert(
            0,
            RecentSelection {
                id: summary.id,
                name: summary.name.clone(),
                selected_at: at,
            },
        );
        self.entries.truncate(MAX_RECENT_SELECTIONS);
    }

    pub fn remove(&mut self, id: u32) {
        self.entries.retain(|e| e.id != id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn list(&self) -> &[RecentSelection] {
        &self.entries
    }
}
