// ── Site domain type ──

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// The internal reference name (e.g., "default"). Used as the site
    /// identifier in legacy API paths (`/api/s/{id}/...`).
    pub id: String,
    /// Human-friendly description shown in the dashboard.
    pub description: String,
}

impl Site {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }

    /// Whether `key` names this site by description or internal id.
    pub fn matches(&self, key: &str) -> bool {
        self.description == key || self.id == key
    }
}
