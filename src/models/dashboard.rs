use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Task;

/// Render model for one user: open tasks first, then the ones they marked done.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub user: String,
    pub last_sync: Option<DateTime<Utc>>,
    pub current: Vec<Task>,
    pub completed: Vec<Task>,
}

impl Dashboard {
    /// Human-readable line for the last sync, e.g. for a page header.
    pub fn last_sync_display(&self) -> String {
        match self.last_sync {
            Some(at) => at.format("%Y-%m-%d %H:%M UTC").to_string(),
            None => "This is your first sync".to_string(),
        }
    }
}
