use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Message, TaskCandidate, Task};

/// Query bounds handed to the message source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchWindow {
    pub since: Option<DateTime<Utc>>,
    pub limit: usize,
}

/// Result of fetching and analyzing a single message.
#[derive(Debug, Clone)]
pub enum MessageOutcome {
    Analyzed {
        message: Message,
        candidates: Vec<TaskCandidate>,
    },
    Failed {
        message_id: String,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncFailure {
    pub message_id: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub window: FetchWindow,
    pub stored: Vec<Task>,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
