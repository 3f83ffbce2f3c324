use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format shared by the analyzer grammar and the `tasks.due_date` column.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const UNKNOWN_TOKEN: &str = "Unknown";

/// Deadline of a task. Variant order matters: the derived `Ord` places every
/// concrete timestamp before `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DueDate {
    Dated(NaiveDateTime),
    Unknown,
}

impl DueDate {
    pub fn is_unknown(&self) -> bool {
        matches!(self, DueDate::Unknown)
    }

    /// Column value: `None` stands for `Unknown`.
    pub fn to_column(&self) -> Option<String> {
        match self {
            DueDate::Dated(at) => Some(at.format(DUE_DATE_FORMAT).to_string()),
            DueDate::Unknown => None,
        }
    }

    /// Lenient inverse of `to_column`; anything unreadable is `Unknown`.
    pub fn from_column(value: Option<&str>) -> Self {
        value
            .and_then(|v| NaiveDateTime::parse_from_str(v, DUE_DATE_FORMAT).ok())
            .map(DueDate::Dated)
            .unwrap_or(DueDate::Unknown)
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueDate::Dated(at) => write!(f, "{}", at.format(DUE_DATE_FORMAT)),
            DueDate::Unknown => f.write_str(UNKNOWN_TOKEN),
        }
    }
}

impl From<DueDate> for String {
    fn from(due: DueDate) -> Self {
        due.to_string()
    }
}

impl TryFrom<String> for DueDate {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == UNKNOWN_TOKEN {
            return Ok(DueDate::Unknown);
        }
        NaiveDateTime::parse_from_str(&value, DUE_DATE_FORMAT)
            .map(DueDate::Dated)
            .map_err(|e| format!("invalid due date {:?}: {}", value, e))
    }
}

/// One unpersisted task extracted from an analyzer response line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCandidate {
    pub due_date: DueDate,
    pub description: String,
}

/// A stored task. `id` is always the id of the message it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub subject: String,
    pub description: String,
    pub due_date: DueDate,
    pub source_date: DateTime<Utc>,
}
