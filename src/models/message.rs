use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference returned by a message source listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub id: String,
}

/// A fetched message. Only the snippet is ever held, never the full body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub subject: String,
    pub body_snippet: String,
    pub source_date: DateTime<Utc>,
}
