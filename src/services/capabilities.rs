use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{FetchWindow, Message, MessageRef};

/// Where messages come from. Failures are reported as `Error::Transport`.
#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn list(&self, window: &FetchWindow) -> Result<Vec<MessageRef>>;

    async fn get(&self, id: &str) -> Result<Message>;
}

/// Maps a message to the free-text task answer parsed by
/// [`parse_response`](crate::services::response_parser::parse_response).
#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        subject: &str,
        body: &str,
        reference_date: DateTime<Utc>,
    ) -> Result<String>;
}
