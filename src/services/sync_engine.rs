use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};

use crate::context::AppContext;
use crate::error::Result;
use crate::models::{
    DueDate, Message, MessageOutcome, MessageRef, SyncFailure, SyncReport, Task, TaskCandidate,
};
use crate::services::capabilities::{ContentAnalyzer, MessageSource};
use crate::services::fetch_window::compute_window;
use crate::services::response_parser::parse_response;
use crate::services::task_repository::TaskRepository;

/// Fetch, analyze and store the tasks of every message in the user's window.
///
/// Listing failures abort the sync. Per-message fetch or analysis failures
/// are collected in the report while the other messages are still stored.
pub async fn run_sync(
    ctx: &AppContext,
    user: &str,
    last_sync: Option<DateTime<Utc>>,
) -> Result<SyncReport> {
    let started_at = Utc::now();
    let window = compute_window(last_sync, &ctx.settings.sync);
    log::info!(
        "syncing {} (since {:?}, limit {})",
        user,
        window.since,
        window.limit
    );

    let mut refs = ctx.source.list(&window).await?;
    if refs.len() > window.limit {
        log::warn!(
            "message source returned {} messages for a limit of {}",
            refs.len(),
            window.limit
        );
        refs.truncate(window.limit);
    }

    let outcomes = analyze_messages(
        ctx.source.as_ref(),
        ctx.analyzer.as_ref(),
        refs,
        ctx.settings.sync.max_concurrency,
    )
    .await;

    let mut stored = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            MessageOutcome::Analyzed {
                message,
                candidates,
            } => {
                if let Some(task) = fold_candidates(&message, candidates) {
                    stored.push(task);
                }
            }
            MessageOutcome::Failed { message_id, error } => {
                log::error!("message {} failed: {}", message_id, error);
                failures.push(SyncFailure { message_id, error });
            }
        }
    }

    TaskRepository::new(ctx.store.clone()).upsert_all(&stored)?;
    log::info!(
        "sync for {} stored {} task(s), {} failure(s)",
        user,
        stored.len(),
        failures.len()
    );

    Ok(SyncReport {
        started_at,
        window,
        stored,
        failures,
    })
}

/// Run fetch+analyze for every ref with at most `max_concurrency` in flight.
/// Outcomes are returned in listing order.
pub async fn analyze_messages(
    source: &dyn MessageSource,
    analyzer: &dyn ContentAnalyzer,
    refs: Vec<MessageRef>,
    max_concurrency: usize,
) -> Vec<MessageOutcome> {
    stream::iter(refs)
        .map(|message_ref| analyze_message(source, analyzer, message_ref.id))
        .buffered(max_concurrency.max(1))
        .collect()
        .await
}

async fn analyze_message(
    source: &dyn MessageSource,
    analyzer: &dyn ContentAnalyzer,
    message_id: String,
) -> MessageOutcome {
    let message = match source.get(&message_id).await {
        Ok(message) => message,
        Err(e) => {
            return MessageOutcome::Failed {
                message_id,
                error: e.to_string(),
            }
        }
    };

    match analyzer
        .analyze(&message.subject, &message.body_snippet, message.source_date)
        .await
    {
        Ok(answer) => MessageOutcome::Analyzed {
            candidates: parse_response(&answer).collect(),
            message,
        },
        Err(e) => MessageOutcome::Failed {
            message_id,
            error: e.to_string(),
        },
    }
}

/// Collapse a message's candidates into the single task keyed by its id.
///
/// The task is due at the earliest dated candidate, or `Unknown` if none is
/// dated; descriptions are kept one per line in response order. A message
/// with no candidates produces no task.
pub fn fold_candidates(message: &Message, candidates: Vec<TaskCandidate>) -> Option<Task> {
    if candidates.is_empty() {
        return None;
    }
    let due_date = candidates
        .iter()
        .map(|c| c.due_date)
        .filter(|d| !d.is_unknown())
        .min()
        .unwrap_or(DueDate::Unknown);
    let description = candidates
        .into_iter()
        .map(|c| c.description)
        .collect::<Vec<_>>()
        .join("\n");

    Some(Task {
        id: message.id.clone(),
        subject: message.subject.clone(),
        description,
        due_date,
        source_date: message.source_date,
    })
}
