use chrono::{DateTime, Utc};

use crate::context::AppContext;
use crate::database::queries;
use crate::error::Result;
use crate::models::{SyncReport, Task};
use crate::services::sync_engine;

/// Sync `user` from an explicit last-sync time and return the stored tasks.
/// Does not touch the user's recorded last-sync.
pub async fn sync(
    ctx: &AppContext,
    user: &str,
    last_sync: Option<DateTime<Utc>>,
) -> Result<Vec<Task>> {
    Ok(sync_engine::run_sync(ctx, user, last_sync).await?.stored)
}

/// Sync `user` from their recorded last-sync time.
///
/// The recorded time moves to the start of this sync only when every message
/// succeeded, so failed messages are retried by the next sync.
pub async fn sync_user(ctx: &AppContext, user: &str) -> Result<SyncReport> {
    let last_sync = ctx
        .store
        .with_conn(|conn| queries::get_last_sync(conn, user))?;

    let report = sync_engine::run_sync(ctx, user, last_sync).await?;

    if report.is_complete() {
        ctx.store
            .with_conn(|conn| queries::update_last_sync(conn, user, report.started_at))?;
    } else {
        log::warn!(
            "{} message(s) failed for {}; keeping last sync at {:?}",
            report.failures.len(),
            user,
            last_sync
        );
    }

    Ok(report)
}
