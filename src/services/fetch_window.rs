use chrono::{DateTime, Utc};

use crate::models::{FetchWindow, SyncSettings};

/// Query bounds for a user's next sync.
///
/// A first sync has no lower bound and only previews the newest
/// `initial_limit` messages. Later syncs catch up from `last_sync` with the
/// larger `incremental_limit`. A `last_sync` in the future is passed through
/// unchanged; the source simply returns nothing.
pub fn compute_window(last_sync: Option<DateTime<Utc>>, settings: &SyncSettings) -> FetchWindow {
    match last_sync {
        None => FetchWindow {
            since: None,
            limit: settings.initial_limit,
        },
        Some(since) => FetchWindow {
            since: Some(since),
            limit: settings.incremental_limit,
        },
    }
}
