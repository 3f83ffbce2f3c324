use std::collections::HashSet;
use std::sync::Arc;

use crate::database::{queries, Store};
use crate::error::Result;
use crate::models::{Dashboard, Task};
use crate::services::reconciler::CompletionReconciler;
use crate::services::task_repository::TaskRepository;

/// Split `tasks` into (current, completed) for one user's completion set.
/// Both halves keep the order of `tasks`.
pub fn partition_tasks(tasks: Vec<Task>, completed: &HashSet<String>) -> (Vec<Task>, Vec<Task>) {
    let (done, open): (Vec<Task>, Vec<Task>) = tasks
        .into_iter()
        .partition(|task| completed.contains(&task.id));
    (open, done)
}

pub fn build_dashboard(store: &Arc<Store>, user: &str) -> Result<Dashboard> {
    let tasks = TaskRepository::new(store.clone()).list()?;
    let completed = CompletionReconciler::new(store.clone()).completed_ids(user)?;
    let last_sync = store.with_conn(|conn| queries::get_last_sync(conn, user))?;

    let (current, completed) = partition_tasks(tasks, &completed);
    log::debug!(
        "dashboard for {}: {} current, {} completed",
        user,
        current.len(),
        completed.len()
    );

    Ok(Dashboard {
        user: user.to_string(),
        last_sync,
        current,
        completed,
    })
}
