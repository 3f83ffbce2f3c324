use std::sync::Arc;

use crate::database::Store;
use crate::error::Result;
use crate::models::Task;
use crate::services::reconciler::{CompletionReconciler, CompletionState};
use crate::services::task_repository::TaskRepository;

/// Set or clear the user's mark on `task_id`; returns the resulting state.
pub fn set_completion(
    store: &Arc<Store>,
    user: &str,
    task_id: &str,
    completed: bool,
) -> Result<CompletionState> {
    log::debug!("{} sets {} completed={}", user, task_id, completed);
    let reconciler = CompletionReconciler::new(store.clone());
    reconciler.set_completion(user, task_id, completed)?;
    reconciler.state(user, task_id)
}

/// Remove the user's completed tasks and marks; returns the remaining tasks.
pub fn clear_completed(store: &Arc<Store>, user: &str) -> Result<Vec<Task>> {
    CompletionReconciler::new(store.clone()).clear_completed(user)?;
    list_tasks(store)
}

pub fn list_tasks(store: &Arc<Store>) -> Result<Vec<Task>> {
    TaskRepository::new(store.clone()).list()
}
