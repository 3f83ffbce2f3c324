use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::database::{queries, Store};
use crate::error::Result;

/// Completion state of one (user, task) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionState {
    Open,
    Completed,
}

/// Per-user completion marks over the shared task table.
#[derive(Clone)]
pub struct CompletionReconciler {
    store: Arc<Store>,
}

impl CompletionReconciler {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Move the pair to `Completed`. Marking twice is a no-op.
    pub fn mark(&self, user: &str, task_id: &str) -> Result<()> {
        self.store
            .with_conn(|conn| queries::insert_completion_mark(conn, user, task_id))
    }

    /// Move the pair back to `Open`. Unmarking an open pair is a no-op.
    pub fn unmark(&self, user: &str, task_id: &str) -> Result<()> {
        self.store
            .with_conn(|conn| queries::delete_completion_mark(conn, user, task_id))
    }

    pub fn set_completion(&self, user: &str, task_id: &str, completed: bool) -> Result<()> {
        if completed {
            self.mark(user, task_id)
        } else {
            self.unmark(user, task_id)
        }
    }

    pub fn state(&self, user: &str, task_id: &str) -> Result<CompletionState> {
        let completed = self.completed_ids(user)?.contains(task_id);
        Ok(if completed {
            CompletionState::Completed
        } else {
            CompletionState::Open
        })
    }

    pub fn completed_ids(&self, user: &str) -> Result<HashSet<String>> {
        let ids = self
            .store
            .with_conn(|conn| queries::get_completion_marks(conn, user))?;
        Ok(ids.into_iter().collect())
    }

    /// Delete every task `user` has completed, then every mark `user` holds,
    /// in one transaction. Returns the number of task rows removed.
    ///
    /// Task rows are shared, so this also removes tasks other users still
    /// have open or marked; their marks are left dangling and are ignored by
    /// the dashboard.
    pub fn clear_completed(&self, user: &str) -> Result<usize> {
        let removed = self.store.with_transaction(|tx| {
            let completed = queries::get_completion_marks(tx, user)?;
            let mut removed = 0;
            for task_id in &completed {
                let foreign = queries::count_foreign_marks(tx, user, task_id)?;
                if foreign > 0 {
                    log::warn!(
                        "clearing task {} still marked by {} other user(s)",
                        task_id,
                        foreign
                    );
                }
                removed += queries::delete_task(tx, task_id)?;
            }
            queries::delete_completion_marks_for_user(tx, user)?;
            Ok(removed)
        })?;
        log::info!("cleared {} completed task(s) for {}", removed, user);
        Ok(removed)
    }
}
