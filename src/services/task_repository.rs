use std::sync::Arc;

use crate::database::{queries, Store};
use crate::error::Result;
use crate::models::Task;

/// Keyed task storage. Tasks are identified by their source message id.
#[derive(Clone)]
pub struct TaskRepository {
    store: Arc<Store>,
}

impl TaskRepository {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Insert `task`, or replace every field of the task with the same id.
    pub fn upsert(&self, task: &Task) -> Result<()> {
        self.store.with_conn(|conn| queries::upsert_task(conn, task))
    }

    pub fn upsert_all(&self, tasks: &[Task]) -> Result<()> {
        self.store.with_transaction(|tx| {
            for task in tasks {
                queries::upsert_task(tx, task)?;
            }
            Ok(())
        })
    }

    pub fn get(&self, id: &str) -> Result<Option<Task>> {
        self.store.with_conn(|conn| queries::get_task(conn, id))
    }

    /// All tasks by due date, earliest first. Undated tasks come last and
    /// equal due dates keep insertion order.
    pub fn list(&self) -> Result<Vec<Task>> {
        let mut tasks = self.store.with_conn(queries::get_tasks)?;
        tasks.sort_by(|a, b| a.due_date.cmp(&b.due_date));
        Ok(tasks)
    }
}
