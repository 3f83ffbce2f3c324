use rusqlite::Connection;

use crate::error::Result;

pub fn create_tables(conn: &Connection) -> Result<()> {
    // Users table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            email TEXT PRIMARY KEY,
            last_sync TEXT
        )",
        [],
    )?;

    // Tasks table, keyed by the id of the message each task came from.
    // due_date is NULL for tasks without a known deadline.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            subject TEXT NOT NULL,
            description TEXT NOT NULL,
            due_date TEXT,
            source_date TEXT NOT NULL
        )",
        [],
    )?;

    // Completion marks: row present means the user considers the task done.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS completion_marks (
            user_email TEXT NOT NULL,
            task_id TEXT NOT NULL,
            UNIQUE(user_email, task_id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_completion_marks_task_id ON completion_marks(task_id)",
        [],
    )?;

    Ok(())
}
