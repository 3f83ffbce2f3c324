use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};

use crate::error::Result;
use crate::models::{DueDate, Task, User};

pub fn get_user(conn: &Connection, email: &str) -> Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT email, last_sync FROM users WHERE email = ?1",
            [email],
            |row| {
                Ok(User {
                    email: row.get(0)?,
                    last_sync: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

pub fn get_last_sync(conn: &Connection, email: &str) -> Result<Option<DateTime<Utc>>> {
    Ok(get_user(conn, email)?.and_then(|u| u.last_sync))
}

pub fn update_last_sync(conn: &Connection, email: &str, at: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "INSERT INTO users (email, last_sync) VALUES (?1, ?2)
         ON CONFLICT(email) DO UPDATE SET last_sync = excluded.last_sync",
        rusqlite::params![email, at],
    )?;
    Ok(())
}

/// Insert or fully replace a task. The row keeps its original position in
/// insertion order when it is replaced.
pub fn upsert_task(conn: &Connection, task: &Task) -> Result<()> {
    conn.execute(
        "INSERT INTO tasks (id, subject, description, due_date, source_date)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
             subject = excluded.subject,
             description = excluded.description,
             due_date = excluded.due_date,
             source_date = excluded.source_date",
        rusqlite::params![
            &task.id,
            &task.subject,
            &task.description,
            task.due_date.to_column(),
            task.source_date,
        ],
    )?;
    Ok(())
}

fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    let due: Option<String> = row.get(3)?;
    Ok(Task {
        id: row.get(0)?,
        subject: row.get(1)?,
        description: row.get(2)?,
        due_date: DueDate::from_column(due.as_deref()),
        source_date: row.get(4)?,
    })
}

/// All tasks in insertion order.
pub fn get_tasks(conn: &Connection) -> Result<Vec<Task>> {
    let mut stmt = conn.prepare(
        "SELECT id, subject, description, due_date, source_date
         FROM tasks
         ORDER BY rowid ASC",
    )?;
    let tasks = stmt
        .query_map([], row_to_task)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tasks)
}

pub fn get_task(conn: &Connection, id: &str) -> Result<Option<Task>> {
    let task = conn
        .query_row(
            "SELECT id, subject, description, due_date, source_date FROM tasks WHERE id = ?1",
            [id],
            row_to_task,
        )
        .optional()?;
    Ok(task)
}

pub fn delete_task(conn: &Connection, id: &str) -> Result<usize> {
    Ok(conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?)
}

pub fn insert_completion_mark(conn: &Connection, email: &str, task_id: &str) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO completion_marks (user_email, task_id) VALUES (?1, ?2)",
        [email, task_id],
    )?;
    Ok(())
}

pub fn delete_completion_mark(conn: &Connection, email: &str, task_id: &str) -> Result<()> {
    conn.execute(
        "DELETE FROM completion_marks WHERE user_email = ?1 AND task_id = ?2",
        [email, task_id],
    )?;
    Ok(())
}

pub fn get_completion_marks(conn: &Connection, email: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT task_id FROM completion_marks WHERE user_email = ?1 ORDER BY rowid ASC",
    )?;
    let ids = stmt
        .query_map([email], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(ids)
}

pub fn delete_completion_marks_for_user(conn: &Connection, email: &str) -> Result<usize> {
    Ok(conn.execute(
        "DELETE FROM completion_marks WHERE user_email = ?1",
        [email],
    )?)
}

/// Marks held by users other than `email` on `task_id`.
pub fn count_foreign_marks(conn: &Connection, email: &str, task_id: &str) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM completion_marks WHERE task_id = ?1 AND user_email != ?2",
        [task_id, email],
        |row| row.get(0),
    )?;
    Ok(count)
}
