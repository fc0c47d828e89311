// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::error::{Error, Result};
use crate::task::{Task, TaskUpdate};

use super::{parse_timestamp, parse_timestamp_opt, Database};

const TASK_COLUMNS: &str = "id, ticket_id, title, description, status_id, priority_id,
     assigned_to, progress, start_date, due_date, created_by, created_at, updated_at";

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let start_str: Option<String> = row.get(8)?;
    let due_str: Option<String> = row.get(9)?;
    let created_str: String = row.get(11)?;
    let updated_str: String = row.get(12)?;

    Ok(Task {
        id: row.get(0)?,
        ticket_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status_id: row.get(4)?,
        priority_id: row.get(5)?,
        assigned_to: row.get(6)?,
        progress: row.get(7)?,
        start_date: parse_timestamp_opt(start_str, "start_date")?,
        due_date: parse_timestamp_opt(due_str, "due_date")?,
        created_by: row.get(10)?,
        created_at: parse_timestamp(&created_str, "created_at")?,
        updated_at: parse_timestamp(&updated_str, "updated_at")?,
    })
}

pub(crate) fn task_exists_on(conn: &Connection, id: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM tasks WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub(crate) fn insert_task_on(conn: &Connection, task: &Task) -> Result<()> {
    conn.execute(
        "INSERT INTO tasks (id, ticket_id, title, description, status_id, priority_id,
         assigned_to, progress, start_date, due_date, created_by, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            task.id,
            task.ticket_id,
            task.title,
            task.description,
            task.status_id,
            task.priority_id,
            task.assigned_to,
            task.progress,
            task.start_date.map(|d| d.to_rfc3339()),
            task.due_date.map(|d| d.to_rfc3339()),
            task.created_by,
            task.created_at.to_rfc3339(),
            task.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub(crate) fn get_task_on(conn: &Connection, id: &str) -> Result<Task> {
    let task = conn
        .query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
            params![id],
            row_to_task,
        )
        .optional()?;
    task.ok_or_else(|| Error::task_not_found(id))
}

/// Move a task from `from` to `to`. Returns false when the task is no
/// longer in `from`.
pub(crate) fn update_task_status_on(
    conn: &Connection,
    id: &str,
    from: &str,
    to: &str,
    now: DateTime<Utc>,
) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE tasks SET status_id = ?1, updated_at = ?2 WHERE id = ?3 AND status_id = ?4",
        params![to, now.to_rfc3339(), id, from],
    )?;
    Ok(affected == 1)
}

pub(crate) fn update_task_assignee_on(
    conn: &Connection,
    id: &str,
    assignee: Option<&str>,
    now: DateTime<Utc>,
) -> Result<()> {
    let affected = conn.execute(
        "UPDATE tasks SET assigned_to = ?1, updated_at = ?2 WHERE id = ?3",
        params![assignee, now.to_rfc3339(), id],
    )?;
    if affected == 0 {
        return Err(Error::task_not_found(id));
    }
    Ok(())
}

pub(crate) fn update_task_fields_on(
    conn: &Connection,
    id: &str,
    update: &TaskUpdate,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut sets: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(title) = &update.title {
        sets.push("title = ?");
        values.push(Value::Text(title.clone()));
    }
    if let Some(description) = &update.description {
        sets.push("description = ?");
        values.push(description.clone().map_or(Value::Null, Value::Text));
    }
    if let Some(priority) = &update.priority_id {
        sets.push("priority_id = ?");
        values.push(priority.clone().map_or(Value::Null, Value::Text));
    }
    if let Some(progress) = update.progress {
        sets.push("progress = ?");
        values.push(Value::Integer(i64::from(progress)));
    }
    if let Some(start) = update.start_date {
        sets.push("start_date = ?");
        values.push(start.map_or(Value::Null, |d| Value::Text(d.to_rfc3339())));
    }
    if let Some(due) = update.due_date {
        sets.push("due_date = ?");
        values.push(due.map_or(Value::Null, |d| Value::Text(d.to_rfc3339())));
    }

    sets.push("updated_at = ?");
    values.push(Value::Text(now.to_rfc3339()));
    values.push(Value::Text(id.to_string()));

    let sql = format!("UPDATE tasks SET {} WHERE id = ?", sets.join(", "));
    let affected = conn.execute(&sql, params_from_iter(values))?;
    if affected == 0 {
        return Err(Error::task_not_found(id));
    }
    Ok(())
}

impl Database {
    /// Tasks of one ticket, oldest first.
    pub fn list_tasks(&self, ticket_id: &str) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE ticket_id = ?1 ORDER BY created_at, rowid"
        ))?;
        let tasks = stmt
            .query_map(params![ticket_id], row_to_task)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tasks)
    }
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
