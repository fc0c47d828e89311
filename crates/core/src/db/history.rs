// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::catalog::EntityKind;
use crate::error::Result;
use crate::history::{AssignmentChange, AssignmentHistoryEntry, StatusHistoryEntry, StatusTransition};

use super::{parse_timestamp, Database};

fn owner_column(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Ticket => "ticket_id",
        EntityKind::Task => "task_id",
    }
}

fn row_to_status_entry(kind: EntityKind, row: &Row<'_>) -> rusqlite::Result<StatusHistoryEntry> {
    let changed_str: String = row.get(5)?;
    Ok(StatusHistoryEntry {
        id: row.get(0)?,
        entity_kind: kind,
        entity_id: row.get(1)?,
        from_status: row.get(2)?,
        to_status: row.get(3)?,
        changed_by: row.get(4)?,
        changed_at: parse_timestamp(&changed_str, "changed_at")?,
        reason: row.get(6)?,
        comment: row.get(7)?,
    })
}

fn row_to_assignment_entry(row: &Row<'_>) -> rusqlite::Result<AssignmentHistoryEntry> {
    let assigned_str: String = row.get(5)?;
    Ok(AssignmentHistoryEntry {
        id: row.get(0)?,
        task_id: row.get(1)?,
        from_assignee: row.get(2)?,
        to_assignee: row.get(3)?,
        assigned_by: row.get(4)?,
        assigned_at: parse_timestamp(&assigned_str, "assigned_at")?,
        reason: row.get(6)?,
    })
}

/// Timestamp of the newest status entry for an entity, if any.
pub(crate) fn last_changed_at_on(
    conn: &Connection,
    kind: EntityKind,
    entity_id: &str,
) -> Result<Option<DateTime<Utc>>> {
    let column = owner_column(kind);
    let last: Option<String> = conn
        .query_row(
            &format!(
                "SELECT changed_at FROM status_history WHERE {column} = ?1
                 ORDER BY id DESC LIMIT 1"
            ),
            params![entity_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(last
        .map(|s| parse_timestamp(&s, "changed_at"))
        .transpose()?)
}

/// Append a status entry. `changed_at` never goes backwards for one entity,
/// so timestamp order and insertion order agree even if the clock steps back.
pub(crate) fn record_status_on(
    conn: &Connection,
    transition: &StatusTransition<'_>,
    now: DateTime<Utc>,
) -> Result<StatusHistoryEntry> {
    let changed_at = match last_changed_at_on(conn, transition.kind, transition.entity_id)? {
        Some(last) if last > now => last,
        _ => now,
    };

    let column = owner_column(transition.kind);
    conn.execute(
        &format!(
            "INSERT INTO status_history ({column}, from_status, to_status, changed_by,
             changed_at, reason, comment)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
        ),
        params![
            transition.entity_id,
            transition.from,
            transition.to,
            transition.changed_by,
            changed_at.to_rfc3339(),
            transition.reason,
            transition.comment,
        ],
    )?;

    Ok(StatusHistoryEntry {
        id: conn.last_insert_rowid(),
        entity_kind: transition.kind,
        entity_id: transition.entity_id.to_string(),
        from_status: transition.from.map(str::to_string),
        to_status: transition.to.to_string(),
        changed_by: transition.changed_by.to_string(),
        changed_at,
        reason: transition.reason.map(str::to_string),
        comment: transition.comment.map(str::to_string),
    })
}

pub(crate) fn record_assignment_on(
    conn: &Connection,
    change: &AssignmentChange<'_>,
    now: DateTime<Utc>,
) -> Result<AssignmentHistoryEntry> {
    let last: Option<String> = conn
        .query_row(
            "SELECT assigned_at FROM assignment_history WHERE task_id = ?1
             ORDER BY id DESC LIMIT 1",
            params![change.task_id],
            |row| row.get(0),
        )
        .optional()?;
    let assigned_at = match last.map(|s| parse_timestamp(&s, "assigned_at")).transpose()? {
        Some(last) if last > now => last,
        _ => now,
    };

    conn.execute(
        "INSERT INTO assignment_history (task_id, from_assignee, to_assignee, assigned_by,
         assigned_at, reason)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            change.task_id,
            change.from,
            change.to,
            change.assigned_by,
            assigned_at.to_rfc3339(),
            change.reason,
        ],
    )?;

    Ok(AssignmentHistoryEntry {
        id: conn.last_insert_rowid(),
        task_id: change.task_id.to_string(),
        from_assignee: change.from.map(str::to_string),
        to_assignee: change.to.map(str::to_string),
        assigned_by: change.assigned_by.to_string(),
        assigned_at,
        reason: change.reason.map(str::to_string),
    })
}

impl Database {
    /// Status history for one entity in acceptance order.
    pub fn get_status_history(
        &self,
        kind: EntityKind,
        entity_id: &str,
    ) -> Result<Vec<StatusHistoryEntry>> {
        let column = owner_column(kind);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, {column}, from_status, to_status, changed_by, changed_at, reason, comment
             FROM status_history WHERE {column} = ?1 ORDER BY id"
        ))?;
        let entries = stmt
            .query_map(params![entity_id], |row| row_to_status_entry(kind, row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Assignment history for a task in acceptance order.
    pub fn get_assignment_history(&self, task_id: &str) -> Result<Vec<AssignmentHistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, task_id, from_assignee, to_assignee, assigned_by, assigned_at, reason
             FROM assignment_history WHERE task_id = ?1 ORDER BY id",
        )?;
        let entries = stmt
            .query_map(params![task_id], row_to_assignment_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
