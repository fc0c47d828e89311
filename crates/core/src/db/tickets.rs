// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::error::{Error, Result};
use crate::ticket::{Attachment, Ticket, TicketUpdate};

use super::{parse_timestamp, parse_timestamp_opt, Database};

const TICKET_COLUMNS: &str = "id, ticket_number, title, description, status_id, priority_id,
     category_id, submitted_by, assigned_to, due_date, submitted_at, updated_at";

fn row_to_ticket(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    let due_str: Option<String> = row.get(9)?;
    let submitted_str: String = row.get(10)?;
    let updated_str: String = row.get(11)?;

    Ok(Ticket {
        id: row.get(0)?,
        ticket_number: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status_id: row.get(4)?,
        priority_id: row.get(5)?,
        category_id: row.get(6)?,
        submitted_by: row.get(7)?,
        assigned_to: row.get(8)?,
        due_date: parse_timestamp_opt(due_str, "due_date")?,
        tags: Vec::new(),
        attachments: Vec::new(),
        submitted_at: parse_timestamp(&submitted_str, "submitted_at")?,
        updated_at: parse_timestamp(&updated_str, "updated_at")?,
    })
}

fn text_or_null(value: Option<String>) -> Value {
    value.map_or(Value::Null, Value::Text)
}

fn timestamp_or_null(value: Option<DateTime<Utc>>) -> Value {
    value.map_or(Value::Null, |dt| Value::Text(dt.to_rfc3339()))
}

/// Next sequential ticket number. Call inside the inserting transaction.
pub(crate) fn next_ticket_number_on(conn: &Connection) -> Result<i64> {
    let next = conn.query_row(
        "SELECT COALESCE(MAX(ticket_number), 0) + 1 FROM tickets",
        [],
        |row| row.get(0),
    )?;
    Ok(next)
}

pub(crate) fn ticket_exists_on(conn: &Connection, id: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM tickets WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub(crate) fn insert_ticket_on(conn: &Connection, ticket: &Ticket) -> Result<()> {
    conn.execute(
        "INSERT INTO tickets (id, ticket_number, title, description, status_id, priority_id,
         category_id, submitted_by, assigned_to, due_date, submitted_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            ticket.id,
            ticket.ticket_number,
            ticket.title,
            ticket.description,
            ticket.status_id,
            ticket.priority_id,
            ticket.category_id,
            ticket.submitted_by,
            ticket.assigned_to,
            ticket.due_date.map(|d| d.to_rfc3339()),
            ticket.submitted_at.to_rfc3339(),
            ticket.updated_at.to_rfc3339(),
        ],
    )?;

    replace_tags_on(conn, &ticket.id, &ticket.tags)?;
    insert_attachments_on(conn, &ticket.id, None, &ticket.attachments)?;
    Ok(())
}

pub(crate) fn get_ticket_on(conn: &Connection, id: &str) -> Result<Ticket> {
    let ticket = conn
        .query_row(
            &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?1"),
            params![id],
            row_to_ticket,
        )
        .optional()?;

    let mut ticket = ticket.ok_or_else(|| Error::ticket_not_found(id))?;
    ticket.tags = get_tags_on(conn, id)?;
    ticket.attachments = get_attachments_on(conn, id, None)?;
    Ok(ticket)
}

/// Move a ticket from `from` to `to`. Returns false when the ticket is no
/// longer in `from`.
pub(crate) fn update_ticket_status_on(
    conn: &Connection,
    id: &str,
    from: &str,
    to: &str,
    now: DateTime<Utc>,
) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE tickets SET status_id = ?1, updated_at = ?2 WHERE id = ?3 AND status_id = ?4",
        params![to, now.to_rfc3339(), id, from],
    )?;
    Ok(affected == 1)
}

pub(crate) fn update_ticket_fields_on(
    conn: &Connection,
    id: &str,
    update: &TicketUpdate,
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
        values.push(Value::Text(description.clone()));
    }
    if let Some(category) = &update.category_id {
        sets.push("category_id = ?");
        values.push(text_or_null(category.clone()));
    }
    if let Some(priority) = &update.priority_id {
        sets.push("priority_id = ?");
        values.push(text_or_null(priority.clone()));
    }
    if let Some(assignee) = &update.assigned_to {
        sets.push("assigned_to = ?");
        values.push(text_or_null(assignee.clone()));
    }
    if let Some(due) = update.due_date {
        sets.push("due_date = ?");
        values.push(timestamp_or_null(due));
    }

    sets.push("updated_at = ?");
    values.push(Value::Text(now.to_rfc3339()));
    values.push(Value::Text(id.to_string()));

    let sql = format!("UPDATE tickets SET {} WHERE id = ?", sets.join(", "));
    let affected = conn.execute(&sql, params_from_iter(values))?;
    if affected == 0 {
        return Err(Error::ticket_not_found(id));
    }

    if let Some(tags) = &update.tags {
        replace_tags_on(conn, id, tags)?;
    }
    Ok(())
}

fn replace_tags_on(conn: &Connection, ticket_id: &str, tags: &[String]) -> Result<()> {
    conn.execute(
        "DELETE FROM ticket_tags WHERE ticket_id = ?1",
        params![ticket_id],
    )?;
    for tag in tags {
        conn.execute(
            "INSERT OR IGNORE INTO ticket_tags (ticket_id, tag) VALUES (?1, ?2)",
            params![ticket_id, tag],
        )?;
    }
    Ok(())
}

fn get_tags_on(conn: &Connection, ticket_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT tag FROM ticket_tags WHERE ticket_id = ?1 ORDER BY tag")?;
    let tags = stmt
        .query_map(params![ticket_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(tags)
}

/// Store file references for a ticket (`comment_id` None) or one of its comments.
pub(crate) fn insert_attachments_on(
    conn: &Connection,
    ticket_id: &str,
    comment_id: Option<i64>,
    attachments: &[Attachment],
) -> Result<()> {
    for attachment in attachments {
        conn.execute(
            "INSERT INTO attachments (ticket_id, comment_id, file_name, url)
             VALUES (?1, ?2, ?3, ?4)",
            params![ticket_id, comment_id, attachment.file_name, attachment.url],
        )?;
    }
    Ok(())
}

pub(crate) fn get_attachments_on(
    conn: &Connection,
    ticket_id: &str,
    comment_id: Option<i64>,
) -> Result<Vec<Attachment>> {
    let mut stmt = conn.prepare(
        "SELECT file_name, url FROM attachments
         WHERE ticket_id = ?1 AND comment_id IS ?2 ORDER BY id",
    )?;
    let attachments = stmt
        .query_map(params![ticket_id, comment_id], |row| {
            Ok(Attachment {
                file_name: row.get(0)?,
                url: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(attachments)
}

impl Database {
    /// Get a ticket by ID, with its tags and attachments.
    pub fn get_ticket(&self, id: &str) -> Result<Ticket> {
        get_ticket_on(&self.conn, id)
    }

    /// Check if a ticket exists.
    pub fn ticket_exists(&self, id: &str) -> Result<bool> {
        ticket_exists_on(&self.conn, id)
    }

    /// Look up a ticket by its human-facing number.
    pub fn get_ticket_by_number(&self, number: i64) -> Result<Ticket> {
        let id: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM tickets WHERE ticket_number = ?1",
                params![number],
                |row| row.get(0),
            )
            .optional()?;
        match id {
            Some(id) => self.get_ticket(&id),
            None => Err(Error::ticket_not_found(&format!("#{number}"))),
        }
    }
}

#[cfg(test)]
#[path = "tickets_tests.rs"]
mod tests;
