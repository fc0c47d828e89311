// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::error::Result;
use crate::task::TaskComment;
use crate::ticket::{Attachment, Comment};

use super::tickets::{get_attachments_on, insert_attachments_on};
use super::{parse_timestamp, Database};

fn row_to_comment(row: &Row<'_>) -> rusqlite::Result<Comment> {
    let created_str: String = row.get(5)?;
    Ok(Comment {
        id: row.get(0)?,
        ticket_id: row.get(1)?,
        author_id: row.get(2)?,
        content: row.get(3)?,
        is_internal: row.get(4)?,
        created_at: parse_timestamp(&created_str, "created_at")?,
        attachments: Vec::new(),
    })
}

fn row_to_task_comment(row: &Row<'_>) -> rusqlite::Result<TaskComment> {
    let created_str: String = row.get(4)?;
    Ok(TaskComment {
        id: row.get(0)?,
        task_id: row.get(1)?,
        author_id: row.get(2)?,
        content: row.get(3)?,
        created_at: parse_timestamp(&created_str, "created_at")?,
    })
}

pub(crate) fn insert_comment_on(
    conn: &Connection,
    ticket_id: &str,
    author_id: &str,
    content: &str,
    is_internal: bool,
    attachments: &[Attachment],
    now: DateTime<Utc>,
) -> Result<Comment> {
    conn.execute(
        "INSERT INTO comments (ticket_id, author_id, content, is_internal, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![ticket_id, author_id, content, is_internal, now.to_rfc3339()],
    )?;
    let id = conn.last_insert_rowid();
    insert_attachments_on(conn, ticket_id, Some(id), attachments)?;

    Ok(Comment {
        id,
        ticket_id: ticket_id.to_string(),
        author_id: author_id.to_string(),
        content: content.to_string(),
        is_internal,
        created_at: now,
        attachments: attachments.to_vec(),
    })
}

pub(crate) fn insert_task_comment_on(
    conn: &Connection,
    task_id: &str,
    author_id: &str,
    content: &str,
    now: DateTime<Utc>,
) -> Result<TaskComment> {
    conn.execute(
        "INSERT INTO task_comments (task_id, author_id, content, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![task_id, author_id, content, now.to_rfc3339()],
    )?;

    Ok(TaskComment {
        id: conn.last_insert_rowid(),
        task_id: task_id.to_string(),
        author_id: author_id.to_string(),
        content: content.to_string(),
        created_at: now,
    })
}

impl Database {
    /// Comments on a ticket, oldest first. Internal comments are included
    /// only when `include_internal` is set.
    pub fn get_comments(&self, ticket_id: &str, include_internal: bool) -> Result<Vec<Comment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, ticket_id, author_id, content, is_internal, created_at
             FROM comments
             WHERE ticket_id = ?1 AND (?2 OR is_internal = 0)
             ORDER BY id",
        )?;
        let mut comments = stmt
            .query_map(params![ticket_id, include_internal], row_to_comment)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for comment in &mut comments {
            comment.attachments = get_attachments_on(&self.conn, ticket_id, Some(comment.id))?;
        }
        Ok(comments)
    }

    /// Comments on a task, oldest first.
    pub fn get_task_comments(&self, task_id: &str) -> Result<Vec<TaskComment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, task_id, author_id, content, created_at
             FROM task_comments WHERE task_id = ?1 ORDER BY id",
        )?;
        let comments = stmt
            .query_map(params![task_id], row_to_task_comment)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(comments)
    }
}
