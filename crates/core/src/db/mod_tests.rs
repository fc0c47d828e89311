// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::error::Error;
use crate::ticket::Ticket;
use chrono::Utc;
use tempfile::TempDir;

fn test_ticket(id: &str, number: i64) -> Ticket {
    let now = Utc::now();
    Ticket {
        id: id.to_string(),
        ticket_number: number,
        title: "Printer on fire".to_string(),
        description: String::new(),
        status_id: "OPEN".to_string(),
        priority_id: None,
        category_id: None,
        submitted_by: "alice".to_string(),
        assigned_to: None,
        due_date: None,
        tags: Vec::new(),
        attachments: Vec::new(),
        submitted_at: now,
        updated_at: now,
    }
}

#[test]
fn migrations_are_idempotent() {
    let db = Database::open_in_memory().unwrap();
    run_migrations(&db.conn).unwrap();
    run_migrations(&db.conn).unwrap();
    db.health_check().unwrap();
}

#[test]
fn open_creates_parent_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("helpdesk.db");
    let db = Database::open(&path).unwrap();
    db.health_check().unwrap();
    assert!(path.exists());
}

#[test]
fn write_commits_on_ok() {
    let mut db = Database::open_in_memory().unwrap();
    db.write(|tx| insert_ticket_on(tx, &test_ticket("tkt-1", 1)))
        .unwrap();
    assert!(db.ticket_exists("tkt-1").unwrap());
}

#[test]
fn write_rolls_back_on_err() {
    let mut db = Database::open_in_memory().unwrap();
    let result: Result<()> = db.write(|tx| {
        insert_ticket_on(tx, &test_ticket("tkt-1", 1))?;
        Err(Error::InvalidInput("abort".to_string()))
    });
    assert!(result.is_err());
    assert!(!db.ticket_exists("tkt-1").unwrap());
}

#[test]
fn status_history_rejects_updates() {
    let mut db = Database::open_in_memory().unwrap();
    db.write(|tx| insert_ticket_on(tx, &test_ticket("tkt-1", 1)))
        .unwrap();
    db.conn
        .execute(
            "INSERT INTO status_history (ticket_id, from_status, to_status, changed_by, changed_at)
             VALUES ('tkt-1', 'OPEN', 'IN_PROGRESS', 'bob', '2026-01-01T00:00:00+00:00')",
            [],
        )
        .unwrap();

    let result = db
        .conn
        .execute("UPDATE status_history SET to_status = 'CLOSED'", []);
    assert!(result.is_err());
}

#[test]
fn status_history_rejects_deletes_while_owner_exists() {
    let mut db = Database::open_in_memory().unwrap();
    db.write(|tx| insert_ticket_on(tx, &test_ticket("tkt-1", 1)))
        .unwrap();
    db.conn
        .execute(
            "INSERT INTO status_history (ticket_id, from_status, to_status, changed_by, changed_at)
             VALUES ('tkt-1', 'OPEN', 'CLOSED', 'bob', '2026-01-01T00:00:00+00:00')",
            [],
        )
        .unwrap();

    assert!(db.conn.execute("DELETE FROM status_history", []).is_err());
    db.conn
        .execute("DELETE FROM tickets WHERE id = 'tkt-1'", [])
        .unwrap();
    let remaining: i64 = db
        .conn
        .query_row("SELECT COUNT(*) FROM status_history", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
}

#[test]
fn status_history_requires_exactly_one_owner() {
    let db = Database::open_in_memory().unwrap();
    let result = db.conn.execute(
        "INSERT INTO status_history (from_status, to_status, changed_by, changed_at)
         VALUES ('OPEN', 'CLOSED', 'bob', '2026-01-01T00:00:00+00:00')",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn corrupted_timestamp_is_reported() {
    let mut db = Database::open_in_memory().unwrap();
    db.write(|tx| insert_ticket_on(tx, &test_ticket("tkt-1", 1)))
        .unwrap();
    db.conn
        .execute("UPDATE tickets SET updated_at = 'yesterday'", [])
        .unwrap();
    assert!(matches!(db.get_ticket("tkt-1"), Err(Error::Database(_))));
}
