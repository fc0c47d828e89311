// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::db::insert_ticket_on;
use crate::ticket::Ticket;
use chrono::{Duration, Utc};

fn setup() -> Database {
    let db = Database::open_in_memory().unwrap();
    let now = Utc::now();
    let ticket = Ticket {
        id: "tkt-1".to_string(),
        ticket_number: 1,
        title: "Onboard new hire".to_string(),
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
    };
    insert_ticket_on(&db.conn, &ticket).unwrap();
    db
}

fn test_task(id: &str) -> Task {
    let now = Utc::now();
    Task {
        id: id.to_string(),
        ticket_id: "tkt-1".to_string(),
        title: "Order laptop".to_string(),
        description: None,
        status_id: "PENDING".to_string(),
        priority_id: None,
        assigned_to: Some("carol".to_string()),
        progress: 0,
        start_date: None,
        due_date: Some(now + Duration::days(3)),
        created_by: "alice".to_string(),
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn insert_and_get_task() {
    let db = setup();
    insert_task_on(&db.conn, &test_task("task-1")).unwrap();

    let task = get_task_on(&db.conn, "task-1").unwrap();
    assert_eq!(task.ticket_id, "tkt-1");
    assert_eq!(task.status_id, "PENDING");
    assert_eq!(task.assigned_to.as_deref(), Some("carol"));
    assert!(task.due_date.is_some());
    assert!(task_exists_on(&db.conn, "task-1").unwrap());
    assert!(!task_exists_on(&db.conn, "task-2").unwrap());
}

#[test]
fn task_requires_existing_ticket() {
    let db = setup();
    let mut task = test_task("task-1");
    task.ticket_id = "tkt-missing".to_string();
    assert!(insert_task_on(&db.conn, &task).is_err());
}

#[test]
fn list_tasks_filters_by_ticket() {
    let db = setup();
    insert_task_on(&db.conn, &test_task("task-1")).unwrap();
    insert_task_on(&db.conn, &test_task("task-2")).unwrap();

    let ids: Vec<_> = db
        .list_tasks("tkt-1")
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec!["task-1", "task-2"]);
    assert!(db.list_tasks("tkt-other").unwrap().is_empty());
}

#[test]
fn task_status_update_is_conditional() {
    let db = setup();
    insert_task_on(&db.conn, &test_task("task-1")).unwrap();

    assert!(update_task_status_on(&db.conn, "task-1", "PENDING", "IN_PROGRESS", Utc::now()).unwrap());
    assert!(!update_task_status_on(&db.conn, "task-1", "PENDING", "BLOCKED", Utc::now()).unwrap());
    assert_eq!(get_task_on(&db.conn, "task-1").unwrap().status_id, "IN_PROGRESS");
}

#[test]
fn assignee_update() {
    let db = setup();
    insert_task_on(&db.conn, &test_task("task-1")).unwrap();

    update_task_assignee_on(&db.conn, "task-1", None, Utc::now()).unwrap();
    assert_eq!(get_task_on(&db.conn, "task-1").unwrap().assigned_to, None);
    assert!(update_task_assignee_on(&db.conn, "task-missing", Some("x"), Utc::now()).is_err());
}

#[test]
fn field_update_changes_progress_and_clears_dates() {
    let db = setup();
    insert_task_on(&db.conn, &test_task("task-1")).unwrap();

    let update = TaskUpdate {
        progress: Some(40),
        due_date: Some(None),
        description: Some(Some("Dell, 16GB".to_string())),
        ..TaskUpdate::default()
    };
    update_task_fields_on(&db.conn, "task-1", &update, Utc::now()).unwrap();

    let task = get_task_on(&db.conn, "task-1").unwrap();
    assert_eq!(task.progress, 40);
    assert_eq!(task.due_date, None);
    assert_eq!(task.description.as_deref(), Some("Dell, 16GB"));
    assert_eq!(task.status_id, "PENDING");
}

#[test]
fn progress_above_hundred_is_rejected_by_schema() {
    let db = setup();
    insert_task_on(&db.conn, &test_task("task-1")).unwrap();
    let update = TaskUpdate {
        progress: Some(101),
        ..TaskUpdate::default()
    };
    assert!(update_task_fields_on(&db.conn, "task-1", &update, Utc::now()).is_err());
}
