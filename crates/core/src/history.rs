// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Audit history records.
//!
//! Both tables are append-only: rows are written in the same transaction as
//! the change they describe and the schema rejects later updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::EntityKind;

/// One accepted status change of a ticket or task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    /// Database-assigned identifier; increases in acceptance order.
    pub id: i64,
    pub entity_kind: EntityKind,
    pub entity_id: String,
    /// Absent only for imported creation events.
    pub from_status: Option<String>,
    pub to_status: String,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// One assignment change of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentHistoryEntry {
    pub id: i64,
    pub task_id: String,
    pub from_assignee: Option<String>,
    pub to_assignee: Option<String>,
    pub assigned_by: String,
    pub assigned_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Input to the status history recorder.
#[derive(Debug, Clone, Copy)]
pub struct StatusTransition<'a> {
    pub kind: EntityKind,
    pub entity_id: &'a str,
    pub from: Option<&'a str>,
    pub to: &'a str,
    pub changed_by: &'a str,
    pub reason: Option<&'a str>,
    pub comment: Option<&'a str>,
}

/// Input to the assignment history recorder.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentChange<'a> {
    pub task_id: &'a str,
    pub from: Option<&'a str>,
    pub to: Option<&'a str>,
    pub assigned_by: &'a str,
    pub reason: Option<&'a str>,
}
