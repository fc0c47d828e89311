// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Ticket and task workflow services.
//!
//! Every mutation runs inside one IMMEDIATE transaction: the entity row is
//! loaded, the requested status is validated against the catalog, the row
//! is updated conditionally on the status it was loaded with, and the
//! history entry is appended. Either all of it commits or none of it does.

mod task;
mod ticket;

pub use task::{TaskAssignment, TaskWorkflow};
pub use ticket::{EditOutcome, TicketEdit, TicketView, TicketWorkflow};

use serde::{Deserialize, Serialize};

use crate::catalog::{EntityKind, StatusCatalog, UnconfiguredTransitions};
use crate::error::{Error, Result};
use crate::history::StatusHistoryEntry;
use crate::ticket::Comment;
use crate::validate::{validate_optional_comment, validate_reason};

/// Workflow behaviour switches, read from the `[workflow]` config table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowSettings {
    /// Policy for statuses with no `allowed_transitions` list.
    pub unconfigured_transitions: UnconfiguredTransitions,
    /// Post a summary comment on the ticket after each status change.
    pub status_change_comments: bool,
    /// Mark summary comments internal.
    pub status_comment_internal: bool,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        WorkflowSettings {
            unconfigured_transitions: UnconfiguredTransitions::Deny,
            status_change_comments: true,
            status_comment_internal: true,
        }
    }
}

/// A requested status change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatus {
    pub target: String,
    pub reason: Option<String>,
    pub comment: Option<String>,
    /// Status the client last saw. A mismatch fails with
    /// [`Error::StaleStatus`] instead of applying the change.
    pub expected: Option<String>,
}

impl ChangeStatus {
    pub fn to(target: impl Into<String>) -> Self {
        ChangeStatus {
            target: target.into(),
            ..ChangeStatus::default()
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn expecting(mut self, status: impl Into<String>) -> Self {
        self.expected = Some(status.into());
        self
    }
}

/// Result of an accepted status change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange<T> {
    /// The entity as committed.
    pub entity: T,
    pub entry: StatusHistoryEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_comment: Option<Comment>,
    /// Set when the change committed but the summary comment did not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Status request after trimming and length checks.
struct StatusRequest {
    target: String,
    reason: Option<String>,
    comment: Option<String>,
    expected: Option<String>,
}

impl StatusRequest {
    fn from_request(request: &ChangeStatus) -> Result<Self> {
        let target = request.target.trim();
        if target.is_empty() {
            return Err(Error::FieldEmpty { field: "Status" });
        }
        Ok(StatusRequest {
            target: target.to_string(),
            reason: validate_reason(request.reason.as_deref())?,
            comment: validate_optional_comment(request.comment.as_deref())?,
            expected: request
                .expected
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        })
    }
}

/// Fail with [`Error::StaleStatus`] when the caller's view is out of date.
fn check_expected(kind: EntityKind, expected: Option<&str>, actual: &str) -> Result<()> {
    match expected {
        Some(expected) if expected != actual => Err(Error::StaleStatus {
            kind,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }),
        _ => Ok(()),
    }
}

fn check_priority(catalog: &StatusCatalog, id: Option<&str>) -> Result<()> {
    match id {
        Some(id) if catalog.priority(id).is_none() => Err(Error::NotFound {
            entity: "priority",
            id: id.to_string(),
        }),
        _ => Ok(()),
    }
}

fn check_category(catalog: &StatusCatalog, id: Option<&str>) -> Result<()> {
    match id {
        Some(id) if catalog.category(id).is_none() => Err(Error::NotFound {
            entity: "category",
            id: id.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Text of the comment posted after a ticket status change.
pub fn summary_text(
    from_name: &str,
    to_name: &str,
    reason: Option<&str>,
    comment: Option<&str>,
) -> String {
    let mut text = format!("Status change: {from_name} → {to_name}");
    if let Some(reason) = reason {
        text.push_str("\nReason: ");
        text.push_str(reason);
    }
    if let Some(comment) = comment {
        text.push_str("\n\n");
        text.push_str(comment);
    }
    text
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
