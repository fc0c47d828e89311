// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Ticket activity feed.
//!
//! Merges the ticket's own submission, its comments and (optionally) its
//! status history into one list, most recent first.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::history::StatusHistoryEntry;
use crate::ticket::{Attachment, Comment, Ticket};

/// The submission event that opens every timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub ticket_id: String,
    pub submitted_by: String,
    pub title: String,
    pub description: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum TimelineEvent {
    Issue(Submission),
    Comment(Comment),
    StatusChange(StatusHistoryEntry),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineItem {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: TimelineEvent,
}

impl TimelineItem {
    /// Wire name of the item type.
    pub fn kind(&self) -> &'static str {
        match self.event {
            TimelineEvent::Issue(_) => "issue",
            TimelineEvent::Comment(_) => "comment",
            TimelineEvent::StatusChange(_) => "status_change",
        }
    }
}

/// Build the timeline for `ticket`.
///
/// Items are sorted by timestamp, newest first. Equal timestamps keep input
/// order: submission, then comments, then history entries.
pub fn assemble(
    ticket: &Ticket,
    comments: &[Comment],
    history: Option<&[StatusHistoryEntry]>,
) -> Vec<TimelineItem> {
    let mut items = Vec::with_capacity(1 + comments.len() + history.map_or(0, <[_]>::len));

    items.push(TimelineItem {
        timestamp: ticket.submitted_at,
        event: TimelineEvent::Issue(Submission {
            ticket_id: ticket.id.clone(),
            submitted_by: ticket.submitted_by.clone(),
            title: ticket.title.clone(),
            description: ticket.description.clone(),
            attachments: ticket.attachments.clone(),
        }),
    });

    items.extend(comments.iter().map(|c| TimelineItem {
        timestamp: c.created_at,
        event: TimelineEvent::Comment(c.clone()),
    }));

    if let Some(entries) = history {
        items.extend(entries.iter().map(|e| TimelineItem {
            timestamp: e.changed_at,
            event: TimelineEvent::StatusChange(e.clone()),
        }));
    }

    // sort_by is stable
    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    items
}

#[cfg(test)]
#[path = "timeline_tests.rs"]
mod tests;
