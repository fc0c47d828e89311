// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::actor::{Actor, Permission};
use crate::catalog::{EntityKind, Status, StatusCatalog};
use crate::db::{
    get_ticket_on, insert_comment_on, insert_ticket_on, next_ticket_number_on, record_status_on,
    ticket_exists_on, update_ticket_fields_on, update_ticket_status_on, Database,
};
use crate::error::{Error, Result};
use crate::history::{StatusHistoryEntry, StatusTransition};
use crate::id::{generate_unique_id, TICKET_ID_PREFIX};
use crate::ticket::{Comment, NewComment, NewTicket, Ticket, TicketUpdate};
use crate::timeline::{self, TimelineItem};
use crate::transition;
use crate::validate::{
    validate_assignee, validate_attachments, validate_comment, validate_description,
    validate_tags, validate_title,
};

use super::{
    check_category, check_expected, check_priority, summary_text, ChangeStatus, StatusChange,
    StatusRequest, WorkflowSettings,
};

const KIND: EntityKind = EntityKind::Ticket;

/// A ticket together with the statuses it may move to next.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub available_transitions: Vec<Status>,
}

/// A combined edit: direct field changes plus an optional status change,
/// applied in one transaction.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketEdit {
    #[serde(flatten)]
    pub fields: TicketUpdate,
    pub status_id: Option<String>,
    pub status_change_reason: Option<String>,
    pub status_change_comment: Option<String>,
    pub expected_status_id: Option<String>,
}

impl TicketEdit {
    fn status_request(&self) -> Option<ChangeStatus> {
        self.status_id.as_ref().map(|target| ChangeStatus {
            target: target.clone(),
            reason: self.status_change_reason.clone(),
            comment: self.status_change_comment.clone(),
            expected: self.expected_status_id.clone(),
        })
    }
}

/// Result of [`TicketWorkflow::edit`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOutcome {
    pub ticket: Ticket,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_change: Option<StatusHistoryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_comment: Option<Comment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

fn normalize_update(catalog: &StatusCatalog, update: &TicketUpdate) -> Result<TicketUpdate> {
    let title = update.title.as_deref().map(validate_title).transpose()?;
    if let Some(description) = &update.description {
        validate_description(description)?;
    }
    let tags = update.tags.as_deref().map(validate_tags).transpose()?;
    let assigned_to = match &update.assigned_to {
        Some(Some(assignee)) => Some(Some(validate_assignee(assignee)?)),
        other => other.clone(),
    };
    if let Some(priority) = &update.priority_id {
        check_priority(catalog, priority.as_deref())?;
    }
    if let Some(category) = &update.category_id {
        check_category(catalog, category.as_deref())?;
    }

    Ok(TicketUpdate {
        title,
        description: update.description.clone(),
        category_id: update.category_id.clone(),
        priority_id: update.priority_id.clone(),
        assigned_to,
        due_date: update.due_date,
        tags,
    })
}

/// Validate and apply a status change inside an open transaction.
fn change_status_on(
    conn: &Connection,
    catalog: &StatusCatalog,
    actor: &Actor,
    ticket: &Ticket,
    request: &StatusRequest,
) -> Result<StatusHistoryEntry> {
    let current = ticket.status_id.as_str();
    check_expected(KIND, request.expected.as_deref(), current)?;
    transition::check(catalog, KIND, current, &request.target)?;

    let now = Utc::now();
    if !update_ticket_status_on(conn, &ticket.id, current, &request.target, now)? {
        let actual = get_ticket_on(conn, &ticket.id)?.status_id;
        return Err(Error::StaleStatus {
            kind: KIND,
            expected: current.to_string(),
            actual,
        });
    }

    record_status_on(
        conn,
        &StatusTransition {
            kind: KIND,
            entity_id: &ticket.id,
            from: Some(current),
            to: &request.target,
            changed_by: &actor.id,
            reason: request.reason.as_deref(),
            comment: request.comment.as_deref(),
        },
        now,
    )
}

/// Ticket-level workflow operations over one database connection.
pub struct TicketWorkflow<'a> {
    db: &'a mut Database,
    catalog: &'a StatusCatalog,
    settings: &'a WorkflowSettings,
}

impl<'a> TicketWorkflow<'a> {
    pub fn new(
        db: &'a mut Database,
        catalog: &'a StatusCatalog,
        settings: &'a WorkflowSettings,
    ) -> Self {
        TicketWorkflow {
            db,
            catalog,
            settings,
        }
    }

    /// Submit a new ticket in the catalog's initial status.
    pub fn create(&mut self, actor: &Actor, new: &NewTicket) -> Result<Ticket> {
        actor.require(Permission::TicketsWrite)?;

        let title = validate_title(&new.title)?;
        validate_description(&new.description)?;
        let tags = validate_tags(&new.tags)?;
        let assigned_to = new
            .assigned_to
            .as_deref()
            .map(validate_assignee)
            .transpose()?;
        validate_attachments(&new.attachments)?;
        check_priority(self.catalog, new.priority_id.as_deref())?;
        check_category(self.catalog, new.category_id.as_deref())?;

        let status_id = self.catalog.initial(KIND).id.clone();
        let now = Utc::now();

        let ticket = self.db.write(|tx| {
            let id = generate_unique_id(TICKET_ID_PREFIX, &title, &now, |candidate| {
                ticket_exists_on(tx, candidate)
            })?;
            let ticket = Ticket {
                id,
                ticket_number: next_ticket_number_on(tx)?,
                title,
                description: new.description.clone(),
                status_id,
                priority_id: new.priority_id.clone(),
                category_id: new.category_id.clone(),
                submitted_by: actor.id.clone(),
                assigned_to,
                due_date: new.due_date,
                tags,
                attachments: new.attachments.clone(),
                submitted_at: now,
                updated_at: now,
            };
            insert_ticket_on(tx, &ticket)?;
            get_ticket_on(tx, &ticket.id)
        })?;

        info!(
            "Created ticket {} (#{}) by {}",
            ticket.id, ticket.ticket_number, actor.id
        );
        Ok(ticket)
    }

    pub fn get(&self, id: &str) -> Result<Ticket> {
        debug!("get ticket {}", id);
        self.db.get_ticket(id)
    }

    /// The ticket plus the statuses the workflow currently allows.
    pub fn view(&self, id: &str) -> Result<TicketView> {
        self.view_of(self.get(id)?)
    }

    /// [`view`](Self::view) by the human-facing ticket number.
    pub fn view_by_number(&self, number: i64) -> Result<TicketView> {
        debug!("get ticket #{}", number);
        self.view_of(self.db.get_ticket_by_number(number)?)
    }

    fn view_of(&self, ticket: Ticket) -> Result<TicketView> {
        let available_transitions = self.available_transitions(&ticket);
        Ok(TicketView {
            ticket,
            available_transitions,
        })
    }

    pub fn available_transitions(&self, ticket: &Ticket) -> Vec<Status> {
        self.catalog
            .valid_targets(KIND, &ticket.status_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Move a ticket to another status and record it in the history.
    pub fn change_status(
        &mut self,
        actor: &Actor,
        id: &str,
        request: &ChangeStatus,
    ) -> Result<StatusChange<Ticket>> {
        actor.require(Permission::TicketStatusChange)?;
        let request = StatusRequest::from_request(request)?;
        let catalog = self.catalog;

        let (ticket, entry) = self.db.write(|tx| {
            let ticket = get_ticket_on(tx, id)?;
            let entry = change_status_on(tx, catalog, actor, &ticket, &request)?;
            Ok((get_ticket_on(tx, id)?, entry))
        })?;

        info!(
            "Ticket {} status {} -> {} by {}",
            ticket.id,
            entry.from_status.as_deref().unwrap_or("-"),
            entry.to_status,
            actor.id
        );

        let (summary_comment, warning) = self.post_summary(actor, &entry);
        Ok(StatusChange {
            entity: ticket,
            entry,
            summary_comment,
            warning,
        })
    }

    /// Apply direct field edits. Status is not touched.
    pub fn update_fields(&mut self, actor: &Actor, id: &str, update: &TicketUpdate) -> Result<Ticket> {
        actor.require(Permission::TicketsWrite)?;
        let update = normalize_update(self.catalog, update)?;
        if update.is_empty() {
            return self.get(id);
        }

        let ticket = self.db.write(|tx| {
            update_ticket_fields_on(tx, id, &update, Utc::now())?;
            get_ticket_on(tx, id)
        })?;
        info!("Updated ticket {} by {}", id, actor.id);
        Ok(ticket)
    }

    /// Field edits and a status change in one transaction.
    ///
    /// A `status_id` equal to the current status is ignored when fields
    /// change alongside it, and rejected as no change otherwise.
    pub fn edit(&mut self, actor: &Actor, id: &str, edit: &TicketEdit) -> Result<EditOutcome> {
        let status_request = edit
            .status_request()
            .map(|r| StatusRequest::from_request(&r))
            .transpose()?;
        let wants_fields = !edit.fields.is_empty();

        if !wants_fields && status_request.is_none() {
            return Err(Error::InvalidInput("nothing to update".to_string()));
        }
        if wants_fields {
            actor.require(Permission::TicketsWrite)?;
        }
        let update = normalize_update(self.catalog, &edit.fields)?;
        let catalog = self.catalog;

        let (ticket, entry) = self.db.write(|tx| {
            let before = get_ticket_on(tx, id)?;

            let entry = match &status_request {
                Some(request) if wants_fields && request.target == before.status_id => {
                    check_expected(KIND, request.expected.as_deref(), &before.status_id)?;
                    None
                }
                Some(request) => {
                    actor.require(Permission::TicketStatusChange)?;
                    Some(change_status_on(tx, catalog, actor, &before, request)?)
                }
                None => None,
            };

            if wants_fields {
                update_ticket_fields_on(tx, id, &update, Utc::now())?;
            }
            Ok((get_ticket_on(tx, id)?, entry))
        })?;

        let (summary_comment, warning) = match &entry {
            Some(entry) => {
                info!(
                    "Ticket {} status {} -> {} by {}",
                    id,
                    entry.from_status.as_deref().unwrap_or("-"),
                    entry.to_status,
                    actor.id
                );
                self.post_summary(actor, entry)
            }
            None => (None, None),
        };
        if wants_fields {
            info!("Updated ticket {} by {}", id, actor.id);
        }

        Ok(EditOutcome {
            ticket,
            status_change: entry,
            summary_comment,
            warning,
        })
    }

    /// Write the human-readable status-change comment. Runs after the
    /// status change committed; a failure is reported, never rolled back.
    fn post_summary(
        &mut self,
        actor: &Actor,
        entry: &StatusHistoryEntry,
    ) -> (Option<Comment>, Option<String>) {
        if !self.settings.status_change_comments {
            return (None, None);
        }

        let from = entry.from_status.as_deref().unwrap_or("");
        let text = summary_text(
            self.catalog.status_name(KIND, from),
            self.catalog.status_name(KIND, &entry.to_status),
            entry.reason.as_deref(),
            entry.comment.as_deref(),
        );
        let internal = self.settings.status_comment_internal;

        match self.db.write(|tx| {
            insert_comment_on(tx, &entry.entity_id, &actor.id, &text, internal, &[], Utc::now())
        }) {
            Ok(comment) => (Some(comment), None),
            Err(e) => {
                warn!(
                    "Status of ticket {} changed but summary comment failed: {}",
                    entry.entity_id, e
                );
                (
                    None,
                    Some(format!(
                        "status changed, but the summary comment could not be saved: {e}"
                    )),
                )
            }
        }
    }

    /// Append a comment. Internal comments are limited to staff, the only
    /// readers who can see them.
    pub fn add_comment(&mut self, actor: &Actor, new: &NewComment) -> Result<Comment> {
        actor.require(Permission::CommentsWrite)?;
        if new.is_internal && !actor.is_staff() {
            actor.require(Permission::TicketStatusChange)?;
        }
        let content = validate_comment(&new.content)?;
        validate_attachments(&new.attachments)?;

        let comment = self.db.write(|tx| {
            if !ticket_exists_on(tx, &new.ticket_id)? {
                return Err(Error::ticket_not_found(&new.ticket_id));
            }
            insert_comment_on(
                tx,
                &new.ticket_id,
                &actor.id,
                &content,
                new.is_internal,
                &new.attachments,
                Utc::now(),
            )
        })?;

        info!("Comment {} added to ticket {} by {}", comment.id, new.ticket_id, actor.id);
        Ok(comment)
    }

    fn ensure_exists(&self, id: &str) -> Result<()> {
        if self.db.ticket_exists(id)? {
            Ok(())
        } else {
            Err(Error::ticket_not_found(id))
        }
    }

    /// Comments visible to `actor`, oldest first.
    pub fn comments(&self, actor: &Actor, id: &str) -> Result<Vec<Comment>> {
        self.ensure_exists(id)?;
        self.db.get_comments(id, actor.is_staff())
    }

    pub fn status_history(&self, id: &str) -> Result<Vec<StatusHistoryEntry>> {
        self.ensure_exists(id)?;
        self.db.get_status_history(KIND, id)
    }

    /// Activity feed for a ticket, newest first.
    pub fn timeline(
        &self,
        actor: &Actor,
        id: &str,
        include_history: bool,
    ) -> Result<Vec<TimelineItem>> {
        let ticket = self.get(id)?;
        let comments = self.db.get_comments(id, actor.is_staff())?;
        let history = if include_history {
            Some(self.db.get_status_history(KIND, id)?)
        } else {
            None
        };
        Ok(timeline::assemble(&ticket, &comments, history.as_deref()))
    }
}

#[cfg(test)]
#[path = "ticket_tests.rs"]
mod tests;
