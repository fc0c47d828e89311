// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::Utc;
use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info};

use crate::actor::{Actor, Permission};
use crate::catalog::{EntityKind, Status, StatusCatalog};
use crate::db::{
    get_task_on, insert_task_comment_on, insert_task_on, record_assignment_on, record_status_on,
    task_exists_on, ticket_exists_on, update_task_assignee_on, update_task_fields_on,
    update_task_status_on, Database,
};
use crate::error::{Error, Result};
use crate::history::{AssignmentChange, AssignmentHistoryEntry, StatusHistoryEntry, StatusTransition};
use crate::id::{generate_unique_id, TASK_ID_PREFIX};
use crate::task::{NewTask, Task, TaskComment, TaskUpdate};
use crate::transition;
use crate::validate::{
    validate_assignee, validate_comment, validate_description, validate_progress,
    validate_reason, validate_title,
};

use super::{check_expected, check_priority, ChangeStatus, StatusChange, StatusRequest};

const KIND: EntityKind = EntityKind::Task;

/// Result of an assignment change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignment {
    pub task: Task,
    pub entry: AssignmentHistoryEntry,
}

/// Load a task and check that it belongs to `ticket_id`.
fn load_task_on(conn: &Connection, ticket_id: &str, task_id: &str) -> Result<Task> {
    let task = get_task_on(conn, task_id)?;
    if task.ticket_id != ticket_id {
        return Err(Error::task_not_found(task_id));
    }
    Ok(task)
}

fn ensure_ticket_on(conn: &Connection, ticket_id: &str) -> Result<()> {
    if ticket_exists_on(conn, ticket_id)? {
        Ok(())
    } else {
        Err(Error::ticket_not_found(ticket_id))
    }
}

fn normalize_update(catalog: &StatusCatalog, update: &TaskUpdate) -> Result<TaskUpdate> {
    let title = update.title.as_deref().map(validate_title).transpose()?;
    if let Some(Some(description)) = &update.description {
        validate_description(description)?;
    }
    if let Some(progress) = update.progress {
        validate_progress(progress)?;
    }
    if let Some(priority) = &update.priority_id {
        check_priority(catalog, priority.as_deref())?;
    }

    Ok(TaskUpdate {
        title,
        description: update.description.clone(),
        priority_id: update.priority_id.clone(),
        progress: update.progress,
        start_date: update.start_date,
        due_date: update.due_date,
    })
}

fn normalize_assignee(assignee: Option<&str>) -> Result<Option<String>> {
    assignee.map(validate_assignee).transpose()
}

/// Task-level workflow operations, always scoped to the owning ticket.
pub struct TaskWorkflow<'a> {
    db: &'a mut Database,
    catalog: &'a StatusCatalog,
}

impl<'a> TaskWorkflow<'a> {
    pub fn new(db: &'a mut Database, catalog: &'a StatusCatalog) -> Self {
        TaskWorkflow { db, catalog }
    }

    /// Create a task under `ticket_id` in the task catalog's initial status.
    ///
    /// No status history is written; an initial assignee is recorded in the
    /// assignment history.
    pub fn create(&mut self, actor: &Actor, ticket_id: &str, new: &NewTask) -> Result<Task> {
        actor.require(Permission::TasksWrite)?;

        let title = validate_title(&new.title)?;
        if let Some(description) = &new.description {
            validate_description(description)?;
        }
        let assigned_to = normalize_assignee(new.assigned_to.as_deref())?;
        check_priority(self.catalog, new.priority_id.as_deref())?;

        let status_id = self.catalog.initial(KIND).id.clone();
        let now = Utc::now();

        let task = self.db.write(|tx| {
            ensure_ticket_on(tx, ticket_id)?;
            let id = generate_unique_id(TASK_ID_PREFIX, &title, &now, |candidate| {
                task_exists_on(tx, candidate)
            })?;
            let task = Task {
                id,
                ticket_id: ticket_id.to_string(),
                title,
                description: new.description.clone(),
                status_id,
                priority_id: new.priority_id.clone(),
                assigned_to,
                progress: 0,
                start_date: new.start_date,
                due_date: new.due_date,
                created_by: actor.id.clone(),
                created_at: now,
                updated_at: now,
            };
            insert_task_on(tx, &task)?;

            if task.assigned_to.is_some() {
                record_assignment_on(
                    tx,
                    &AssignmentChange {
                        task_id: &task.id,
                        from: None,
                        to: task.assigned_to.as_deref(),
                        assigned_by: &actor.id,
                        reason: None,
                    },
                    now,
                )?;
            }
            Ok(task)
        })?;

        info!("Created task {} on ticket {} by {}", task.id, ticket_id, actor.id);
        Ok(task)
    }

    pub fn get(&self, ticket_id: &str, task_id: &str) -> Result<Task> {
        debug!("get task {} of ticket {}", task_id, ticket_id);
        load_task_on(&self.db.conn, ticket_id, task_id)
    }

    /// Tasks of a ticket, oldest first.
    pub fn list(&self, ticket_id: &str) -> Result<Vec<Task>> {
        ensure_ticket_on(&self.db.conn, ticket_id)?;
        self.db.list_tasks(ticket_id)
    }

    pub fn available_transitions(&self, task: &Task) -> Vec<Status> {
        self.catalog
            .valid_targets(KIND, &task.status_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Apply direct field edits. Status and assignee are not touched.
    pub fn update(
        &mut self,
        actor: &Actor,
        ticket_id: &str,
        task_id: &str,
        update: &TaskUpdate,
    ) -> Result<Task> {
        actor.require(Permission::TasksWrite)?;
        let update = normalize_update(self.catalog, update)?;

        let task = self.db.write(|tx| {
            load_task_on(tx, ticket_id, task_id)?;
            update_task_fields_on(tx, task_id, &update, Utc::now())?;
            get_task_on(tx, task_id)
        })?;
        info!("Updated task {} by {}", task_id, actor.id);
        Ok(task)
    }

    /// Move a task to another status and record it in the history.
    pub fn change_status(
        &mut self,
        actor: &Actor,
        ticket_id: &str,
        task_id: &str,
        request: &ChangeStatus,
    ) -> Result<StatusChange<Task>> {
        actor.require(Permission::TasksWrite)?;
        let request = StatusRequest::from_request(request)?;
        let catalog = self.catalog;

        let (task, entry) = self.db.write(|tx| {
            let task = load_task_on(tx, ticket_id, task_id)?;
            let current = task.status_id.as_str();
            check_expected(KIND, request.expected.as_deref(), current)?;
            transition::check(catalog, KIND, current, &request.target)?;

            let now = Utc::now();
            if !update_task_status_on(tx, task_id, current, &request.target, now)? {
                let actual = get_task_on(tx, task_id)?.status_id;
                return Err(Error::StaleStatus {
                    kind: KIND,
                    expected: current.to_string(),
                    actual,
                });
            }

            let entry = record_status_on(
                tx,
                &StatusTransition {
                    kind: KIND,
                    entity_id: task_id,
                    from: Some(current),
                    to: &request.target,
                    changed_by: &actor.id,
                    reason: request.reason.as_deref(),
                    comment: request.comment.as_deref(),
                },
                now,
            )?;
            Ok((get_task_on(tx, task_id)?, entry))
        })?;

        info!(
            "Task {} status {} -> {} by {}",
            task_id,
            entry.from_status.as_deref().unwrap_or("-"),
            entry.to_status,
            actor.id
        );
        Ok(StatusChange {
            entity: task,
            entry,
            summary_comment: None,
            warning: None,
        })
    }

    /// Set or clear the assignee. Any value is accepted, including the
    /// current one; every call appends an assignment history entry.
    pub fn assign(
        &mut self,
        actor: &Actor,
        ticket_id: &str,
        task_id: &str,
        assignee: Option<&str>,
        reason: Option<&str>,
    ) -> Result<TaskAssignment> {
        actor.require(Permission::TasksWrite)?;
        let assignee = normalize_assignee(assignee)?;
        let reason = validate_reason(reason)?;

        let assignment = self.db.write(|tx| {
            let task = load_task_on(tx, ticket_id, task_id)?;
            let now = Utc::now();
            update_task_assignee_on(tx, task_id, assignee.as_deref(), now)?;
            let entry = record_assignment_on(
                tx,
                &AssignmentChange {
                    task_id,
                    from: task.assigned_to.as_deref(),
                    to: assignee.as_deref(),
                    assigned_by: &actor.id,
                    reason: reason.as_deref(),
                },
                now,
            )?;
            Ok(TaskAssignment {
                task: get_task_on(tx, task_id)?,
                entry,
            })
        })?;

        info!(
            "Task {} assigned to {} by {}",
            task_id,
            assignment.task.assigned_to.as_deref().unwrap_or("nobody"),
            actor.id
        );
        Ok(assignment)
    }

    pub fn add_comment(
        &mut self,
        actor: &Actor,
        ticket_id: &str,
        task_id: &str,
        content: &str,
    ) -> Result<TaskComment> {
        actor.require(Permission::CommentsWrite)?;
        let content = validate_comment(content)?;

        let comment = self.db.write(|tx| {
            load_task_on(tx, ticket_id, task_id)?;
            insert_task_comment_on(tx, task_id, &actor.id, &content, Utc::now())
        })?;
        info!("Comment {} added to task {} by {}", comment.id, task_id, actor.id);
        Ok(comment)
    }

    pub fn comments(&self, ticket_id: &str, task_id: &str) -> Result<Vec<TaskComment>> {
        self.get(ticket_id, task_id)?;
        self.db.get_task_comments(task_id)
    }

    pub fn status_history(&self, ticket_id: &str, task_id: &str) -> Result<Vec<StatusHistoryEntry>> {
        self.get(ticket_id, task_id)?;
        self.db.get_status_history(KIND, task_id)
    }

    pub fn assignment_history(
        &self,
        ticket_id: &str,
        task_id: &str,
    ) -> Result<Vec<AssignmentHistoryEntry>> {
        self.get(ticket_id, task_id)?;
        self.db.get_assignment_history(task_id)
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
