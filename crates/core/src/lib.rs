// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! hd-core: Status workflow core for the helpdesk service
//!
//! This crate provides the status catalogs, transition validation, audit
//! history, ticket and task workflow services, and the SQLite storage they
//! run on. The `helpdeskd` server is a thin HTTP layer over it.

pub mod actor;
pub mod catalog;
pub mod db;
pub mod error;
pub mod history;
pub mod id;
pub mod task;
pub mod ticket;
pub mod timeline;
pub mod transition;
pub mod validate;
pub mod workflow;

pub use actor::{Actor, Permission};
pub use catalog::{
    CatalogConfig, Category, EntityKind, Priority, Status, StatusCatalog, StatusDef,
    UnconfiguredTransitions,
};
pub use db::Database;
pub use error::{Error, Result};
pub use history::{AssignmentHistoryEntry, StatusHistoryEntry};
pub use task::{NewTask, Task, TaskComment, TaskUpdate};
pub use ticket::{Attachment, Comment, NewComment, NewTicket, Ticket, TicketUpdate};
pub use timeline::{TimelineEvent, TimelineItem};
pub use transition::Rejection;
pub use workflow::{
    ChangeStatus, EditOutcome, StatusChange, TaskAssignment, TaskWorkflow, TicketEdit, TicketView,
    TicketWorkflow, WorkflowSettings,
};
