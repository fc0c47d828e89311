// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for hd-core operations.

use thiserror::Error;

use crate::actor::Permission;
use crate::catalog::EntityKind;

/// All possible errors that can occur in hd-core operations.
///
/// Workflow rejections are distinct variants so callers can tell a stale
/// client (`StaleStatus`), a disallowed move (`InvalidTransition`) and a
/// broken catalog (`UnknownStatus`) apart.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid {kind} status transition: cannot go from {from} to {to}\n  hint: from '{from}' you can go to: {valid_targets}")]
    InvalidTransition {
        kind: EntityKind,
        from: String,
        to: String,
        valid_targets: String,
    },

    #[error("unknown {kind} status '{id}'\n  hint: the status catalog does not define it")]
    UnknownStatus { kind: EntityKind, id: String },

    #[error("stale {kind} status: expected {expected}, found {actual}\n  hint: refetch the {kind} before changing its status")]
    StaleStatus {
        kind: EntityKind,
        expected: String,
        actual: String,
    },

    #[error("unauthorized: actor '{actor}' lacks permission '{permission}'")]
    Unauthorized {
        actor: String,
        permission: Permission,
    },

    #[error("invalid entity kind: '{0}'\n  hint: valid kinds are: ticket, task")]
    InvalidEntityKind(String),

    #[error("{field} too long ({actual} chars, max {max})")]
    FieldTooLong {
        field: &'static str,
        actual: usize,
        max: usize,
    },

    #[error("{field} cannot be empty")]
    FieldEmpty { field: &'static str },

    #[error("too many tags (max {max} per ticket)")]
    TagLimitExceeded { max: usize },

    #[error("{0}")]
    InvalidInput(String),

    #[error("invalid status catalog: {0}")]
    Catalog(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

impl Error {
    pub(crate) fn ticket_not_found(id: &str) -> Self {
        Error::NotFound {
            entity: "ticket",
            id: id.to_string(),
        }
    }

    pub(crate) fn task_not_found(id: &str) -> Self {
        Error::NotFound {
            entity: "task",
            id: id.to_string(),
        }
    }

    /// Stable machine-readable code for API envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "NOT_FOUND",
            Error::InvalidTransition { .. } => "INVALID_TRANSITION",
            Error::UnknownStatus { .. } => "UNKNOWN_STATUS",
            Error::StaleStatus { .. } => "STALE_STATUS",
            Error::Unauthorized { .. } => "UNAUTHORIZED",
            Error::InvalidEntityKind(_)
            | Error::FieldTooLong { .. }
            | Error::FieldEmpty { .. }
            | Error::TagLimitExceeded { .. }
            | Error::InvalidInput(_) => "INVALID_INPUT",
            Error::Catalog(_) => "CATALOG_ERROR",
            Error::Database(_) | Error::Io(_) | Error::Json(_) | Error::CorruptedData(_) => {
                "INTERNAL"
            }
        }
    }
}

/// A specialized Result type for hd-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
