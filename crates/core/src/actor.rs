// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The acting user and the permission keys the workflow enforces.
//!
//! Authentication happens upstream; every workflow call receives an explicit
//! [`Actor`] and re-checks authorization itself.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Roles that implicitly hold every permission.
pub const PRIVILEGED_ROLES: &[&str] = &["admin", "manager"];

/// Permission keys consumed from the auth collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// Create tickets and edit their fields.
    #[serde(rename = "tickets:write")]
    TicketsWrite,
    /// Move a ticket through its status graph.
    #[serde(rename = "ticket-status:change")]
    TicketStatusChange,
    /// Append ticket or task comments.
    #[serde(rename = "comments:write")]
    CommentsWrite,
    /// Create, edit, assign and transition tasks.
    #[serde(rename = "tasks:write")]
    TasksWrite,
}

impl Permission {
    /// Returns the permission key string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::TicketsWrite => "tickets:write",
            Permission::TicketStatusChange => "ticket-status:change",
            Permission::CommentsWrite => "comments:write",
            Permission::TasksWrite => "tasks:write",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Permission {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "tickets:write" => Ok(Permission::TicketsWrite),
            "ticket-status:change" => Ok(Permission::TicketStatusChange),
            "comments:write" => Ok(Permission::CommentsWrite),
            "tasks:write" => Ok(Permission::TasksWrite),
            _ => Err(Error::InvalidInput(format!("unknown permission '{s}'"))),
        }
    }
}

/// The user on whose behalf a workflow operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    #[serde(default)]
    pub permissions: BTreeSet<Permission>,
}

impl Actor {
    pub fn new(id: impl Into<String>) -> Self {
        Actor {
            id: id.into(),
            roles: BTreeSet::new(),
            permissions: BTreeSet::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into().to_lowercase());
        self
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.insert(permission);
        self
    }

    /// Whether one of the actor's roles grants every permission.
    pub fn is_privileged(&self) -> bool {
        PRIVILEGED_ROLES
            .iter()
            .any(|role| self.roles.contains(*role))
    }

    /// Staff may read internal comments: privileged roles and anyone who
    /// can move tickets through the workflow.
    pub fn is_staff(&self) -> bool {
        self.can(Permission::TicketStatusChange)
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.is_privileged() || self.permissions.contains(&permission)
    }

    /// Fails with [`Error::Unauthorized`] unless the actor holds `permission`.
    pub fn require(&self, permission: Permission) -> Result<()> {
        if self.can(permission) {
            Ok(())
        } else {
            tracing::warn!(actor = %self.id, %permission, "permission denied");
            Err(Error::Unauthorized {
                actor: self.id.clone(),
                permission,
            })
        }
    }
}

#[cfg(test)]
#[path = "actor_tests.rs"]
mod tests;
