// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Status, priority and category catalogs.
//!
//! The catalog is configuration, not code: each entity kind has its own list
//! of statuses, and each status carries the set of statuses reachable from
//! it. The graph is checked for referential integrity when loaded, then
//! shared read-only by every request.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// The kinds of entity that carry a workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Ticket,
    Task,
}

impl EntityKind {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Ticket => "ticket",
            EntityKind::Task => "task",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ticket" | "tickets" => Ok(EntityKind::Ticket),
            "task" | "tasks" => Ok(EntityKind::Task),
            _ => Err(Error::InvalidEntityKind(s.to_string())),
        }
    }
}

/// What the validator does for a status whose `allowed_transitions` was
/// never configured (as opposed to configured empty).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnconfiguredTransitions {
    /// No outgoing transitions.
    #[default]
    Deny,
    /// Every other status of the same kind is reachable.
    AllowAll,
}

/// A workflow status as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub id: String,
    pub name: String,
    pub color: String,
    pub is_closed: bool,
    pub is_resolved: bool,
    /// `None` when the catalog entry never configured any transitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_transitions: Option<BTreeSet<String>>,
}

/// Ticket priority. Lower `level` is more urgent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Priority {
    pub id: String,
    pub name: String,
    pub level: u8,
    #[serde(default = "default_color")]
    pub color: String,
}

/// Ticket category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// A status as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDef {
    pub id: String,
    /// Display name; defaults to the id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub resolved: bool,
    /// Marks the status new entities start in.
    #[serde(default)]
    pub initial: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_transitions: Option<Vec<String>>,
}

fn default_color() -> String {
    "gray".to_string()
}

/// Per-kind status lists as written in the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusesConfig {
    #[serde(default)]
    pub ticket: Vec<StatusDef>,
    #[serde(default)]
    pub task: Vec<StatusDef>,
}

/// Raw catalog configuration. Empty sections fall back to the built-in
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub statuses: StatusesConfig,
    #[serde(default)]
    pub priorities: Vec<Priority>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone)]
struct KindCatalog {
    statuses: Vec<Status>,
    initial: usize,
}

/// Validated, immutable catalog shared by the workflow services.
#[derive(Debug, Clone)]
pub struct StatusCatalog {
    tickets: KindCatalog,
    tasks: KindCatalog,
    priorities: Vec<Priority>,
    categories: Vec<Category>,
    unconfigured: UnconfiguredTransitions,
}

impl StatusCatalog {
    /// Build and validate a catalog from configuration.
    pub fn from_config(config: CatalogConfig, unconfigured: UnconfiguredTransitions) -> Result<Self> {
        let ticket_defs = if config.statuses.ticket.is_empty() {
            default_ticket_statuses()
        } else {
            config.statuses.ticket
        };
        let task_defs = if config.statuses.task.is_empty() {
            default_task_statuses()
        } else {
            config.statuses.task
        };
        let priorities = if config.priorities.is_empty() {
            default_priorities()
        } else {
            config.priorities
        };
        let categories = if config.categories.is_empty() {
            default_categories()
        } else {
            config.categories
        };

        check_unique_ids("priority", priorities.iter().map(|p| p.id.as_str()))?;
        check_unique_ids("category", categories.iter().map(|c| c.id.as_str()))?;

        Ok(StatusCatalog {
            tickets: build_kind(EntityKind::Ticket, ticket_defs)?,
            tasks: build_kind(EntityKind::Task, task_defs)?,
            priorities,
            categories,
            unconfigured,
        })
    }

    /// The built-in catalog with deny-by-default for unconfigured statuses.
    pub fn builtin() -> Result<Self> {
        Self::from_config(CatalogConfig::default(), UnconfiguredTransitions::Deny)
    }

    fn kind(&self, kind: EntityKind) -> &KindCatalog {
        match kind {
            EntityKind::Ticket => &self.tickets,
            EntityKind::Task => &self.tasks,
        }
    }

    /// All statuses of a kind, in configured order.
    pub fn statuses(&self, kind: EntityKind) -> &[Status] {
        &self.kind(kind).statuses
    }

    pub fn status(&self, kind: EntityKind, id: &str) -> Option<&Status> {
        self.kind(kind).statuses.iter().find(|s| s.id == id)
    }

    /// The status new entities of this kind start in.
    pub fn initial(&self, kind: EntityKind) -> &Status {
        let catalog = self.kind(kind);
        &catalog.statuses[catalog.initial]
    }

    pub fn unconfigured_policy(&self) -> UnconfiguredTransitions {
        self.unconfigured
    }

    pub fn priorities(&self) -> &[Priority] {
        &self.priorities
    }

    pub fn priority(&self, id: &str) -> Option<&Priority> {
        self.priorities.iter().find(|p| p.id == id)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Statuses reachable from `id`, in catalog order. Empty for an unknown id.
    pub fn valid_targets(&self, kind: EntityKind, id: &str) -> Vec<&Status> {
        match self.status(kind, id) {
            Some(current) => crate::transition::allowed_targets(self, kind, current),
            None => Vec::new(),
        }
    }

    /// Display name for a status id, falling back to the id itself.
    pub fn status_name<'a>(&'a self, kind: EntityKind, id: &'a str) -> &'a str {
        self.status(kind, id).map_or(id, |s| s.name.as_str())
    }
}

fn check_unique_ids<'a>(what: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(Error::Catalog(format!("{what} with empty id")));
        }
        if !seen.insert(id) {
            return Err(Error::Catalog(format!("duplicate {what} '{id}'")));
        }
    }
    Ok(())
}

fn build_kind(kind: EntityKind, defs: Vec<StatusDef>) -> Result<KindCatalog> {
    check_unique_ids(
        &format!("{kind} status"),
        defs.iter().map(|d| d.id.as_str()),
    )?;

    let known: HashSet<&str> = defs.iter().map(|d| d.id.as_str()).collect();
    let mut initial = None;

    for (index, def) in defs.iter().enumerate() {
        if def.initial {
            if initial.is_some() {
                return Err(Error::Catalog(format!(
                    "more than one initial {kind} status"
                )));
            }
            initial = Some(index);
        }

        for target in def.allowed_transitions.iter().flatten() {
            if *target == def.id {
                return Err(Error::Catalog(format!(
                    "{kind} status '{}' lists itself as a transition",
                    def.id
                )));
            }
            if !known.contains(target.as_str()) {
                return Err(Error::Catalog(format!(
                    "{kind} status '{}' allows transition to unknown status '{target}'",
                    def.id
                )));
            }
        }
    }

    let statuses = defs
        .into_iter()
        .map(|def| Status {
            name: def.name.unwrap_or_else(|| def.id.clone()),
            id: def.id,
            color: def.color,
            is_closed: def.closed,
            is_resolved: def.resolved,
            allowed_transitions: def
                .allowed_transitions
                .map(|targets| targets.into_iter().collect()),
        })
        .collect();

    Ok(KindCatalog {
        statuses,
        initial: initial.unwrap_or(0),
    })
}

fn def(id: &str, color: &str, targets: &[&str]) -> StatusDef {
    StatusDef {
        id: id.to_string(),
        name: None,
        color: color.to_string(),
        closed: false,
        resolved: false,
        initial: false,
        allowed_transitions: Some(targets.iter().map(|t| t.to_string()).collect()),
    }
}

/// Built-in ticket statuses.
pub fn default_ticket_statuses() -> Vec<StatusDef> {
    vec![
        StatusDef {
            initial: true,
            ..def("OPEN", "blue", &["IN_PROGRESS", "CLOSED"])
        },
        def("IN_PROGRESS", "yellow", &["OPEN", "RESOLVED", "CLOSED"]),
        StatusDef {
            resolved: true,
            ..def("RESOLVED", "green", &["CLOSED", "IN_PROGRESS"])
        },
        StatusDef {
            closed: true,
            ..def("CLOSED", "gray", &["OPEN"])
        },
    ]
}

/// Built-in task statuses. COMPLETED has no outgoing edges.
pub fn default_task_statuses() -> Vec<StatusDef> {
    vec![
        StatusDef {
            initial: true,
            ..def("PENDING", "gray", &["IN_PROGRESS", "BLOCKED"])
        },
        def("IN_PROGRESS", "blue", &["COMPLETED", "BLOCKED", "PENDING"]),
        StatusDef {
            closed: true,
            resolved: true,
            ..def("COMPLETED", "green", &[])
        },
        def("BLOCKED", "red", &["IN_PROGRESS", "PENDING"]),
    ]
}

pub fn default_priorities() -> Vec<Priority> {
    [
        ("URGENT", "Urgent", 0, "red"),
        ("HIGH", "High", 1, "orange"),
        ("MEDIUM", "Medium", 2, "yellow"),
        ("LOW", "Low", 3, "green"),
    ]
    .into_iter()
    .map(|(id, name, level, color)| Priority {
        id: id.to_string(),
        name: name.to_string(),
        level,
        color: color.to_string(),
    })
    .collect()
}

pub fn default_categories() -> Vec<Category> {
    [
        ("GENERAL", "General"),
        ("BILLING", "Billing"),
        ("TECHNICAL", "Technical"),
    ]
    .into_iter()
    .map(|(id, name)| Category {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect()
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
