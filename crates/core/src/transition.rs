// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transition validation against the catalog's allowed-transition graph.

use crate::catalog::{EntityKind, Status, StatusCatalog, UnconfiguredTransitions};
use crate::error::Error;

/// Why a requested status change was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Target equals the current status.
    NoChange,
    /// The entity's current status is missing from the catalog.
    UnknownCurrent(String),
    /// The requested status is missing from the catalog.
    UnknownTarget(String),
    /// Target exists but is not reachable from the current status.
    NotAllowed { valid_targets: Vec<String> },
}

impl Rejection {
    /// Convert into the workflow error reported to callers.
    pub fn into_error(self, kind: EntityKind, from: &str, to: &str) -> Error {
        match self {
            Rejection::UnknownCurrent(id) | Rejection::UnknownTarget(id) => {
                Error::UnknownStatus { kind, id }
            }
            Rejection::NoChange => Error::InvalidTransition {
                kind,
                from: from.to_string(),
                to: to.to_string(),
                valid_targets: "a status other than the current one".to_string(),
            },
            Rejection::NotAllowed { valid_targets } => Error::InvalidTransition {
                kind,
                from: from.to_string(),
                to: to.to_string(),
                valid_targets: if valid_targets.is_empty() {
                    "(none)".to_string()
                } else {
                    valid_targets.join(", ")
                },
            },
        }
    }
}

/// Statuses reachable from `current`, in catalog order.
///
/// An empty configured set reaches nothing. A status with no configured set
/// follows the catalog's [`UnconfiguredTransitions`] policy.
pub fn allowed_targets<'a>(
    catalog: &'a StatusCatalog,
    kind: EntityKind,
    current: &Status,
) -> Vec<&'a Status> {
    catalog
        .statuses(kind)
        .iter()
        .filter(|candidate| candidate.id != current.id)
        .filter(|candidate| match &current.allowed_transitions {
            Some(targets) => targets.contains(&candidate.id),
            None => catalog.unconfigured_policy() == UnconfiguredTransitions::AllowAll,
        })
        .collect()
}

/// Check whether `current` may move to `target`.
pub fn validate(
    catalog: &StatusCatalog,
    kind: EntityKind,
    current: &str,
    target: &str,
) -> Result<(), Rejection> {
    let current_status = catalog
        .status(kind, current)
        .ok_or_else(|| Rejection::UnknownCurrent(current.to_string()))?;

    if current == target {
        return Err(Rejection::NoChange);
    }

    if catalog.status(kind, target).is_none() {
        return Err(Rejection::UnknownTarget(target.to_string()));
    }

    let targets = allowed_targets(catalog, kind, current_status);
    if targets.iter().any(|s| s.id == target) {
        Ok(())
    } else {
        Err(Rejection::NotAllowed {
            valid_targets: targets.into_iter().map(|s| s.id.clone()).collect(),
        })
    }
}

/// [`validate`], mapped into a workflow [`Error`].
pub fn check(
    catalog: &StatusCatalog,
    kind: EntityKind,
    current: &str,
    target: &str,
) -> crate::error::Result<()> {
    validate(catalog, kind, current, target).map_err(|r| r.into_error(kind, current, target))
}

#[cfg(test)]
#[path = "transition_tests.rs"]
mod tests;
