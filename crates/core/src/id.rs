// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Prefix for ticket identifiers.
pub const TICKET_ID_PREFIX: &str = "tkt";
/// Prefix for task identifiers.
pub const TASK_ID_PREFIX: &str = "task";

/// Generate an entity ID from prefix, title, and timestamp.
/// Format: {prefix}-{hash} where hash is first 8 hex chars of SHA256(title + timestamp)
pub fn generate_id(prefix: &str, title: &str, created_at: &DateTime<Utc>) -> String {
    let input = format!("{}{}", title, created_at.to_rfc3339());
    let hash = Sha256::digest(input.as_bytes());
    let short_hash = hex::encode(&hash[..4]);
    format!("{}-{}", prefix, short_hash)
}

/// Generate a unique ID, handling collisions by appending an incrementing suffix.
pub fn generate_unique_id<F>(
    prefix: &str,
    title: &str,
    created_at: &DateTime<Utc>,
    exists: F,
) -> crate::error::Result<String>
where
    F: Fn(&str) -> crate::error::Result<bool>,
{
    let base_id = generate_id(prefix, title, created_at);

    if !exists(&base_id)? {
        return Ok(base_id);
    }

    let mut suffix = 2;
    loop {
        let id = format!("{}-{}", base_id, suffix);
        if !exists(&id)? {
            return Ok(id);
        }
        suffix += 1;
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
