// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Input limits for ticket, task and comment fields.

use crate::error::{Error, Result};
use crate::ticket::Attachment;

// Input length limits
pub const MAX_TITLE_LENGTH: usize = 500;
pub const MAX_DESCRIPTION_LENGTH: usize = 1_000_000;
pub const MAX_TAG_LENGTH: usize = 100;
pub const MAX_COMMENT_LENGTH: usize = 200_000;
pub const MAX_REASON_LENGTH: usize = 500;
pub const MAX_TAGS_PER_TICKET: usize = 20;
pub const MAX_ASSIGNEE_LENGTH: usize = 100;
pub const MAX_PROGRESS: u8 = 100;

fn check_length(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.len() > max {
        return Err(Error::FieldTooLong {
            field,
            actual: value.len(),
            max,
        });
    }
    Ok(())
}

/// Validate and trim a title: required, at most [`MAX_TITLE_LENGTH`] bytes.
pub fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::FieldEmpty { field: "Title" });
    }
    check_length("Title", trimmed, MAX_TITLE_LENGTH)?;
    Ok(trimmed.to_string())
}

/// Validate that a description is within length limits.
///
/// Descriptions are rich text and are stored untrimmed.
pub fn validate_description(description: &str) -> Result<()> {
    check_length("Description", description, MAX_DESCRIPTION_LENGTH)
}

/// Validate and trim comment content. Empty comments are rejected.
pub fn validate_comment(content: &str) -> Result<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(Error::FieldEmpty { field: "Comment" });
    }
    check_length("Comment", trimmed, MAX_COMMENT_LENGTH)?;
    Ok(trimmed.to_string())
}

/// Validate and trim an optional free-text field attached to a status change.
///
/// Blank input collapses to `None`.
pub fn validate_optional_comment(content: Option<&str>) -> Result<Option<String>> {
    match content.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => {
            check_length("Comment", text, MAX_COMMENT_LENGTH)?;
            Ok(Some(text.to_string()))
        }
    }
}

/// Validate and trim a reason. Blank input collapses to `None`.
pub fn validate_reason(reason: Option<&str>) -> Result<Option<String>> {
    match reason.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => {
            check_length("Reason", text, MAX_REASON_LENGTH)?;
            Ok(Some(text.to_string()))
        }
    }
}

/// Validate that an assignee is valid (non-empty after trimming, within length limits)
pub fn validate_assignee(assignee: &str) -> Result<String> {
    let trimmed = assignee.trim();
    if trimmed.is_empty() {
        return Err(Error::FieldEmpty { field: "Assignee" });
    }
    check_length("Assignee", trimmed, MAX_ASSIGNEE_LENGTH)?;
    Ok(trimmed.to_string())
}

/// Validate a tag list: trims each tag, drops duplicates, enforces limits.
pub fn validate_tags(tags: &[String]) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(Error::FieldEmpty { field: "Tag" });
        }
        check_length("Tag", trimmed, MAX_TAG_LENGTH)?;
        if !out.iter().any(|t| t == trimmed) {
            out.push(trimmed.to_string());
        }
    }
    if out.len() > MAX_TAGS_PER_TICKET {
        return Err(Error::TagLimitExceeded {
            max: MAX_TAGS_PER_TICKET,
        });
    }
    Ok(out)
}

/// Attachments are references only; both parts must be present.
pub fn validate_attachments(attachments: &[Attachment]) -> Result<()> {
    for attachment in attachments {
        if attachment.file_name.trim().is_empty() {
            return Err(Error::FieldEmpty {
                field: "Attachment file name",
            });
        }
        if attachment.url.trim().is_empty() {
            return Err(Error::FieldEmpty {
                field: "Attachment URL",
            });
        }
    }
    Ok(())
}

/// Validate a progress percentage.
pub fn validate_progress(progress: u8) -> Result<()> {
    if progress > MAX_PROGRESS {
        return Err(Error::InvalidInput(format!(
            "progress must be between 0 and {MAX_PROGRESS}, got {progress}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
