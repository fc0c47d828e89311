// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! API error type and its JSON envelope.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use hd_core::Error as CoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing {0} header")]
    Unauthenticated(&'static str),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(e) => match e {
                CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                CoreError::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                CoreError::StaleStatus { .. } => StatusCode::CONFLICT,
                CoreError::Unauthorized { .. } => StatusCode::FORBIDDEN,
                CoreError::InvalidEntityKind(_)
                | CoreError::FieldTooLong { .. }
                | CoreError::FieldEmpty { .. }
                | CoreError::TagLimitExceeded { .. }
                | CoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                CoreError::UnknownStatus { .. }
                | CoreError::Catalog(_)
                | CoreError::Database(_)
                | CoreError::Io(_)
                | CoreError::Json(_)
                | CoreError::CorruptedData(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::BadRequest(_) => "INVALID_INPUT",
            ApiError::Core(e) => e.code(),
        }
    }

    /// Message sent to the client. Storage faults stay in the log.
    fn public_message(&self) -> String {
        match self {
            ApiError::Core(
                CoreError::Database(_)
                | CoreError::Io(_)
                | CoreError::Json(_)
                | CoreError::CorruptedData(_),
            ) => "internal server error".to_string(),
            // First line only; the rest are CLI-style hints
            other => other
                .to_string()
                .lines()
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{} request failed: {}", status, self);
        } else {
            warn!("{} {}", status, self);
        }

        let body = json!({
            "success": false,
            "error": self.public_message(),
            "code": self.code(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
