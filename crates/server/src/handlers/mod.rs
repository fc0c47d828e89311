// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Route handlers.
//!
//! Handlers extract the caller and the request body, run one workflow call
//! under the database lock and wrap the result in the success envelope.

pub mod catalog;
pub mod tasks;
pub mod tickets;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Success envelope: `{"success": true, "data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse {
        success: true,
        data,
    }))
}

/// Liveness probe: `SELECT 1` against the database.
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    debug!("health check");
    state.health_check().await?;
    Ok(Json(json!({ "success": true, "data": { "status": "ok" } })))
}
