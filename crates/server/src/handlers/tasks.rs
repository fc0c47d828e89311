// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use hd_core::{
    AssignmentHistoryEntry, ChangeStatus, NewTask, StatusChange, StatusHistoryEntry, Task,
    TaskAssignment, TaskComment, TaskUpdate,
};

use super::{ok, ApiResponse, ApiResult};
use crate::actor::CurrentActor;
use crate::error::ApiError;
use crate::state::AppState;

/// Body of `PATCH …/tasks/{taskId}/status`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusBody {
    pub to_status: String,
    pub reason: Option<String>,
    pub comment: Option<String>,
    pub expected_status: Option<String>,
}

impl From<TaskStatusBody> for ChangeStatus {
    fn from(body: TaskStatusBody) -> Self {
        ChangeStatus {
            target: body.to_status,
            reason: body.reason,
            comment: body.comment,
            expected: body.expected_status,
        }
    }
}

/// Body of `PATCH …/tasks/{taskId}/assign`. `null` clears the assignee.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignBody {
    pub assigned_to: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TaskCommentBody {
    pub content: String,
}

/// `POST /api/tickets/{id}/tasks`
pub async fn create(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(ticket_id): Path<String>,
    body: Result<Json<NewTask>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Task>>), ApiError> {
    let Json(new) = body?;
    let task = state.tasks(|w| w.create(&actor, &ticket_id, &new)).await?;
    Ok((StatusCode::CREATED, ok(task)?))
}

/// `GET /api/tickets/{id}/tasks`
pub async fn list(
    State(state): State<AppState>,
    _actor: CurrentActor,
    Path(ticket_id): Path<String>,
) -> ApiResult<Vec<Task>> {
    ok(state.tasks(|w| w.list(&ticket_id)).await?)
}

/// `GET /api/tickets/{id}/tasks/{taskId}`
pub async fn get(
    State(state): State<AppState>,
    _actor: CurrentActor,
    Path((ticket_id, task_id)): Path<(String, String)>,
) -> ApiResult<Task> {
    ok(state.tasks(|w| w.get(&ticket_id, &task_id)).await?)
}

/// `PATCH /api/tickets/{id}/tasks/{taskId}`
pub async fn update(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((ticket_id, task_id)): Path<(String, String)>,
    body: Result<Json<TaskUpdate>, JsonRejection>,
) -> ApiResult<Task> {
    let Json(update) = body?;
    ok(state
        .tasks(|w| w.update(&actor, &ticket_id, &task_id, &update))
        .await?)
}

/// `PATCH /api/tickets/{id}/tasks/{taskId}/status`
pub async fn change_status(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((ticket_id, task_id)): Path<(String, String)>,
    body: Result<Json<TaskStatusBody>, JsonRejection>,
) -> ApiResult<StatusChange<Task>> {
    let Json(body) = body?;
    let request = ChangeStatus::from(body);
    ok(state
        .tasks(|w| w.change_status(&actor, &ticket_id, &task_id, &request))
        .await?)
}

/// `GET /api/tickets/{id}/tasks/{taskId}/status-history`
pub async fn status_history(
    State(state): State<AppState>,
    _actor: CurrentActor,
    Path((ticket_id, task_id)): Path<(String, String)>,
) -> ApiResult<Vec<StatusHistoryEntry>> {
    ok(state
        .tasks(|w| w.status_history(&ticket_id, &task_id))
        .await?)
}

/// `PATCH /api/tickets/{id}/tasks/{taskId}/assign`
pub async fn assign(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((ticket_id, task_id)): Path<(String, String)>,
    body: Result<Json<AssignBody>, JsonRejection>,
) -> ApiResult<TaskAssignment> {
    let Json(body) = body?;
    ok(state
        .tasks(|w| {
            w.assign(
                &actor,
                &ticket_id,
                &task_id,
                body.assigned_to.as_deref(),
                body.reason.as_deref(),
            )
        })
        .await?)
}

/// `GET /api/tickets/{id}/tasks/{taskId}/assignment-history`
pub async fn assignment_history(
    State(state): State<AppState>,
    _actor: CurrentActor,
    Path((ticket_id, task_id)): Path<(String, String)>,
) -> ApiResult<Vec<AssignmentHistoryEntry>> {
    ok(state
        .tasks(|w| w.assignment_history(&ticket_id, &task_id))
        .await?)
}

/// `POST /api/tickets/{id}/tasks/{taskId}/comments`
pub async fn add_comment(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((ticket_id, task_id)): Path<(String, String)>,
    body: Result<Json<TaskCommentBody>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<TaskComment>>), ApiError> {
    let Json(body) = body?;
    let comment = state
        .tasks(|w| w.add_comment(&actor, &ticket_id, &task_id, &body.content))
        .await?;
    Ok((StatusCode::CREATED, ok(comment)?))
}

/// `GET /api/tickets/{id}/tasks/{taskId}/comments`
pub async fn comments(
    State(state): State<AppState>,
    _actor: CurrentActor,
    Path((ticket_id, task_id)): Path<(String, String)>,
) -> ApiResult<Vec<TaskComment>> {
    ok(state.tasks(|w| w.comments(&ticket_id, &task_id)).await?)
}
