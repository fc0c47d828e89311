// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use hd_core::{
    Comment, EditOutcome, NewComment, NewTicket, StatusHistoryEntry, Ticket, TicketEdit,
    TicketView, TimelineItem,
};

use super::{ok, ApiResponse, ApiResult};
use crate::actor::CurrentActor;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineQuery {
    #[serde(default)]
    pub include_history: bool,
}

/// `POST /api/tickets`
pub async fn create(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    body: Result<Json<NewTicket>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Ticket>>), ApiError> {
    let Json(new) = body?;
    let ticket = state.tickets(|w| w.create(&actor, &new)).await?;
    Ok((StatusCode::CREATED, ok(ticket)?))
}

/// `GET /api/tickets/{id}`
pub async fn get(
    State(state): State<AppState>,
    _actor: CurrentActor,
    Path(id): Path<String>,
) -> ApiResult<TicketView> {
    ok(state.tickets(|w| w.view(&id)).await?)
}

/// `GET /api/ticket-numbers/{number}`
pub async fn get_by_number(
    State(state): State<AppState>,
    _actor: CurrentActor,
    number: Result<Path<i64>, PathRejection>,
) -> ApiResult<TicketView> {
    let Path(number) = number?;
    ok(state.tickets(|w| w.view_by_number(number)).await?)
}

/// `PUT /api/tickets/{id}`: field edits and an optional status change.
pub async fn edit(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    body: Result<Json<TicketEdit>, JsonRejection>,
) -> ApiResult<EditOutcome> {
    let Json(edit) = body?;
    ok(state.tickets(|w| w.edit(&actor, &id, &edit)).await?)
}

/// `GET /api/tickets/{id}/status-history`
pub async fn status_history(
    State(state): State<AppState>,
    _actor: CurrentActor,
    Path(id): Path<String>,
) -> ApiResult<Vec<StatusHistoryEntry>> {
    ok(state.tickets(|w| w.status_history(&id)).await?)
}

/// `GET /api/tickets/{id}/comments`
pub async fn comments(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> ApiResult<Vec<Comment>> {
    ok(state.tickets(|w| w.comments(&actor, &id)).await?)
}

/// `GET /api/tickets/{id}/timeline?includeHistory=true`
pub async fn timeline(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    query: Result<Query<TimelineQuery>, QueryRejection>,
) -> ApiResult<Vec<TimelineItem>> {
    let Query(query) = query?;
    ok(state
        .tickets(|w| w.timeline(&actor, &id, query.include_history))
        .await?)
}

/// `POST /api/comments`
pub async fn add_comment(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    body: Result<Json<NewComment>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Comment>>), ApiError> {
    let Json(new) = body?;
    let comment = state.tickets(|w| w.add_comment(&actor, &new)).await?;
    Ok((StatusCode::CREATED, ok(comment)?))
}
