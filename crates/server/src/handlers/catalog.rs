// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use axum::extract::{Path, State};

use hd_core::{Category, EntityKind, Priority, Status};

use super::{ok, ApiResult};
use crate::actor::CurrentActor;
use crate::state::AppState;

/// `GET /api/statuses/{kind}`
pub async fn statuses(
    State(state): State<AppState>,
    _actor: CurrentActor,
    Path(kind): Path<String>,
) -> ApiResult<Vec<Status>> {
    let kind: EntityKind = kind.parse()?;
    ok(state.catalog().statuses(kind).to_vec())
}

/// `GET /api/priorities`
pub async fn priorities(State(state): State<AppState>, _actor: CurrentActor) -> ApiResult<Vec<Priority>> {
    ok(state.catalog().priorities().to_vec())
}

/// `GET /api/categories`
pub async fn categories(State(state): State<AppState>, _actor: CurrentActor) -> ApiResult<Vec<Category>> {
    ok(state.catalog().categories().to_vec())
}
