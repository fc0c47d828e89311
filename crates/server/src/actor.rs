// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Actor extraction from the headers set by the upstream auth proxy.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use hd_core::{Actor, Permission};

use crate::error::ApiError;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLES_HEADER: &str = "x-actor-roles";
pub const ACTOR_PERMISSIONS_HEADER: &str = "x-actor-permissions";

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<Option<&'a str>, ApiError> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| ApiError::BadRequest(format!("{name} header is not valid text")))
        })
        .transpose()
}

fn list(value: Option<&str>) -> impl Iterator<Item = &str> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Build an actor from request headers. Unknown permission keys are an error.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, ApiError> {
    let id = header(headers, ACTOR_ID_HEADER)?
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::Unauthenticated("X-Actor-Id"))?;

    let mut actor = Actor::new(id);
    for role in list(header(headers, ACTOR_ROLES_HEADER)?) {
        actor = actor.with_role(role);
    }
    for key in list(header(headers, ACTOR_PERMISSIONS_HEADER)?) {
        actor = actor.with_permission(key.parse::<Permission>()?);
    }
    Ok(actor)
}

impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers).map(CurrentActor)
    }
}

#[cfg(test)]
#[path = "actor_tests.rs"]
mod tests;
