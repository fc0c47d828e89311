// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP routing and the accept loop.

use axum::routing::{get, patch, post};
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::handlers::{self, catalog, tasks, tickets};
use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/statuses/{kind}", get(catalog::statuses))
        .route("/priorities", get(catalog::priorities))
        .route("/categories", get(catalog::categories))
        .route("/tickets", post(tickets::create))
        .route("/tickets/{id}", get(tickets::get).put(tickets::edit))
        .route("/ticket-numbers/{number}", get(tickets::get_by_number))
        .route("/tickets/{id}/status-history", get(tickets::status_history))
        .route("/tickets/{id}/comments", get(tickets::comments))
        .route("/tickets/{id}/timeline", get(tickets::timeline))
        .route("/comments", post(tickets::add_comment))
        .route("/tickets/{id}/tasks", get(tasks::list).post(tasks::create))
        .route(
            "/tickets/{id}/tasks/{task_id}",
            get(tasks::get).patch(tasks::update),
        )
        .route(
            "/tickets/{id}/tasks/{task_id}/status",
            patch(tasks::change_status),
        )
        .route(
            "/tickets/{id}/tasks/{task_id}/status-history",
            get(tasks::status_history),
        )
        .route("/tickets/{id}/tasks/{task_id}/assign", patch(tasks::assign))
        .route(
            "/tickets/{id}/tasks/{task_id}/assignment-history",
            get(tasks::assignment_history),
        )
        .route(
            "/tickets/{id}/tasks/{task_id}/comments",
            get(tasks::comments).post(tasks::add_comment),
        )
}

/// Serve until Ctrl-C.
pub async fn run(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on: {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
