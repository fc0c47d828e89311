// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! hd-server: REST surface for the helpdesk workflow core.
//!
//! Routes map one-to-one onto `hd_core` workflow calls. Every `/api` route
//! requires the `X-Actor-Id` header set by the upstream auth proxy.

pub mod actor;
pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use server::{router, run};
pub use state::AppState;
