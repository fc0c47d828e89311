// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared server state.
//!
//! One SQLite connection behind a mutex, plus the validated catalog and
//! workflow settings, which are read-only after startup.

use std::sync::Arc;
use tokio::sync::Mutex;

use hd_core::{Database, Result, StatusCatalog, TaskWorkflow, TicketWorkflow, WorkflowSettings};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    db: Mutex<Database>,
    catalog: StatusCatalog,
    settings: WorkflowSettings,
}

impl AppState {
    pub fn new(db: Database, catalog: StatusCatalog, settings: WorkflowSettings) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                db: Mutex::new(db),
                catalog,
                settings,
            }),
        }
    }

    pub fn catalog(&self) -> &StatusCatalog {
        &self.inner.catalog
    }

    pub async fn health_check(&self) -> Result<()> {
        self.inner.db.lock().await.health_check()
    }

    /// Run `f` against the ticket workflow while holding the connection.
    pub async fn tickets<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut TicketWorkflow<'_>) -> Result<T> + Send,
    {
        let mut db = self.inner.db.lock().await;
        let mut workflow = TicketWorkflow::new(&mut db, &self.inner.catalog, &self.inner.settings);
        f(&mut workflow)
    }

    /// Run `f` against the task workflow while holding the connection.
    pub async fn tasks<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut TaskWorkflow<'_>) -> Result<T> + Send,
    {
        let mut db = self.inner.db.lock().await;
        let mut workflow = TaskWorkflow::new(&mut db, &self.inner.catalog);
        f(&mut workflow)
    }
}
