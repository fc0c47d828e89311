// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `helpdesk.toml` loading.
//!
//! Every section is optional. A missing `[server]` or `[workflow]` table
//! takes the defaults below, and missing catalog sections fall back to the
//! built-in statuses, priorities and categories.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use hd_core::{CatalogConfig, StatusCatalog, WorkflowSettings};

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "helpdesk.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Catalog(#[from] hd_core::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub database: PathBuf,
    /// Log to this file instead of stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            database: PathBuf::from("helpdesk.db"),
            log_file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub workflow: WorkflowSettings,
    #[serde(flatten)]
    pub catalog: CatalogConfig,
}

impl Config {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Load `path` if given, else `helpdesk.toml` if present, else defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load(fallback)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    /// Validate the configured catalogs.
    pub fn catalog(&self) -> Result<StatusCatalog, ConfigError> {
        Ok(StatusCatalog::from_config(
            self.catalog.clone(),
            self.workflow.unconfigured_transitions,
        )?)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
