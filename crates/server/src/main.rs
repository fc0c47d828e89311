// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! helpdeskd: helpdesk ticket and task workflow server.

use clap::Parser;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::info;

use hd_core::Database;
use hd_server::{AppState, Config};

#[derive(Parser, Debug)]
#[command(name = "helpdeskd")]
#[command(about = "Helpdesk ticket and task workflow server")]
struct Args {
    /// Configuration file (default: ./helpdesk.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind the server to (overrides the config file)
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// SQLite database path (overrides the config file)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(log_file: Option<&Path>, verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Try to open log file, fall back to stderr
    let file = log_file.and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });
    if let Some(file) = file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = Config::discover(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(database) = args.database {
        config.server.database = database;
    }

    setup_logging(config.server.log_file.as_deref(), args.verbose);

    info!("Starting helpdeskd");
    info!("  Bind address: {}", config.server.bind);
    info!("  Database: {}", config.server.database.display());
    info!(
        "  Unconfigured transitions: {:?}",
        config.workflow.unconfigured_transitions
    );

    let catalog = config.catalog()?;
    let db = Database::open(&config.server.database)?;
    let state = AppState::new(db, catalog, config.workflow.clone());

    hd_server::run(config.server.bind, state).await?;

    Ok(())
}
