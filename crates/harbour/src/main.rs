mod cli;
mod commands;
mod config;
mod daemon;
mod error;
mod gateway;
mod state;
mod store;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use crate::{
    cli::Cli,
    config::{HarbourConfig, LogFormat, LogOutput},
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Phase 1: Basic tracing so we can log during config loading
    // Uses set_default (thread-local) so it can be replaced by Phase 2's global subscriber
    let basic_tracing = init_tracing_basic();

    debug!("Harbour v{}", env!("CARGO_PKG_VERSION"));

    let config = HarbourConfig::load().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    // Phase 2: Drop the phase-1 guard so the global subscriber slot is free
    drop(basic_tracing);
    init_tracing_from_config(&config)?;

    info!(snapshot = %config.state.snapshot_path, "Configuration loaded");

    commands::dispatch(cli.command, &config).await
}

/// Phase 1: Basic tracing init so we can log during config loading.
/// Uses RUST_LOG env var or a sensible default.
fn init_tracing_basic() -> tracing::subscriber::DefaultGuard {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,harbour=debug"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_default(subscriber)
}

/// Phase 2: Install the global subscriber described by the configuration.
fn init_tracing_from_config(config: &HarbourConfig) -> Result<()> {
    use std::sync::Arc;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Prefer RUST_LOG env var, fall back to config level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let open = |path: &str| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file '{}'", path))
    };

    match (&config.logging.format, &config.logging.output) {
        (LogFormat::Json, LogOutput::Stdout) => {
            let layer = fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        (LogFormat::Json, LogOutput::File { path }) => {
            let layer = fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .with_writer(Arc::new(open(path)?));
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        (LogFormat::Pretty, LogOutput::Stdout) => {
            let layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        (LogFormat::Pretty, LogOutput::File { path }) => {
            let layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(false)
                .with_writer(Arc::new(open(path)?));
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    }
    Ok(())
}
