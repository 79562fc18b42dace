/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use alarmd::alarm::NewAlarm;
use alarmd::config::AlarmdConfig;
use alarmd::notify::LogNotifier;
use alarmd::runtime::AlarmRuntime;
use alarmd::service::AlarmService;

// ── CLI argument definition ───────────────────────────────────────────────────

/// alarmd – in-memory alarm registry.
///
/// Example:
///   alarmd -c alarmd.yaml -p 8080 --sample testdata/sample_alarms.json
#[derive(Debug, Parser)]
#[command(
    name = "alarmd",
    about = "In-memory alarm registry with periodic re-notification",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// HTTP port; overrides the configuration file.
    #[arg(short = 'p', long = "port", env = "PORT")]
    port: Option<u16>,

    /// JSON array of `{name, state}` objects to bulk-create at start-up.
    #[arg(short = 's', long = "sample")]
    sample: Option<PathBuf>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("alarmd starting up...");

    let cli = Cli::parse();
    info!(
        config = ?cli.config,
        port   = ?cli.port,
        sample = ?cli.sample,
        "Command line"
    );

    if let Err(e) = run(cli).await {
        error!("alarmd failed: {:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // ── Load configuration ────────────────────────────────────────────────────
    let mut config = match &cli.config {
        Some(path) => AlarmdConfig::load_from_file(path)?,
        None => {
            warn!("No configuration file provided, using default settings");
            AlarmdConfig::default()
        }
    };
    if let Some(port) = cli.port {
        config.port = port;
    }

    // ── Start the registry ────────────────────────────────────────────────────
    let runtime = AlarmRuntime::start(&config.notifications, Arc::new(LogNotifier));
    let service = runtime.service();

    if let Some(path) = &cli.sample {
        load_sample(&service, path).await?;
    }

    // ── Serve ─────────────────────────────────────────────────────────────────
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!("Server running on {}", addr);

    let served = axum::serve(listener, alarmd::http::router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error");

    runtime.shutdown().await;
    served
}

/// Bulk-creates the alarms listed in a JSON file.  Rejected entries are logged
/// and do not stop start-up.
async fn load_sample(service: &AlarmService, path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot open sample file: {}", path.display()))?;
    let entries: Vec<NewAlarm> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse sample file: {}", path.display()))?;

    let outcome = service.bulk_create(entries).await;
    match outcome.error() {
        None => info!("Loaded {} sample alarm(s)", outcome.created.len()),
        Some(e) => warn!(
            loaded = outcome.created.len(),
            "Sample file partially loaded: {}", e
        ),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
