//! WeeWX Prometheus Exporter — Entry Point
//!
//! Initializes configuration, logging, the metrics registry, and the
//! polling loop. Runs until SIGINT/SIGTERM.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Build the Prometheus gauge registry
//! 4. Spawn metrics server on the scrape port (/metrics)
//! 5. Spawn health server (/live + /ready)
//! 6. Run the poll loop (load CSV → evaluate → publish → sleep)
//! 7. Wait for SIGINT → graceful shutdown (readiness → 503, drain, exit)

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};

mod adapters;
mod config;
mod domain;
mod ports;
mod usecases;

use adapters::csv::CsvRowSource;
use adapters::metrics::{HealthServer, HealthState, WeatherMetrics};
use domain::evaluator::DataFreshnessEvaluator;
use usecases::PollService;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config = config::loader::load_config("config.toml")
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(&config.exporter.log_level)
            }),
        )
        .json()
        .init();

    info!(
        name = %config.exporter.name,
        version = env!("CARGO_PKG_VERSION"),
        sensors = config.sensors.names.len(),
        csv_path = %config.source.csv_path,
        "Starting WeeWX exporter"
    );

    // ── 3. Shutdown signal channel + shared health state ────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let health = Arc::new(HealthState::new());

    // ── 4. Build gauge registry and spawn metrics server ────
    let metrics = Arc::new(WeatherMetrics::new().context("Failed to register metrics")?);
    let metrics_handle = tokio::spawn(Arc::clone(&metrics).serve(
        config.metrics.bind_address.clone(),
        shutdown_tx.subscribe(),
    ));

    // ── 5. Spawn health server ──────────────────────────────
    let health_server = HealthServer::new(Arc::clone(&health), config.metrics.health_port);
    let health_shutdown = shutdown_tx.subscribe();
    let health_handle = tokio::spawn(async move {
        if let Err(e) = health_server.run(health_shutdown).await {
            error!(error = %e, "Health server failed");
        }
    });

    // ── 6. Spawn the poll loop ──────────────────────────────
    let evaluator = DataFreshnessEvaluator::new(
        config.sensors.names.clone(),
        config.exporter.staleness_seconds,
    );
    let service = PollService::new(
        CsvRowSource::new(&config.source.csv_path),
        Arc::clone(&metrics),
        evaluator,
        Duration::from_secs(config.exporter.poll_interval_seconds),
        Arc::clone(&health),
    );
    let poll_shutdown = shutdown_tx.subscribe();
    let poll_handle = tokio::spawn(async move {
        if let Err(e) = service.run(poll_shutdown).await {
            error!(error = %e, "Poll loop failed");
        }
    });

    info!("All tasks spawned — exporter is running");

    // ── 7. Wait for SIGINT ──────────────────────────────────
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("SIGINT received, initiating graceful shutdown");
        }
        // A metrics server that dies at startup (port already bound)
        // must be fatal and loud, not silently absent.
        result = metrics_handle => {
            let inner = result.context("Metrics server task panicked")?;
            return inner.context("Metrics server failed");
        }
    }

    // Mark unready first so scrapers and probes see the drain.
    health.mark_stopping();
    let _ = shutdown_tx.send(());
    info!("Shutdown signal broadcast to all tasks");

    // Let the in-flight cycle finish before exiting.
    let _ = tokio::time::timeout(Duration::from_secs(5), poll_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), health_handle).await;

    info!("Shutdown complete");
    Ok(())
}
