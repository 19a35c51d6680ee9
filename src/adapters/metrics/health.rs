//! Health Check Server - Liveness and Readiness Probes
//!
//! Exposes /live and /ready endpoints via axum for container health
//! checks and monitoring. Readiness reflects whether the snapshot source
//! was reachable on the last poll and flips to 503 during shutdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::sync::broadcast;
use tracing::info;

/// Shared health state polled by readiness probes.
#[derive(Debug)]
pub struct HealthState {
    /// Whether the last poll could read the snapshot file.
    source_healthy: AtomicBool,
    /// Cleared when graceful shutdown begins.
    running: AtomicBool,
}

impl HealthState {
    /// Create a new health state (healthy and running by default).
    pub fn new() -> Self {
        Self {
            source_healthy: AtomicBool::new(true),
            running: AtomicBool::new(true),
        }
    }

    /// Record the outcome of the latest snapshot read.
    pub fn set_source_healthy(&self, healthy: bool) {
        self.source_healthy.store(healthy, Ordering::Relaxed);
    }

    /// Mark the process as shutting down; readiness turns 503.
    pub fn mark_stopping(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Check if the exporter is ready to serve meaningful metrics.
    pub fn is_ready(&self) -> bool {
        self.running.load(Ordering::Relaxed) && self.source_healthy.load(Ordering::Relaxed)
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

/// Axum-based health check HTTP server.
pub struct HealthServer {
    /// Health state shared with the poll loop.
    state: Arc<HealthState>,
    /// Bind port.
    port: u16,
}

impl HealthServer {
    /// Create a new health server.
    pub fn new(state: Arc<HealthState>, port: u16) -> Self {
        Self { state, port }
    }

    /// Run the health check server until shutdown.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let app = Router::new()
            .route("/live", get(Self::liveness))
            .route("/ready", get(Self::readiness))
            .with_state(Arc::clone(&self.state));

        let addr = format!("0.0.0.0:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!(address = %addr, "Health server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }

    /// Liveness probe: always returns 200 if the process is running.
    async fn liveness() -> impl IntoResponse {
        (StatusCode::OK, "OK")
    }

    /// Readiness probe: 200 only while running with a readable source.
    async fn readiness(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
        if state.is_ready() {
            (StatusCode::OK, "READY")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_by_default() {
        assert!(HealthState::new().is_ready());
    }

    #[test]
    fn test_unreadable_source_fails_readiness() {
        let state = HealthState::new();
        state.set_source_healthy(false);
        assert!(!state.is_ready());
        state.set_source_healthy(true);
        assert!(state.is_ready());
    }

    #[test]
    fn test_stopping_fails_readiness() {
        let state = HealthState::new();
        state.mark_stopping();
        assert!(!state.is_ready());
    }
}
