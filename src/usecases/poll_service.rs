//! Poll Service - The Exporter's Main Loop
//!
//! One cycle: read the snapshot through the `RowSource` port, run the
//! freshness evaluator, write the result through the `ReadingPublisher`
//! port. Then sleep for the configured interval and go again, until the
//! shutdown signal arrives.
//!
//! Every data error is non-fatal: a failed cycle is logged, the health
//! state updated, and the loop retries on the next tick. The process only
//! exits for startup failures handled in `main`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{error, info};

use crate::adapters::metrics::HealthState;
use crate::domain::evaluator::{DataFreshnessEvaluator, Evaluation};
use crate::ports::publisher::ReadingPublisher;
use crate::ports::row_source::{RowSource, SourceError};

/// Polling orchestrator owning the evaluator state.
pub struct PollService<S: RowSource, P: ReadingPublisher> {
  source: S,
  publisher: Arc<P>,
  evaluator: DataFreshnessEvaluator,
  poll_interval: Duration,
  health: Arc<HealthState>,
}

impl<S: RowSource, P: ReadingPublisher> PollService<S, P> {
  /// Create a poll service.
  pub fn new(
    source: S,
    publisher: Arc<P>,
    evaluator: DataFreshnessEvaluator,
    poll_interval: Duration,
    health: Arc<HealthState>,
  ) -> Self {
    Self {
      source,
      publisher,
      evaluator,
      poll_interval,
      health,
    }
  }

  /// Run the polling loop until shutdown.
  ///
  /// Cycles never overlap: each one runs to completion before the sleep
  /// starts, so the evaluator state needs no locking.
  pub async fn run(mut self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
    info!(
      interval_seconds = self.poll_interval.as_secs(),
      "Poll loop started"
    );

    loop {
      self.run_cycle(Utc::now().timestamp()).await;

      tokio::select! {
        biased;
        _ = shutdown_rx.recv() => {
          info!("Poll loop received shutdown signal");
          break;
        }
        () = tokio::time::sleep(self.poll_interval) => {}
      }
    }

    info!("Poll loop stopped cleanly");
    Ok(())
  }

  /// Execute one evaluation cycle against the given wall-clock time.
  ///
  /// Taking `now` as a parameter keeps the cycle deterministic for tests;
  /// the loop passes the real clock.
  pub async fn run_cycle(&mut self, now: i64) {
    let snapshot = match self.source.load().await {
      Ok(snapshot) => snapshot,
      Err(SourceError::NotFound { path }) => {
        error!(path = %path, "Snapshot file not found; skipping cycle");
        self.health.set_source_healthy(false);
        return;
      }
      Err(e) => {
        error!(error = %e, "Failed to read snapshot; skipping cycle");
        self.health.set_source_healthy(false);
        return;
      }
    };
    self.health.set_source_healthy(true);

    match self.evaluator.evaluate(&snapshot, now) {
      Evaluation::Garbage { sensors } => {
        for readout in &sensors {
          self.publisher.publish_sensor(readout);
        }
      }
      Evaluation::Rows(outcomes) => {
        for outcome in &outcomes {
          self.publisher.publish_data_age(outcome.data_age);
          for readout in &outcome.sensors {
            self.publisher.publish_sensor(readout);
          }
        }
      }
    }
  }
}
