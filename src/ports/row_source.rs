//! Row Source Port - Station Snapshot Interface
//!
//! Defines the trait for reading the latest station snapshot. The file is
//! a scoped acquisition: implementors open, fully read, and release the
//! source within one `load` call, so the poll loop never holds a handle
//! across its sleep.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::snapshot::Snapshot;

/// Failure modes when acquiring a snapshot. All of them are non-fatal to
/// the poll loop; the cycle is skipped and retried on the next tick.
#[derive(Debug, Error)]
pub enum SourceError {
  /// The configured file does not exist (station has not written yet, or
  /// the ramdisk was cleared).
  #[error("snapshot file not found: {path}")]
  NotFound {
    /// Configured source path.
    path: String,
  },
  /// The file exists but could not be read.
  #[error("failed to read snapshot file: {0}")]
  Io(#[from] std::io::Error),
  /// The file could not be tokenized at all (no header line).
  #[error("malformed snapshot file: {0}")]
  Malformed(String),
}

/// Trait for station snapshot providers.
///
/// Implementors produce a fresh, immutable `Snapshot` per call. The
/// hexagonal architecture keeps the evaluator ignorant of whether rows
/// come from a ramdisk CSV, a test fixture, or a mock.
#[async_trait]
pub trait RowSource: Send + Sync {
  /// Read the latest snapshot from the underlying source.
  async fn load(&self) -> Result<Snapshot, SourceError>;
}
