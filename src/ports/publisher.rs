//! Reading Publisher Port - Gauge Write Interface
//!
//! Defines the trait the poll loop drives to publish evaluated readings.
//! The tri-state `FieldValue` crosses this boundary intact; translating
//! `Invalid`/`Stale` into the publishing system's NaN sentinel is the
//! implementor's job.

use crate::domain::reading::SensorReadout;

/// Trait for gauge-publishing backends.
///
/// Gauge writes are synchronous and infallible by design: the Prometheus
/// client mutates in-process atomics, and a mock in tests just records
/// calls.
pub trait ReadingPublisher: Send + Sync {
  /// Publish the data-age gauge (seconds, signed).
  fn publish_data_age(&self, seconds: i64);

  /// Publish one sensor's temperature and humidity gauges.
  fn publish_sensor(&self, readout: &SensorReadout);
}
