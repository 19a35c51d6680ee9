//! Configuration Module - TOML-based Exporter Configuration
//!
//! Loads and validates configuration from `config.toml`. The sensor list,
//! file path, ports, and thresholds are all externalized here - nothing
//! is hardcoded in the domain layer. The order of the sensor list fixes
//! the CSV column indices (`temp{i}` / `humidity{i}`).

pub mod loader;

use serde::Deserialize;

/// Top-level exporter configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated before
/// the exporter begins polling.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Exporter identity and polling behavior.
  pub exporter: ExporterConfig,
  /// Snapshot file location.
  pub source: SourceConfig,
  /// Ordered sensor list.
  pub sensors: SensorsConfig,
  /// Metrics and monitoring.
  pub metrics: MetricsConfig,
}

/// Exporter identity and polling behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct ExporterConfig {
  /// Human-readable exporter name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Seconds between poll cycles.
  #[serde(default = "default_poll_interval")]
  pub poll_interval_seconds: u64,
  /// Freshness window in seconds; rows older (or further in the future)
  /// than this are stale.
  #[serde(default = "default_staleness")]
  pub staleness_seconds: i64,
}

/// Snapshot file location.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
  /// Path to the CSV snapshot WeeWX writes each archive interval.
  #[serde(default = "default_csv_path")]
  pub csv_path: String,
}

/// Ordered sensor list; index i reads columns `temp{i}` / `humidity{i}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorsConfig {
  /// Sensor names, in CSV column order.
  pub names: Vec<String>,
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
  /// Health check endpoint port.
  #[serde(default = "default_health_port")]
  pub health_port: u16,
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_poll_interval() -> u64 {
  15
}

fn default_staleness() -> i64 {
  60
}

fn default_csv_path() -> String {
  "/mnt/ramdisk/weewx.csv".to_string()
}

fn default_metrics_addr() -> String {
  "0.0.0.0:8000".to_string()
}

fn default_health_port() -> u16 {
  8080
}
