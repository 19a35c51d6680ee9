//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters, and
//! providing clear error messages for misconfiguration. Invalid
//! configuration is a fatal startup error.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config: AppConfig = toml::from_str(&content)
    .with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;

  info!(
    sensors = config.sensors.names.len(),
    csv_path = %config.source.csv_path,
    interval = config.exporter.poll_interval_seconds,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Non-empty, unique sensor names
/// - Positive polling interval and staleness window
/// - Parseable bind address
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.sensors.names.is_empty(),
    "At least one sensor must be configured"
  );

  let mut seen = HashSet::new();
  for (i, name) in config.sensors.names.iter().enumerate() {
    anyhow::ensure!(!name.trim().is_empty(), "Sensor {} has an empty name", i);
    anyhow::ensure!(
      seen.insert(name.as_str()),
      "Duplicate sensor name: {}",
      name
    );
  }

  anyhow::ensure!(
    config.exporter.poll_interval_seconds > 0,
    "poll_interval_seconds must be positive, got {}",
    config.exporter.poll_interval_seconds
  );
  anyhow::ensure!(
    config.exporter.staleness_seconds > 0,
    "staleness_seconds must be positive, got {}",
    config.exporter.staleness_seconds
  );

  anyhow::ensure!(
    !config.source.csv_path.is_empty(),
    "csv_path must not be empty"
  );

  config
    .metrics
    .bind_address
    .parse::<std::net::SocketAddr>()
    .with_context(|| {
      format!(
        "metrics bind_address is not a valid socket address: {}",
        config.metrics.bind_address
      )
    })?;

  Ok(())
}
