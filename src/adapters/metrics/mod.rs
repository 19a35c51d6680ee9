//! Metrics and Monitoring Adapters
//!
//! Provides Prometheus metrics export on the configured scrape port and
//! health check endpoints (/live, /ready) via axum. The gauge registry
//! implements the `ReadingPublisher` port.

pub mod health;
pub mod prometheus;

pub use health::{HealthServer, HealthState};
pub use prometheus::WeatherMetrics;
