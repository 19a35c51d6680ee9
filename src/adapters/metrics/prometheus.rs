//! Prometheus Metrics Registry - Weather Gauge Exposition
//!
//! Registers the weather gauges and exposes them over HTTP for scraping.
//! One metric family per quantity with a `sensor_name` label, matching the
//! dashboards that already exist for this station:
//!
//! * `temperature{sensor_name=...}` - degrees Celsius
//! * `humidity{sensor_name=...}` - percent
//! * `data_age_seconds` - signed age of the newest row
//!
//! Untrustworthy readings are exported as NaN; the tri-state to NaN
//! translation happens here and nowhere else.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};
use tokio::sync::broadcast;
use tracing::info;

use crate::domain::reading::SensorReadout;
use crate::ports::publisher::ReadingPublisher;

/// Centralized Prometheus gauges for the exporter.
pub struct WeatherMetrics {
    /// Prometheus registry.
    registry: Registry,
    /// Per-sensor temperature gauge (Celsius).
    pub temperature: GaugeVec,
    /// Per-sensor humidity gauge (percent).
    pub humidity: GaugeVec,
    /// Age of the newest data row (seconds, signed).
    pub data_age_seconds: Gauge,
}

impl WeatherMetrics {
    /// Create and register all gauges.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let temperature = GaugeVec::new(
            Opts::new("temperature", "Temperature sensor in Celsius"),
            &["sensor_name"],
        )?;

        let humidity = GaugeVec::new(
            Opts::new("humidity", "Humidity sensor in percent"),
            &["sensor_name"],
        )?;

        let data_age_seconds =
            Gauge::new("data_age_seconds", "Age of the data in seconds")?;

        registry.register(Box::new(temperature.clone()))?;
        registry.register(Box::new(humidity.clone()))?;
        registry.register(Box::new(data_age_seconds.clone()))?;

        Ok(Self {
            registry,
            temperature,
            humidity,
            data_age_seconds,
        })
    }

    /// Serve the text exposition format on the configured bind address.
    ///
    /// Binding failures (port already taken) are returned to the caller
    /// and treated as fatal startup errors.
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let registry = metrics_self.registry.clone();
                async move {
                    let encoder = TextEncoder::new();
                    let metric_families = registry.gather();
                    let mut buffer = Vec::new();
                    if encoder.encode(&metric_families, &mut buffer).is_err() {
                        return String::new();
                    }
                    String::from_utf8(buffer).unwrap_or_default()
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}

impl ReadingPublisher for WeatherMetrics {
    fn publish_data_age(&self, seconds: i64) {
        // Gauges are f64; ages far beyond any realistic clock skew lose
        // precision harmlessly.
        self.data_age_seconds.set(seconds as f64);
    }

    fn publish_sensor(&self, readout: &SensorReadout) {
        self.temperature
            .with_label_values(&[&readout.sensor])
            .set(readout.temperature.as_gauge());
        self.humidity
            .with_label_values(&[&readout.sensor])
            .set(readout.humidity.as_gauge());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reading::FieldValue;

    fn gauge_value(family: &GaugeVec, sensor: &str) -> f64 {
        family.with_label_values(&[sensor]).get()
    }

    #[test]
    fn test_valid_readout_sets_gauge_values() {
        let metrics = WeatherMetrics::new().unwrap();
        metrics.publish_sensor(&SensorReadout {
            sensor: "outside".to_string(),
            temperature: FieldValue::Valid(21.5),
            humidity: FieldValue::Valid(45.0),
        });

        assert_eq!(gauge_value(&metrics.temperature, "outside"), 21.5);
        assert_eq!(gauge_value(&metrics.humidity, "outside"), 45.0);
    }

    #[test]
    fn test_invalid_and_stale_export_nan() {
        let metrics = WeatherMetrics::new().unwrap();
        metrics.publish_sensor(&SensorReadout {
            sensor: "server".to_string(),
            temperature: FieldValue::Invalid,
            humidity: FieldValue::Stale,
        });

        assert!(gauge_value(&metrics.temperature, "server").is_nan());
        assert!(gauge_value(&metrics.humidity, "server").is_nan());
    }

    #[test]
    fn test_data_age_keeps_sign() {
        let metrics = WeatherMetrics::new().unwrap();
        metrics.publish_data_age(-42);
        assert_eq!(metrics.data_age_seconds.get(), -42.0);
    }

    #[test]
    fn test_exposition_contains_all_families() {
        let metrics = WeatherMetrics::new().unwrap();
        metrics.publish_data_age(5);
        metrics.publish_sensor(&SensorReadout {
            sensor: "outside".to_string(),
            temperature: FieldValue::Valid(0.0),
            humidity: FieldValue::Valid(50.0),
        });

        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&metrics.registry.gather(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("temperature{sensor_name=\"outside\"}"));
        assert!(text.contains("humidity{sensor_name=\"outside\"}"));
        assert!(text.contains("data_age_seconds 5"));
    }
}
