//! Core reading types shared between the evaluator and the publisher.
//!
//! The central type is `FieldValue`, the tri-state result of evaluating a
//! single sensor field. Keeping "no trustworthy value" explicit (instead of
//! smuggling a NaN through an f64) lets the evaluator stay testable with
//! plain equality; the Prometheus adapter translates to the NaN gauge
//! sentinel at the boundary.

use serde::{Deserialize, Serialize};

/// Name of a sensor, as configured. Order in the configured list fixes the
/// CSV column index (`temp{i}` / `humidity{i}`).
pub type SensorName = String;

/// Result of evaluating one sensor field for one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// A value that passed every gate this cycle (or was republished from
    /// the last-known-good cache during a single-cycle garbage event).
    Valid(f64),
    /// Field missing, the literal "none" sentinel, or unparseable.
    Invalid,
    /// The whole row fell outside the freshness window.
    Stale,
}

impl FieldValue {
    /// Translate to the gauge representation: valid values pass through,
    /// everything else becomes the NaN sentinel.
    pub fn as_gauge(self) -> f64 {
        match self {
            Self::Valid(v) => v,
            Self::Invalid | Self::Stale => f64::NAN,
        }
    }

    /// Whether this field carries a trustworthy number.
    pub fn is_valid(self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Publishable state for one sensor in one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReadout {
    /// Configured sensor name (becomes the `sensor_name` label).
    pub sensor: SensorName,
    /// Temperature in Celsius, one decimal place.
    pub temperature: FieldValue,
    /// Relative humidity, integer percent.
    pub humidity: FieldValue,
}

/// Last-known-good cache entry for a single sensor.
///
/// Only values that passed validation in some prior cycle are ever stored
/// here; garbage or stale cycles never overwrite it. `None` means the
/// sensor has not produced a valid value since startup.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CachedReading {
    /// Last valid temperature (Celsius).
    pub temperature: Option<f64>,
    /// Last valid humidity (integer percent).
    pub humidity: Option<f64>,
}

impl CachedReading {
    /// Build the readout republished during a single-cycle garbage event:
    /// cached values are republished as-is, never-seen fields stay invalid.
    pub fn to_readout(self, sensor: &str) -> SensorReadout {
        SensorReadout {
            sensor: sensor.to_string(),
            temperature: self.temperature.map_or(FieldValue::Invalid, FieldValue::Valid),
            humidity: self.humidity.map_or(FieldValue::Invalid, FieldValue::Valid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_passes_through_as_gauge() {
        assert_eq!(FieldValue::Valid(21.5).as_gauge(), 21.5);
    }

    #[test]
    fn test_invalid_and_stale_become_nan() {
        assert!(FieldValue::Invalid.as_gauge().is_nan());
        assert!(FieldValue::Stale.as_gauge().is_nan());
    }

    #[test]
    fn test_empty_cache_republishes_invalid() {
        let readout = CachedReading::default().to_readout("outside");
        assert_eq!(readout.temperature, FieldValue::Invalid);
        assert_eq!(readout.humidity, FieldValue::Invalid);
    }

    #[test]
    fn test_partial_cache_republishes_what_it_has() {
        let cache = CachedReading {
            temperature: Some(18.3),
            humidity: None,
        };
        let readout = cache.to_readout("server");
        assert_eq!(readout.temperature, FieldValue::Valid(18.3));
        assert_eq!(readout.humidity, FieldValue::Invalid);
    }
}
