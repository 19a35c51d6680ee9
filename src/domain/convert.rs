//! Temperature unit conversion.
//!
//! WeeWX writes temperatures in Fahrenheit; the exported gauges are in
//! Celsius. Conversion rounds to one decimal place to match the precision
//! the station actually delivers.

use tracing::error;

/// Convert a Fahrenheit reading to Celsius, rounded to one decimal place.
///
/// Non-finite input (the caller passed through a NaN or infinity from an
/// upstream parse) yields NaN and an error log instead of propagating a
/// fault. By construction the caller only invokes this with an
/// already-parsed value, so this path should never fire in practice.
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    if !fahrenheit.is_finite() {
        error!(value = fahrenheit, "Invalid input for temperature conversion");
        return f64::NAN;
    }
    let celsius = (fahrenheit - 32.0) * 5.0 / 9.0;
    (celsius * 10.0).round() / 10.0
}
