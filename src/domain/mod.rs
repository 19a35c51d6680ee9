//! Domain layer - Core evaluation logic and models.
//!
//! This module contains the pure decision logic for the WeeWX exporter.
//! No I/O allowed here (hexagonal architecture inner ring): the evaluator
//! takes an already-read snapshot plus a wall-clock instant and returns
//! what should be published. All types are testable in isolation.

pub mod convert;
pub mod evaluator;
pub mod reading;
pub mod snapshot;

// Re-export core types for convenience
pub use convert::fahrenheit_to_celsius;
pub use evaluator::{DataFreshnessEvaluator, Evaluation, RowOutcome};
pub use reading::{FieldValue, SensorReadout};
pub use snapshot::{Row, Snapshot};
