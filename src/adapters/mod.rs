//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (file I/O, Prometheus, HTTP). Each sub-module
//! groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `csv`: station snapshot file reading and header normalization
//! - `metrics`: Prometheus metrics export and health checks

pub mod csv;
pub mod metrics;
