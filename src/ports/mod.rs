//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the domain/usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `RowSource`: one-shot reads of the station CSV snapshot
//! - `ReadingPublisher`: gauge writes for evaluated readings

pub mod publisher;
pub mod row_source;

pub use publisher::ReadingPublisher;
pub use row_source::{RowSource, SourceError};
