//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates the domain evaluator with the port interfaces to
//! implement the exporter's single workflow.
//!
//! Use cases:
//! - `PollService`: load snapshot -> evaluate -> publish -> sleep

pub mod poll_service;

pub use poll_service::PollService;
