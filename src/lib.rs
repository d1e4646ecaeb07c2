//! Core library for the `loadcheck` CLI.
//!
//! A fixed pool of virtual users repeatedly runs a [`scenario::Scenario`]
//! against a validated target until the run duration elapses. Every
//! iteration yields a [`metrics::RequestOutcome`] carrying named check
//! results; the aggregator folds them into a [`metrics::RunSummary`] that the
//! [`report`] module renders and judges against a pass-rate threshold.
pub mod args;
pub mod checks;
pub mod config;
pub mod error;
pub mod metrics;
pub mod report;
pub mod scenario;
pub mod scheduler;
pub mod system;
pub mod target;
