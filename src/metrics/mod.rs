//! Outcome aggregation and latency histograms.
mod aggregator;
mod histogram;
mod types;


pub use aggregator::{AggregatorConfig, AggregatorHandle, OutcomeSink, spawn_aggregator};
pub use histogram::LatencyHistogram;
pub use types::{CheckRate, LatencyStats, PassRate, Progress, RequestOutcome, RunSummary};
