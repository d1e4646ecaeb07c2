use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Histogram error during {context}: {source}")]
    Histogram {
        context: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Aggregator task failed: {source}")]
    AggregatorJoin {
        #[source]
        source: tokio::task::JoinError,
    },
    #[error("Failed to write summary to '{path}': {source}")]
    WriteSummary {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
