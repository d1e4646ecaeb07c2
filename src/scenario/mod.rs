//! Per-iteration units of work run by virtual users.
mod http;


use async_trait::async_trait;

use crate::metrics::RequestOutcome;

pub use http::{HttpScenario, HttpScenarioOptions, build_client};

/// Identifies the virtual user and iteration an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationContext {
    pub vu_id: usize,
    pub iteration: u64,
}

/// Anything a virtual user can run in a loop.
///
/// Implementations must not fail: transport problems and assertion errors
/// belong in the returned outcome.
#[async_trait]
pub trait Scenario: Send + Sync {
    async fn execute(&self, ctx: IterationContext) -> RequestOutcome;
}
