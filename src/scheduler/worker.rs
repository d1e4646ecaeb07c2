use std::sync::Arc;

use tokio::time::Instant;
use tracing::{trace, warn};

use crate::{
    metrics::OutcomeSink,
    scenario::{IterationContext, Scenario},
    system::shutdown::{ShutdownReceiver, stop_requested},
};

pub(super) struct VuWorker {
    pub(super) vu_id: usize,
    pub(super) scenario: Arc<dyn Scenario>,
    pub(super) deadline: Instant,
    pub(super) shutdown_rx: ShutdownReceiver,
    pub(super) sink: OutcomeSink,
}

impl VuWorker {
    /// Loop the scenario until the deadline passes or a stop is broadcast.
    /// Both are checked between iterations only; an in-flight request is
    /// never interrupted. Returns the number of completed iterations.
    pub(super) async fn run(mut self) -> u64 {
        let mut iteration: u64 = 0;
        loop {
            if Instant::now() >= self.deadline {
                break;
            }
            if stop_requested(&mut self.shutdown_rx) {
                trace!(vu = self.vu_id, "Stop observed");
                break;
            }

            let outcome = self
                .scenario
                .execute(IterationContext {
                    vu_id: self.vu_id,
                    iteration,
                })
                .await;
            iteration = iteration.saturating_add(1);

            if !self.sink.submit(outcome).await {
                warn!(vu = self.vu_id, "Aggregator closed, stopping virtual user.");
                break;
            }

            tokio::task::yield_now().await;
        }
        iteration
    }
}
