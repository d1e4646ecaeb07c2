//! Virtual-user scheduling.
//!
//! A fixed pool of workers, one per virtual user, all bound to the same
//! deadline and the same scenario. Workers only share the outcome stream.
mod worker;


use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::{
    config::ScenarioConfig,
    error::{AppError, AppResult, ValidationError},
    metrics::{AggregatorConfig, RunSummary, spawn_aggregator},
    scenario::Scenario,
    system::shutdown::{ShutdownReceiver, ShutdownSender, stop_requested},
};

use worker::VuWorker;

pub struct Scheduler {
    config: ScenarioConfig,
    shutdown_tx: ShutdownSender,
    shutdown_rx: ShutdownReceiver,
    progress_interval: Option<Duration>,
}

impl Scheduler {
    /// Subscribes to `shutdown_tx` right away, so a stop sent any time
    /// after construction is seen by the run.
    #[must_use]
    pub fn new(config: ScenarioConfig, shutdown_tx: ShutdownSender) -> Self {
        let shutdown_rx = shutdown_tx.subscribe();
        Self {
            config,
            shutdown_tx,
            shutdown_rx,
            progress_interval: None,
        }
    }

    /// Log live counters at this interval while the run is in progress.
    #[must_use]
    pub const fn with_progress_interval(mut self, interval: Option<Duration>) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Run every virtual user until the deadline or a stop signal, then
    /// return the finalized summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the deadline overflows or the aggregator cannot
    /// be started.
    pub async fn start(mut self, scenario: Arc<dyn Scenario>) -> AppResult<RunSummary> {
        let virtual_users = self.config.virtual_users.get();
        let run_start = Instant::now();
        let deadline = run_start
            .checked_add(self.config.duration)
            .ok_or_else(|| AppError::validation(ValidationError::DurationOverflow))?;

        let (sink, aggregator) = spawn_aggregator(
            run_start,
            AggregatorConfig {
                virtual_users,
                progress_interval: self.progress_interval,
            },
        )?;

        info!(
            vus = virtual_users,
            duration_ms = u64::try_from(self.config.duration.as_millis()).unwrap_or(u64::MAX),
            target = %self.config.target,
            "Starting run"
        );

        // Workers subscribe before the early-stop check; a stop sent after
        // it reaches them, one sent before it is caught here.
        let mut receivers: Vec<ShutdownReceiver> = (0..virtual_users)
            .map(|_| self.shutdown_tx.subscribe())
            .collect();
        if stop_requested(&mut self.shutdown_rx) {
            info!("Stop requested before the run started");
            receivers.clear();
        }

        let mut handles = Vec::with_capacity(receivers.len());
        for (vu_id, shutdown_rx) in receivers.into_iter().enumerate() {
            let worker = VuWorker {
                vu_id,
                scenario: Arc::clone(&scenario),
                deadline,
                shutdown_rx,
                sink: sink.clone(),
            };
            handles.push(tokio::spawn(worker.run()));
        }
        drop(sink);

        let mut iterations: u64 = 0;
        for handle in handles {
            match handle.await {
                Ok(count) => iterations = iterations.saturating_add(count),
                Err(err) => warn!("Virtual user task failed: {}", err),
            }
        }
        // Lets the signal task and anything else listening wind down.
        drop(self.shutdown_tx.send(()));

        let summary = aggregator.finalize().await?;
        info!(
            iterations,
            requests = summary.total_requests,
            elapsed_ms = u64::try_from(summary.duration.as_millis()).unwrap_or(u64::MAX),
            "Run finished"
        );
        Ok(summary)
    }
}
