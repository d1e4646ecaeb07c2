use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{Instant, Interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, MetricsError};

use super::{CheckRate, LatencyHistogram, LatencyStats, PassRate, Progress, RequestOutcome, RunSummary};

/// Bounded so a stalled collector slows workers down instead of dropping outcomes.
const OUTCOME_CHANNEL_CAPACITY: usize = 4096;

#[derive(Debug, Clone, Copy)]
pub struct AggregatorConfig {
    pub virtual_users: usize,
    pub progress_interval: Option<Duration>,
}

/// Submission side of the aggregator. Cheap to clone, one per worker.
#[derive(Debug, Clone)]
pub struct OutcomeSink {
    tx: mpsc::Sender<RequestOutcome>,
}

impl OutcomeSink {
    /// Hand an outcome to the aggregator. Returns `false` once it is gone.
    pub async fn submit(&self, outcome: RequestOutcome) -> bool {
        self.tx.send(outcome).await.is_ok()
    }
}

pub struct AggregatorHandle {
    task: JoinHandle<RunSummary>,
    progress_rx: watch::Receiver<Progress>,
}

impl AggregatorHandle {
    #[must_use]
    pub fn progress(&self) -> watch::Receiver<Progress> {
        self.progress_rx.clone()
    }

    /// Wait for every submitted outcome to be counted and build the summary.
    ///
    /// Only completes after all [`OutcomeSink`] clones have been dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the collector task panicked or was cancelled.
    pub async fn finalize(self) -> AppResult<RunSummary> {
        self.task
            .await
            .map_err(|err| AppError::metrics(MetricsError::AggregatorJoin { source: err }))
    }
}

/// Start the collector task.
///
/// # Errors
///
/// Returns an error if the latency histogram cannot be allocated.
pub fn spawn_aggregator(
    run_start: Instant,
    config: AggregatorConfig,
) -> AppResult<(OutcomeSink, AggregatorHandle)> {
    let mut state = AggregationState::new(config.virtual_users)?;
    let (tx, mut rx) = mpsc::channel::<RequestOutcome>(OUTCOME_CHANNEL_CAPACITY);
    let (progress_tx, progress_rx) = watch::channel(Progress::default());
    let started_at = chrono::Local::now().to_rfc3339();

    let task = tokio::spawn(async move {
        let mut progress_interval = config.progress_interval.map(|period| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval.reset();
            interval
        });

        loop {
            tokio::select! {
                maybe_outcome = rx.recv() => {
                    let Some(outcome) = maybe_outcome else {
                        break;
                    };
                    state.record(outcome);
                    progress_tx.send_replace(state.progress(run_start.elapsed()));
                }
                () = tick_progress(progress_interval.as_mut()) => {
                    let progress = state.progress(run_start.elapsed());
                    info!(
                        "running ({}s), {} requests, {} checks passed, {} failed",
                        progress.elapsed.as_secs(),
                        progress.total_requests,
                        progress.checks_passed,
                        progress.checks_failed
                    );
                }
            }
        }

        let duration = run_start.elapsed();
        progress_tx.send_replace(state.progress(duration));
        debug!(total = state.total_requests, "Aggregator drained");
        state.into_summary(started_at, duration)
    });

    Ok((OutcomeSink { tx }, AggregatorHandle { task, progress_rx }))
}

async fn tick_progress(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

struct CheckTally {
    name: Arc<str>,
    passed: u64,
    total: u64,
}

struct AggregationState {
    virtual_users: usize,
    total_requests: u64,
    responses: u64,
    network_errors: u64,
    timeouts: u64,
    response_bytes: u64,
    status_counts: BTreeMap<u16, u64>,
    checks_passed: u64,
    checks_failed: u64,
    checks: Vec<CheckTally>,
    check_index: HashMap<Arc<str>, usize>,
    latency_sum_us: u128,
    min_latency_us: u64,
    max_latency_us: u64,
    histogram: LatencyHistogram,
    requests_per_vu: Vec<u64>,
}

impl AggregationState {
    fn new(virtual_users: usize) -> Result<Self, MetricsError> {
        Ok(Self {
            virtual_users,
            total_requests: 0,
            responses: 0,
            network_errors: 0,
            timeouts: 0,
            response_bytes: 0,
            status_counts: BTreeMap::new(),
            checks_passed: 0,
            checks_failed: 0,
            checks: Vec::new(),
            check_index: HashMap::new(),
            latency_sum_us: 0,
            min_latency_us: u64::MAX,
            max_latency_us: 0,
            histogram: LatencyHistogram::new()?,
            requests_per_vu: vec![0; virtual_users],
        })
    }

    fn record(&mut self, outcome: RequestOutcome) {
        self.total_requests = self.total_requests.saturating_add(1);
        self.response_bytes = self.response_bytes.saturating_add(outcome.response_bytes);

        if outcome.vu_id >= self.requests_per_vu.len() {
            self.requests_per_vu
                .resize(outcome.vu_id.saturating_add(1), 0);
        }
        if let Some(count) = self.requests_per_vu.get_mut(outcome.vu_id) {
            *count = count.saturating_add(1);
        }

        if let Some(status) = outcome.status_code {
            self.responses = self.responses.saturating_add(1);
            let entry = self.status_counts.entry(status).or_insert(0);
            *entry = entry.saturating_add(1);
        }
        if let Some(error) = outcome.error.as_ref() {
            self.network_errors = self.network_errors.saturating_add(1);
            if error.is_timeout() {
                self.timeouts = self.timeouts.saturating_add(1);
            }
        }

        let latency_us = u64::try_from(outcome.latency.as_micros()).unwrap_or(u64::MAX);
        self.latency_sum_us = self.latency_sum_us.saturating_add(u128::from(latency_us));
        self.min_latency_us = self.min_latency_us.min(latency_us);
        self.max_latency_us = self.max_latency_us.max(latency_us);
        if let Err(err) = self.histogram.record(latency_us) {
            warn!("Failed to record latency: {}", err);
        }

        for result in outcome.checks {
            if result.passed {
                self.checks_passed = self.checks_passed.saturating_add(1);
            } else {
                self.checks_failed = self.checks_failed.saturating_add(1);
            }
            let index = match self.check_index.get(&result.name) {
                Some(index) => *index,
                None => {
                    let index = self.checks.len();
                    self.checks.push(CheckTally {
                        name: Arc::clone(&result.name),
                        passed: 0,
                        total: 0,
                    });
                    self.check_index.insert(result.name, index);
                    index
                }
            };
            if let Some(tally) = self.checks.get_mut(index) {
                tally.total = tally.total.saturating_add(1);
                if result.passed {
                    tally.passed = tally.passed.saturating_add(1);
                }
            }
        }
    }

    const fn progress(&self, elapsed: Duration) -> Progress {
        Progress {
            elapsed,
            total_requests: self.total_requests,
            checks_passed: self.checks_passed,
            checks_failed: self.checks_failed,
        }
    }

    fn latency_stats(&self) -> LatencyStats {
        if self.total_requests == 0 {
            return LatencyStats::default();
        }
        let avg = self
            .latency_sum_us
            .checked_div(u128::from(self.total_requests))
            .unwrap_or(0);
        LatencyStats {
            min_us: self.min_latency_us,
            avg_us: u64::try_from(avg).unwrap_or(u64::MAX),
            max_us: self.max_latency_us,
            p50_us: self.histogram.value_at(0.50),
            p90_us: self.histogram.value_at(0.90),
            p95_us: self.histogram.value_at(0.95),
            p99_us: self.histogram.value_at(0.99),
        }
    }

    fn into_summary(self, started_at: String, duration: Duration) -> RunSummary {
        let latency = self.latency_stats();
        let per_check_pass_rate = self
            .checks
            .iter()
            .map(|tally| {
                let rate = PassRate::new(tally.passed, tally.total);
                CheckRate {
                    name: tally.name.as_ref().to_owned(),
                    passed: rate.passed,
                    failed: rate.failed(),
                    rate,
                }
            })
            .collect();
        RunSummary {
            started_at,
            duration,
            virtual_users: self.virtual_users,
            total_requests: self.total_requests,
            responses: self.responses,
            network_errors: self.network_errors,
            timeouts: self.timeouts,
            response_bytes: self.response_bytes,
            status_counts: self.status_counts,
            checks_passed: self.checks_passed,
            checks_failed: self.checks_failed,
            per_check_pass_rate,
            latency,
            requests_per_vu: self.requests_per_vu,
        }
    }
}
