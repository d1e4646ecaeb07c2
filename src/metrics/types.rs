use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Serialize, Serializer};
use tokio::time::Instant;

use crate::checks::CheckResult;
use crate::error::NetworkError;

/// One completed iteration of a scenario.
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub vu_id: usize,
    pub iteration: u64,
    pub status_code: Option<u16>,
    pub latency: Duration,
    pub timestamp: Instant,
    pub response_bytes: u64,
    pub error: Option<NetworkError>,
    pub checks: Vec<CheckResult>,
}

/// `passed / total`, with no fraction when nothing was counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassRate {
    pub passed: u64,
    pub total: u64,
}

impl PassRate {
    #[must_use]
    pub const fn new(passed: u64, total: u64) -> Self {
        Self { passed, total }
    }

    #[must_use]
    pub const fn failed(self) -> u64 {
        self.total.saturating_sub(self.passed)
    }

    /// `None` is the "no data" marker.
    #[must_use]
    pub fn fraction(self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.passed as f64 / self.total as f64)
    }

    /// Pass rate in hundredths of a percent, for integer formatting.
    #[must_use]
    pub fn percent_x100(self) -> Option<u64> {
        if self.total == 0 {
            return None;
        }
        let scaled = u128::from(self.passed)
            .saturating_mul(10_000)
            .checked_div(u128::from(self.total))
            .unwrap_or(0);
        Some(u64::try_from(scaled).unwrap_or(u64::MAX))
    }
}

impl Serialize for PassRate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.fraction().serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckRate {
    pub name: String,
    pub passed: u64,
    pub failed: u64,
    pub rate: PassRate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LatencyStats {
    pub min_us: u64,
    pub avg_us: u64,
    pub max_us: u64,
    pub p50_us: u64,
    pub p90_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: String,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
    pub virtual_users: usize,
    pub total_requests: u64,
    pub responses: u64,
    pub network_errors: u64,
    pub timeouts: u64,
    pub response_bytes: u64,
    pub status_counts: BTreeMap<u16, u64>,
    pub checks_passed: u64,
    pub checks_failed: u64,
    pub per_check_pass_rate: Vec<CheckRate>,
    pub latency: LatencyStats,
    pub requests_per_vu: Vec<u64>,
}

impl RunSummary {
    /// Pass rate of one named check, if it ran at all.
    #[must_use]
    pub fn pass_rate(&self, name: &str) -> Option<PassRate> {
        self.per_check_pass_rate
            .iter()
            .find(|check| check.name == name)
            .map(|check| check.rate)
    }

    /// Pass rate over every check of every request.
    #[must_use]
    pub const fn check_pass_rate(&self) -> PassRate {
        PassRate::new(
            self.checks_passed,
            self.checks_passed.saturating_add(self.checks_failed),
        )
    }

    /// Requests per second over the whole run, in hundredths.
    #[must_use]
    pub fn requests_per_sec_x100(&self) -> u64 {
        let duration_ms = self.duration.as_millis().max(1);
        let scaled = u128::from(self.total_requests)
            .saturating_mul(100_000)
            .checked_div(duration_ms)
            .unwrap_or(0);
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Live counters published while the run is in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub elapsed: Duration,
    pub total_requests: u64,
    pub checks_passed: u64,
    pub checks_failed: u64,
}
