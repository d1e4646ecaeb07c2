use hdrhistogram::Histogram;

use crate::error::MetricsError;

/// Latency distribution in microseconds.
#[derive(Debug)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
}

impl LatencyHistogram {
    /// Create a new latency histogram.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        let hist = Histogram::<u64>::new(3).map_err(|err| MetricsError::Histogram {
            context: "create",
            source: Box::new(err),
        })?;
        Ok(Self { hist })
    }

    /// Record a latency value in microseconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be recorded.
    pub fn record(&mut self, latency_us: u64) -> Result<(), MetricsError> {
        let value = latency_us.max(1);
        self.hist
            .record(value)
            .map_err(|err| MetricsError::Histogram {
                context: "record",
                source: Box::new(err),
            })
    }

    #[must_use]
    pub fn value_at(&self, quantile: f64) -> u64 {
        if self.hist.is_empty() {
            return 0;
        }
        self.hist.value_at_quantile(quantile)
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_histogram_reports_zero() -> Result<(), String> {
        let hist = LatencyHistogram::new().map_err(|err| err.to_string())?;
        if hist.value_at(0.99) != 0 || hist.count() != 0 {
            return Err("Expected empty histogram to report zero".to_owned());
        }
        Ok(())
    }

    #[test]
    fn percentiles_follow_recorded_values() -> Result<(), String> {
        let mut hist = LatencyHistogram::new().map_err(|err| err.to_string())?;
        for value in 1..=100u64 {
            hist.record(value.saturating_mul(1000))
                .map_err(|err| err.to_string())?;
        }
        let p50 = hist.value_at(0.5);
        let p99 = hist.value_at(0.99);
        if !(49_000..=51_000).contains(&p50) {
            return Err(format!("Unexpected p50: {}", p50));
        }
        if !(98_000..=100_100).contains(&p99) {
            return Err(format!("Unexpected p99: {}", p99));
        }
        if hist.count() != 100 {
            return Err(format!("Unexpected count: {}", hist.count()));
        }
        Ok(())
    }
}
