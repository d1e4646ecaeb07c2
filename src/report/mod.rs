//! Rendering the final summary and turning it into an exit status.
#[cfg(test)]
mod tests;

use std::path::Path;

use serde::Serialize;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::args::{OutputFormat, Threshold};
use crate::config::ReportConfig;
use crate::error::{AppError, AppResult, MetricsError};
use crate::metrics::{PassRate, RunSummary};

/// Exit status when the run completed but the pass rate is below the threshold.
pub const EXIT_THRESHOLD_FAILED: u8 = 99;

/// Hundredths in one percent, for integer formatting.
const PERCENT_DIVISOR: u64 = 100;
/// Parts per million in a hundredth of a percent.
const PPM_PER_HUNDREDTH: u64 = 100;
/// Microseconds per millisecond.
const US_PER_MS: u64 = 1_000;

/// Result of comparing the aggregate check pass rate against the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub rate: PassRate,
    pub threshold: Threshold,
    pub passed: bool,
}

impl Verdict {
    /// A run with no check results has nothing to fail and passes.
    #[must_use]
    pub fn evaluate(summary: &RunSummary, threshold: Threshold) -> Self {
        let rate = summary.check_pass_rate();
        let passed = rate.total == 0 || threshold.is_met_by(rate.passed, rate.total);
        Self {
            rate,
            threshold,
            passed,
        }
    }

    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        if self.passed { 0 } else { EXIT_THRESHOLD_FAILED }
    }
}

#[derive(Serialize)]
struct JsonReport<'summary> {
    #[serde(flatten)]
    summary: &'summary RunSummary,
    check_pass_rate: PassRate,
    threshold: f64,
    threshold_passed: bool,
}

impl<'summary> JsonReport<'summary> {
    const fn new(summary: &'summary RunSummary, verdict: &Verdict) -> Self {
        Self {
            summary,
            check_pass_rate: verdict.rate,
            threshold: verdict.threshold.fraction(),
            threshold_passed: verdict.passed,
        }
    }
}

/// Pretty JSON document with the summary and the threshold verdict.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(summary: &RunSummary, verdict: &Verdict) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(&JsonReport::new(summary, verdict))?)
}

#[must_use]
pub fn summary_lines(summary: &RunSummary, verdict: &Verdict) -> Vec<String> {
    let mut lines = Vec::new();
    let latency = &summary.latency;
    let rps_x100 = summary.requests_per_sec_x100();

    lines.push(format!("Started: {}", summary.started_at));
    lines.push(format!(
        "Duration: {}",
        format_micros(u64::try_from(summary.duration.as_micros()).unwrap_or(u64::MAX))
    ));
    lines.push(format!("Virtual Users: {}", summary.virtual_users));
    lines.push(format!("Total Requests: {}", summary.total_requests));
    lines.push(format!("Responses: {}", summary.responses));
    lines.push(format!(
        "Network Errors: {} (timeouts: {})",
        summary.network_errors, summary.timeouts
    ));
    lines.push(format!("Data Received: {} bytes", summary.response_bytes));
    lines.push(format!(
        "Avg RPS: {}.{:02}",
        rps_x100 / PERCENT_DIVISOR,
        rps_x100 % PERCENT_DIVISOR
    ));
    lines.push(format!(
        "Min/Avg/Max Latency: {} / {} / {}",
        format_micros(latency.min_us),
        format_micros(latency.avg_us),
        format_micros(latency.max_us)
    ));
    lines.push(format!(
        "P50/P90/P95/P99 Latency: {} / {} / {} / {}",
        format_micros(latency.p50_us),
        format_micros(latency.p90_us),
        format_micros(latency.p95_us),
        format_micros(latency.p99_us)
    ));
    if !summary.status_counts.is_empty() {
        let statuses: Vec<String> = summary
            .status_counts
            .iter()
            .map(|(status, count)| format!("{}={}", status, count))
            .collect();
        lines.push(format!("Status Codes: {}", statuses.join(", ")));
    }

    lines.push(format!(
        "Checks: {} passed, {} failed ({})",
        summary.checks_passed,
        summary.checks_failed,
        format_rate(verdict.rate)
    ));
    for check in &summary.per_check_pass_rate {
        let mark = if check.failed == 0 && check.rate.total > 0 {
            '✓'
        } else {
            '✗'
        };
        lines.push(format!(
            "  {} {}: {} ({}/{})",
            mark,
            check.name,
            format_rate(check.rate),
            check.passed,
            check.rate.total
        ));
    }

    let threshold_x100 = verdict.threshold.parts_per_million() / PPM_PER_HUNDREDTH;
    lines.push(format!(
        "Threshold: checks >= {}.{:02}% {}",
        threshold_x100 / PERCENT_DIVISOR,
        threshold_x100 % PERCENT_DIVISOR,
        if verdict.passed { "passed" } else { "FAILED" }
    ));
    lines
}

/// Names of checks that failed at least once, in reporting order.
pub fn failed_checks(summary: &RunSummary) -> impl Iterator<Item = &str> {
    summary
        .per_check_pass_rate
        .iter()
        .filter(|check| check.failed > 0)
        .map(|check| check.name.as_str())
}

/// Print the summary to stdout in the configured format.
///
/// # Errors
///
/// Returns an error if JSON output cannot be rendered.
pub fn print_report(
    summary: &RunSummary,
    verdict: &Verdict,
    format: OutputFormat,
) -> AppResult<()> {
    match format {
        OutputFormat::Text => {
            for line in summary_lines(summary, verdict) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => println!("{}", render_json(summary, verdict)?),
        OutputFormat::Quiet => {}
    }
    Ok(())
}

/// Write the JSON report to `path`.
///
/// # Errors
///
/// Returns [`MetricsError::WriteSummary`] if the file cannot be written.
pub async fn export_summary(
    path: &Path,
    summary: &RunSummary,
    verdict: &Verdict,
) -> AppResult<()> {
    let json = render_json(summary, verdict)?;
    write_file(path, json.as_bytes()).await.map_err(|err| {
        AppError::metrics(MetricsError::WriteSummary {
            path: path.display().to_string(),
            source: err,
        })
    })
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), std::io::Error> {
    let file = tokio::fs::File::create(path).await?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Print, export and judge the summary in one step.
///
/// # Errors
///
/// Returns an error if the summary cannot be rendered or exported.
pub async fn report(summary: &RunSummary, config: &ReportConfig) -> AppResult<Verdict> {
    let verdict = Verdict::evaluate(summary, config.threshold);
    print_report(summary, &verdict, config.output_format)?;
    if let Some(path) = config.summary_export.as_deref() {
        export_summary(path, summary, &verdict).await?;
    }
    Ok(verdict)
}

fn format_rate(rate: PassRate) -> String {
    rate.percent_x100().map_or_else(
        || "no data".to_owned(),
        |percent| {
            format!(
                "{}.{:02}%",
                percent / PERCENT_DIVISOR,
                percent % PERCENT_DIVISOR
            )
        },
    )
}

fn format_micros(micros: u64) -> String {
    format!("{}.{:03}ms", micros / US_PER_MS, micros % US_PER_MS)
}
