use super::*;
use crate::error::ValidationError;
use crate::metrics::{CheckRate, LatencyStats};
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn summary(passed: u64, failed: u64) -> RunSummary {
    let total = passed.saturating_add(failed);
    let mut status_counts = BTreeMap::new();
    if passed > 0 {
        status_counts.insert(200, passed);
    }
    if failed > 0 {
        status_counts.insert(500, failed);
    }
    let per_check_pass_rate = if total > 0 {
        vec![CheckRate {
            name: "is status 200".to_owned(),
            passed,
            failed,
            rate: PassRate::new(passed, total),
        }]
    } else {
        Vec::new()
    };
    RunSummary {
        started_at: "2026-01-01T00:00:00+00:00".to_owned(),
        duration: Duration::from_secs(2),
        virtual_users: 1,
        total_requests: total,
        responses: total,
        network_errors: 0,
        timeouts: 0,
        response_bytes: total.saturating_mul(2),
        status_counts,
        checks_passed: passed,
        checks_failed: failed,
        per_check_pass_rate,
        latency: LatencyStats {
            min_us: 1_200,
            avg_us: 2_500,
            max_us: 9_001,
            p50_us: 2_000,
            p90_us: 4_000,
            p95_us: 5_000,
            p99_us: 9_000,
        },
        requests_per_vu: vec![total],
    }
}

fn threshold(fraction: f64) -> Result<Threshold, String> {
    Threshold::new(fraction).map_err(|err| err.to_string())
}

#[test]
fn all_passing_meets_default_threshold() {
    let verdict = Verdict::evaluate(&summary(10, 0), Threshold::default());
    assert!(verdict.passed);
    assert_eq!(verdict.exit_code(), 0);
}

#[test]
fn any_failure_misses_default_threshold() {
    let verdict = Verdict::evaluate(&summary(9, 1), Threshold::default());
    assert!(!verdict.passed);
    assert_eq!(verdict.exit_code(), EXIT_THRESHOLD_FAILED);
}

#[test]
fn observed_ratio_is_compared_inclusively() -> Result<(), String> {
    let run = summary(7, 3);
    if !Verdict::evaluate(&run, threshold(0.7)?).passed {
        return Err("0.7 should meet a 0.7 threshold".to_owned());
    }
    if Verdict::evaluate(&run, threshold(0.71)?).passed {
        return Err("0.7 should miss a 0.71 threshold".to_owned());
    }
    Ok(())
}

#[test]
fn empty_run_passes() {
    let verdict = Verdict::evaluate(&summary(0, 0), Threshold::default());
    assert!(verdict.passed);
    assert_eq!(verdict.rate.fraction(), None);
}

#[test]
fn text_summary_marks_checks() {
    let run = summary(7, 3);
    let verdict = Verdict::evaluate(&run, Threshold::default());
    let lines = summary_lines(&run, &verdict);

    assert!(lines.iter().any(|line| line == "Total Requests: 10"));
    assert!(lines.iter().any(|line| line == "  ✗ is status 200: 70.00% (7/10)"));
    assert!(lines.iter().any(|line| line == "Status Codes: 200=7, 500=3"));
    assert!(lines.iter().any(|line| line == "Avg RPS: 5.00"));
    assert!(
        lines
            .iter()
            .any(|line| line == "Min/Avg/Max Latency: 1.200ms / 2.500ms / 9.001ms")
    );
    assert!(lines.iter().any(|line| line.ends_with("FAILED")));
}

#[test]
fn text_summary_reports_no_data() {
    let run = summary(0, 0);
    let verdict = Verdict::evaluate(&run, Threshold::default());
    let lines = summary_lines(&run, &verdict);

    assert!(
        lines
            .iter()
            .any(|line| line == "Checks: 0 passed, 0 failed (no data)")
    );
    assert!(!lines.iter().any(|line| line.starts_with("Status Codes")));
}

#[test]
fn failed_checks_lists_only_failures() {
    let failing = summary(1, 1);
    assert_eq!(failed_checks(&failing).collect::<Vec<_>>(), ["is status 200"]);
    let passing = summary(2, 0);
    assert_eq!(failed_checks(&passing).count(), 0);
}

#[test]
fn json_carries_summary_and_verdict() -> Result<(), String> {
    let run = summary(7, 3);
    let verdict = Verdict::evaluate(&run, threshold(0.5)?);
    let json = render_json(&run, &verdict).map_err(|err| err.to_string())?;
    let value: serde_json::Value = serde_json::from_str(&json).map_err(|err| err.to_string())?;

    if value["total_requests"] != 10 {
        return Err(format!("Unexpected total: {}", value["total_requests"]));
    }
    if value["duration_ms"] != 2000 {
        return Err(format!("Unexpected duration: {}", value["duration_ms"]));
    }
    if value["threshold_passed"] != true {
        return Err("Expected the verdict to pass".to_owned());
    }
    if value["per_check_pass_rate"][0]["rate"] != 0.7 {
        return Err(format!(
            "Unexpected rate: {}",
            value["per_check_pass_rate"][0]["rate"]
        ));
    }
    Ok(())
}

#[test]
fn export_writes_json_file() -> Result<(), String> {
    run_async_test(async {
        let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
        let path = dir.path().join("summary.json");
        let run = summary(3, 0);
        let verdict = Verdict::evaluate(&run, Threshold::default());

        export_summary(&path, &run, &verdict)
            .await
            .map_err(|err| err.to_string())?;

        let contents = std::fs::read_to_string(&path).map_err(|err| err.to_string())?;
        let value: serde_json::Value =
            serde_json::from_str(&contents).map_err(|err| err.to_string())?;
        if value["checks_passed"] != 3 {
            return Err(format!("Unexpected export: {}", contents));
        }
        Ok(())
    })
}

#[test]
fn export_to_missing_directory_fails() -> Result<(), String> {
    run_async_test(async {
        let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
        let path = dir.path().join("missing").join("summary.json");
        let run = summary(1, 0);
        let verdict = Verdict::evaluate(&run, Threshold::default());

        match export_summary(&path, &run, &verdict).await {
            Err(AppError::Metrics(MetricsError::WriteSummary { .. })) => Ok(()),
            Err(other) => Err(format!("Unexpected error: {}", other)),
            Ok(()) => Err("Expected the export to fail".to_owned()),
        }
    })
}

#[test]
fn percentage_threshold_compares_exactly() -> Result<(), String> {
    let threshold: Threshold = "33.3%".parse().map_err(|err: ValidationError| err.to_string())?;
    let met = summary(333, 667);
    let verdict = Verdict::evaluate(&met, threshold);
    if !verdict.passed {
        return Err("333/1000 should meet 33.3%".to_owned());
    }
    if !summary_lines(&met, &verdict)
        .iter()
        .any(|line| line == "Threshold: checks >= 33.30% passed")
    {
        return Err("Missing threshold line".to_owned());
    }
    if Verdict::evaluate(&summary(332, 668), threshold).passed {
        return Err("332/1000 should miss 33.3%".to_owned());
    }
    Ok(())
}
