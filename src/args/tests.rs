use super::*;
use clap::Parser;
use std::time::Duration;

#[test]
fn parse_args_defaults_match_reference_workload() -> Result<(), String> {
    let args = RunArgs::try_parse_from(["loadcheck", "--uri", "http://localhost:3000/ok"])
        .map_err(|err| format!("Expected parse success: {}", err))?;

    if args.virtual_users.get() != 10 {
        return Err(format!("Unexpected vus: {}", args.virtual_users.get()));
    }
    if args.duration != Duration::from_secs(120) {
        return Err(format!("Unexpected duration: {:?}", args.duration));
    }
    if args.method != HttpMethod::Get {
        return Err("Expected GET".to_owned());
    }
    if args.expected_status != 200 {
        return Err("Expected status 200".to_owned());
    }
    if args.request_timeout != Duration::from_secs(30) {
        return Err("Expected 30s request timeout".to_owned());
    }
    if args.threshold != Threshold::ALL {
        return Err("Expected 100% threshold".to_owned());
    }
    Ok(())
}

#[test]
fn parse_args_vus_and_duration() -> Result<(), String> {
    let args = RunArgs::try_parse_from([
        "loadcheck",
        "--uri",
        "http://localhost",
        "--vus",
        "3",
        "-d",
        "1500ms",
    ])
    .map_err(|err| format!("Expected parse success: {}", err))?;
    if args.virtual_users.get() != 3 {
        return Err("Unexpected vus".to_owned());
    }
    if args.duration != Duration::from_millis(1500) {
        return Err(format!("Unexpected duration: {:?}", args.duration));
    }
    Ok(())
}

#[test]
fn parse_args_rejects_zero_vus() -> Result<(), String> {
    let result = RunArgs::try_parse_from(["loadcheck", "--uri", "http://localhost", "--vus", "0"]);
    if result.is_ok() {
        return Err("Expected --vus 0 to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn parse_args_accepts_zero_duration() -> Result<(), String> {
    let args = RunArgs::try_parse_from(["loadcheck", "--uri", "http://localhost", "-d", "0s"])
        .map_err(|err| format!("Expected parse success: {}", err))?;
    if !args.duration.is_zero() {
        return Err("Expected zero duration".to_owned());
    }
    Ok(())
}

#[test]
fn parse_args_rejects_zero_timeout() -> Result<(), String> {
    let result =
        RunArgs::try_parse_from(["loadcheck", "--uri", "http://localhost", "--timeout", "0"]);
    if result.is_ok() {
        return Err("Expected --timeout 0 to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn parse_args_headers_repeatable() -> Result<(), String> {
    let args = RunArgs::try_parse_from([
        "loadcheck",
        "--uri",
        "http://localhost",
        "-H",
        "Accept: application/json",
        "--header",
        "X-Trace:abc",
    ])
    .map_err(|err| format!("Expected parse success: {}", err))?;
    let expected = vec![
        ("Accept".to_owned(), "application/json".to_owned()),
        ("X-Trace".to_owned(), "abc".to_owned()),
    ];
    if args.headers != expected {
        return Err(format!("Unexpected headers: {:?}", args.headers));
    }
    Ok(())
}

#[test]
fn parse_header_rejects_missing_colon() -> Result<(), String> {
    if parse_header("NoColonHere").is_ok() {
        return Err("Expected header without colon to fail".to_owned());
    }
    if parse_header(": value").is_ok() {
        return Err("Expected empty header name to fail".to_owned());
    }
    Ok(())
}

#[test]
fn parse_threshold_accepts_fraction_and_percent() -> Result<(), String> {
    let fraction: Threshold = "0.5"
        .parse()
        .map_err(|err| format!("fraction failed: {}", err))?;
    let percent: Threshold = "50%"
        .parse()
        .map_err(|err| format!("percent failed: {}", err))?;
    if fraction != percent {
        return Err(format!("Expected equal thresholds: {:?} {:?}", fraction, percent));
    }
    if "1.5".parse::<Threshold>().is_ok() {
        return Err("Expected 1.5 to be rejected".to_owned());
    }
    if "abc%".parse::<Threshold>().is_ok() {
        return Err("Expected abc% to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn parse_duration_units() -> Result<(), String> {
    let cases = [
        ("250ms", Duration::from_millis(250)),
        ("5", Duration::from_secs(5)),
        ("2m", Duration::from_secs(120)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (input, expected) in cases {
        let parsed = parse_duration_text(input, false)
            .map_err(|err| format!("{} failed: {}", input, err))?;
        if parsed != expected {
            return Err(format!("{} parsed as {:?}", input, parsed));
        }
    }
    if parse_duration_text("10d", false).is_ok() {
        return Err("Expected unknown unit to fail".to_owned());
    }
    if parse_duration_text("0", false).is_ok() {
        return Err("Expected zero to fail when not allowed".to_owned());
    }
    Ok(())
}

#[test]
fn status_code_bounds() -> Result<(), String> {
    if validate_status_code(99).is_ok() {
        return Err("Expected 99 to be rejected".to_owned());
    }
    if validate_status_code(500).is_err() {
        return Err("Expected 500 to be accepted".to_owned());
    }
    Ok(())
}

#[test]
fn parse_threshold_is_exact_decimal() -> Result<(), String> {
    let percent: Threshold = "33.3%"
        .parse()
        .map_err(|err| format!("percent failed: {}", err))?;
    let fraction: Threshold = "0.333"
        .parse()
        .map_err(|err| format!("fraction failed: {}", err))?;
    if percent.parts_per_million() != 333_000 || percent != fraction {
        return Err(format!("Unexpected thresholds: {:?} {:?}", percent, fraction));
    }
    if !percent.is_met_by(333, 1_000) || percent.is_met_by(332, 1_000) {
        return Err("Expected an exact comparison at 333/1000".to_owned());
    }
    for rejected in ["0.1234567", "-0.5", "1e-1", ".", "100.01%"] {
        if rejected.parse::<Threshold>().is_ok() {
            return Err(format!("Expected {} to be rejected", rejected));
        }
    }
    Ok(())
}
