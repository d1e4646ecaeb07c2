use std::time::Duration;

use super::types::{PositiveUsize, Threshold};
use crate::error::{AppError, AppResult, ValidationError};

pub(crate) fn parse_header(s: &str) -> Result<(String, String), ValidationError> {
    match s.split_once(':') {
        Some((key, value)) => {
            let key = key.trim();
            if key.is_empty() {
                return Err(ValidationError::HeaderNameEmpty {
                    value: s.to_owned(),
                });
            }
            Ok((key.to_owned(), value.trim().to_owned()))
        }
        None => Err(ValidationError::InvalidHeaderFormat {
            value: s.to_owned(),
        }),
    }
}

pub(super) fn parse_positive_usize(s: &str) -> AppResult<PositiveUsize> {
    s.parse::<PositiveUsize>().map_err(AppError::from)
}

pub(super) fn parse_threshold(s: &str) -> AppResult<Threshold> {
    s.parse::<Threshold>().map_err(AppError::from)
}

pub(crate) fn parse_status_code(s: &str) -> AppResult<u16> {
    let value: u16 = s
        .trim()
        .parse()
        .map_err(|err| AppError::validation(ValidationError::InvalidNumber { source: err }))?;
    validate_status_code(value).map_err(AppError::from)
}

pub(crate) fn validate_status_code(value: u16) -> Result<u16, ValidationError> {
    if (100..=999).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::InvalidStatusCode { value })
    }
}

/// Parses a strictly positive duration (timeouts, intervals).
pub(crate) fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    parse_duration_text(s, false).map_err(AppError::from)
}

/// Parses a run length. Zero is accepted and produces an empty run.
pub(crate) fn parse_run_duration(s: &str) -> AppResult<Duration> {
    parse_duration_text(s, true).map_err(AppError::from)
}

pub(crate) fn parse_duration_text(s: &str, allow_zero: bool) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let mut digits_len = 0usize;
    for ch in value.chars() {
        if ch.is_ascii_digit() {
            digits_len = digits_len.saturating_add(1);
        } else {
            break;
        }
    }
    if digits_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part
        .parse()
        .map_err(|err| ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => {
            let secs = number
                .checked_mul(60)
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        "h" => {
            let secs = number
                .checked_mul(60)
                .and_then(|seconds| seconds.checked_mul(60))
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        _ => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };

    if !allow_zero && duration.is_zero() {
        return Err(ValidationError::DurationZero);
    }

    Ok(duration)
}
