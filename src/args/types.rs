use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Quiet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveUsize(NonZeroUsize);

impl PositiveUsize {
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<usize> for PositiveUsize {
    type Error = ValidationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        NonZeroUsize::new(value)
            .map(PositiveUsize)
            .ok_or(ValidationError::ValueTooSmall { min: 1 })
    }
}

impl std::str::FromStr for PositiveUsize {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: usize = s
            .trim()
            .parse()
            .map_err(|err| ValidationError::InvalidNumber { source: err })?;
        PositiveUsize::try_from(value)
    }
}

/// Parts per million in a whole pass rate.
const THRESHOLD_SCALE: u64 = 1_000_000;
/// Decimal places a fraction may carry at that scale.
const FRACTION_DIGITS: u32 = 6;
/// Decimal places a percentage may carry at that scale.
const PERCENT_DIGITS: u32 = 4;

/// Minimum aggregate check pass rate, held exactly in parts per million.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Threshold(u64);

impl Threshold {
    pub const ALL: Threshold = Threshold(THRESHOLD_SCALE);

    /// Build a threshold from a fraction, rounded to the nearest part per million.
    ///
    /// # Errors
    ///
    /// Returns an error unless `fraction` is finite and within `0.0..=1.0`.
    pub fn new(fraction: f64) -> Result<Self, ValidationError> {
        if fraction.is_finite() && (0.0..=1.0).contains(&fraction) {
            let scaled = (fraction * THRESHOLD_SCALE as f64).round();
            Ok(Threshold((scaled as u64).min(THRESHOLD_SCALE)))
        } else {
            Err(ValidationError::InvalidThreshold {
                value: fraction.to_string(),
            })
        }
    }

    #[must_use]
    pub const fn parts_per_million(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn fraction(self) -> f64 {
        self.0 as f64 / THRESHOLD_SCALE as f64
    }

    /// Whether `passed / total` reaches the threshold, compared on integers.
    #[must_use]
    pub fn is_met_by(self, passed: u64, total: u64) -> bool {
        u128::from(passed).saturating_mul(u128::from(THRESHOLD_SCALE))
            >= u128::from(total).saturating_mul(u128::from(self.0))
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Threshold::ALL
    }
}

impl std::str::FromStr for Threshold {
    type Err = ValidationError;

    /// Accepts `0.95` or `95%`, parsed as exact decimals.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || ValidationError::InvalidThreshold {
            value: s.to_owned(),
        };
        let scaled = match trimmed.strip_suffix('%') {
            Some(percent) => parse_scaled_decimal(percent.trim(), PERCENT_DIGITS),
            None => parse_scaled_decimal(trimmed, FRACTION_DIGITS),
        }
        .ok_or_else(invalid)?;
        if scaled > THRESHOLD_SCALE {
            return Err(invalid());
        }
        Ok(Threshold(scaled))
    }
}

/// `"12.5"` with 4 digits is `125_000`. Rejects signs, exponents and
/// more decimal places than `digits`.
fn parse_scaled_decimal(text: &str, digits: u32) -> Option<u64> {
    let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.bytes().chain(frac.bytes()).all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    let frac_len = u32::try_from(frac.len()).ok()?;
    let padding = digits.checked_sub(frac_len)?;
    let whole_value: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let frac_value: u64 = if frac.is_empty() { 0 } else { frac.parse().ok()? };
    whole_value
        .checked_mul(10u64.checked_pow(digits)?)?
        .checked_add(frac_value.checked_mul(10u64.checked_pow(padding)?)?)
}
