use std::time::Duration;

use serde::Deserialize;

use crate::args::{HttpMethod, OutputFormat, Threshold, parse_duration_text};
use crate::error::ValidationError;

/// Contents of `loadcheck.toml` / `loadcheck.json`. Every field is optional;
/// explicit CLI flags and environment variables take precedence.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub uri: Option<String>,
    #[serde(alias = "virtual_users")]
    pub vus: Option<usize>,
    pub duration: Option<DurationValue>,
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub method: Option<HttpMethod>,
    pub headers: Option<Vec<String>>,
    pub data: Option<String>,
    pub status: Option<u16>,
    pub body_contains: Option<String>,
    pub max_latency: Option<DurationValue>,
    pub threshold: Option<ThresholdValue>,
    pub insecure: Option<bool>,
    pub output_format: Option<OutputFormat>,
    pub summary_export: Option<String>,
    pub progress_interval: Option<DurationValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self, allow_zero: bool) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 && !allow_zero {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => parse_duration_text(text, allow_zero),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ThresholdValue {
    Fraction(f64),
    Text(String),
}

impl ThresholdValue {
    pub(crate) fn to_threshold(&self) -> Result<Threshold, ValidationError> {
        match self {
            ThresholdValue::Fraction(value) => Threshold::new(*value),
            ThresholdValue::Text(text) => text.parse(),
        }
    }
}
