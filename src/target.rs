//! Target resolution.
//!
//! The destination URI is validated once, before any virtual user starts.
//! Workers only ever see a [`ValidatedTarget`].
use std::fmt;

use url::Url;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTarget {
    url: Url,
}

impl ValidatedTarget {
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for ValidatedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Validate a raw target URI.
///
/// # Errors
///
/// Returns an error when the URI is empty, cannot be parsed, uses a scheme
/// other than `http`/`https`, or has no host.
pub fn resolve(raw: &str) -> Result<ValidatedTarget, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyTarget);
    }
    let url = Url::parse(trimmed).map_err(|err| ConfigError::InvalidTarget {
        uri: trimmed.to_owned(),
        source: err,
    })?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ConfigError::UnsupportedScheme {
                uri: trimmed.to_owned(),
                scheme: other.to_owned(),
            });
        }
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::MissingHost {
            uri: trimmed.to_owned(),
        });
    }
    Ok(ValidatedTarget { url })
}
