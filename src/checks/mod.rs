//! Named assertions evaluated against every response.
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use crate::error::{CheckError, NetworkError};


/// What a check gets to look at. A failed exchange has no status.
#[derive(Debug, Clone, Copy)]
pub struct ResponseView<'resp> {
    status: Option<u16>,
    latency: Duration,
    body: Option<&'resp [u8]>,
    error: Option<&'resp NetworkError>,
}

impl<'resp> ResponseView<'resp> {
    #[must_use]
    pub const fn new(
        status: Option<u16>,
        latency: Duration,
        body: Option<&'resp [u8]>,
        error: Option<&'resp NetworkError>,
    ) -> Self {
        Self {
            status,
            latency,
            body,
            error,
        }
    }

    /// Status code of the response.
    ///
    /// An exchange that failed after the status line arrived, such as a
    /// truncated body, has no usable response either.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::NoResponse`] whenever the exchange failed.
    pub fn status(&self) -> Result<u16, CheckError> {
        match (self.status, self.error) {
            (_, Some(error)) => Err(CheckError::NoResponse {
                source: error.clone(),
            }),
            (Some(status), None) => Ok(status),
            (None, None) => Err(CheckError::assertion("response status missing")),
        }
    }

    /// Response body, when it was captured.
    ///
    /// # Errors
    ///
    /// Returns an error when the exchange failed or the body was not kept.
    pub fn body(&self) -> Result<&'resp [u8], CheckError> {
        if let Some(error) = self.error {
            return Err(CheckError::NoResponse {
                source: error.clone(),
            });
        }
        self.body.ok_or(CheckError::BodyUnavailable)
    }

    #[must_use]
    pub const fn latency(&self) -> Duration {
        self.latency
    }

    #[must_use]
    pub const fn error(&self) -> Option<&'resp NetworkError> {
        self.error
    }
}

type Predicate = dyn Fn(&ResponseView<'_>) -> Result<bool, CheckError> + Send + Sync;

#[derive(Clone)]
pub struct Check {
    name: Arc<str>,
    needs_body: bool,
    predicate: Arc<Predicate>,
}

impl Check {
    #[must_use]
    pub fn new<F>(name: impl Into<Arc<str>>, predicate: F) -> Self
    where
        F: Fn(&ResponseView<'_>) -> Result<bool, CheckError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            needs_body: false,
            predicate: Arc::new(predicate),
        }
    }

    /// Mark the check as reading the response body, so scenarios keep it.
    #[must_use]
    pub const fn reading_body(mut self) -> Self {
        self.needs_body = true;
        self
    }

    /// `is status <code>`
    #[must_use]
    pub fn status_is(code: u16) -> Self {
        Check::new(format!("is status {}", code), move |response| {
            Ok(response.status()? == code)
        })
    }

    /// `body contains '<fragment>'`
    #[must_use]
    pub fn body_contains(fragment: &str) -> Self {
        let needle = fragment.as_bytes().to_vec();
        Check::new(format!("body contains '{}'", fragment), move |response| {
            let body = response.body()?;
            if needle.is_empty() {
                return Ok(true);
            }
            Ok(body.windows(needle.len()).any(|window| window == needle.as_slice()))
        })
        .reading_body()
    }

    /// `latency < <ms>ms`. A failed exchange never passes.
    #[must_use]
    pub fn latency_below(limit: Duration) -> Self {
        Check::new(format!("latency < {}ms", limit.as_millis()), move |response| {
            response.status()?;
            Ok(response.latency() < limit)
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn needs_body(&self) -> bool {
        self.needs_body
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("name", &self.name)
            .field("needs_body", &self.needs_body)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: Arc<str>,
    pub passed: bool,
}

/// Run every check against `response`, in declaration order.
///
/// A predicate error or panic counts as a failed check; it is never
/// propagated. Panics are only caught in unwinding builds.
#[must_use]
pub fn evaluate(response: &ResponseView<'_>, checks: &[Check]) -> Vec<CheckResult> {
    checks
        .iter()
        .map(|check| {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| (check.predicate)(response)));
            let passed = match outcome {
                Ok(Ok(passed)) => passed,
                Ok(Err(err)) => {
                    trace!(check = %check.name, "Check errored: {}", err);
                    false
                }
                Err(_panic) => {
                    trace!(check = %check.name, "Check panicked");
                    false
                }
            };
            CheckResult {
                name: Arc::clone(&check.name),
                passed,
            }
        })
        .collect()
}

#[must_use]
pub fn any_needs_body(checks: &[Check]) -> bool {
    checks.iter().any(Check::needs_body)
}
