use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkErrorKind {
    Timeout,
    Connect,
    Body,
    Request,
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NetworkErrorKind::Timeout => "timeout",
            NetworkErrorKind::Connect => "connect",
            NetworkErrorKind::Body => "body",
            NetworkErrorKind::Request => "request",
        };
        f.write_str(label)
    }
}

/// A failed HTTP exchange. Recorded on the outcome, never propagated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind} error: {message}")]
pub struct NetworkError {
    pub kind: NetworkErrorKind,
    pub message: String,
}

impl NetworkError {
    #[must_use]
    pub fn new(kind: NetworkErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify a request-phase failure.
    #[must_use]
    pub fn from_request(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            NetworkErrorKind::Timeout
        } else if err.is_connect() {
            NetworkErrorKind::Connect
        } else {
            NetworkErrorKind::Request
        };
        Self::new(kind, err.to_string())
    }

    /// Classify a failure while draining the response body.
    #[must_use]
    pub fn from_body(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            NetworkErrorKind::Timeout
        } else {
            NetworkErrorKind::Body
        };
        Self::new(kind, err.to_string())
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.kind, NetworkErrorKind::Timeout)
    }
}
