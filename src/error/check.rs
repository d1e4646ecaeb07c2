use thiserror::Error;

use super::NetworkError;

/// Why a check predicate could not produce a verdict.
#[derive(Debug, Clone, Error)]
pub enum CheckError {
    #[error("no response: {source}")]
    NoResponse {
        #[source]
        source: NetworkError,
    },
    #[error("response body was not captured")]
    BodyUnavailable,
    #[error("{message}")]
    Assertion { message: String },
}

impl CheckError {
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        CheckError::Assertion {
            message: message.into(),
        }
    }
}
