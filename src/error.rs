//! Error types shared across the evaluation layers

use std::time::Duration;
use thiserror::Error;

/// Failure of an external oracle call (classifier, extractor, detector).
///
/// Always recoverable: callers either substitute their documented fallback
/// or, for rule extraction only, surface it as [`EvaluationError::RuleExtraction`].
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    #[error("{oracle} timed out after {}ms", .after.as_millis())]
    Timeout {
        oracle: &'static str,
        after: Duration,
    },

    #[error("{oracle} request failed: {message}")]
    Transport {
        oracle: &'static str,
        message: String,
    },

    #[error("{oracle} returned HTTP {status}")]
    Status { oracle: &'static str, status: u16 },

    #[error("{oracle} returned a malformed response: {message}")]
    MalformedResponse {
        oracle: &'static str,
        message: String,
    },
}

impl OracleError {
    pub fn transport(oracle: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Transport {
            oracle,
            message: err.to_string(),
        }
    }

    pub fn malformed(oracle: &'static str, err: impl std::fmt::Display) -> Self {
        Self::MalformedResponse {
            oracle,
            message: err.to_string(),
        }
    }

    /// Whether retrying the same call may succeed.
    ///
    /// Timeouts are not retried: the timeout already bounds the wait.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Timeout { .. } | Self::MalformedResponse { .. } => false,
        }
    }
}

/// Request-level evaluation failure.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    #[error("rule extraction failed: {0}")]
    RuleExtraction(#[source] OracleError),

    #[error("evaluation task failed: {0}")]
    TaskFailed(String),
}

impl EvaluationError {
    /// Errors caused by what the client sent rather than by the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::InvalidArchive(_))
    }
}
