//! Error types for longtext

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LongtextError>;

/// Main error type for longtext
#[derive(Debug, Error)]
pub enum LongtextError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Native backend failed: {0}")]
    Backend(#[from] BackendError),

    #[error("Protocol error for request {id}: {message}")]
    Protocol { id: u64, message: String },

    #[error("Request {id} timed out after {after:?}")]
    Timeout { id: u64, after: Duration },

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("Offloaded worker is unavailable")]
    WorkerUnavailable,

    #[error("Orchestrator terminated")]
    Terminated,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LongtextError {
    /// Failures that belong to the offloaded tier itself rather than the request.
    ///
    /// These are absorbed by falling back to the synchronous tier.
    pub fn is_tier_failure(&self) -> bool {
        matches!(self, LongtextError::WorkerUnavailable)
    }
}

/// Input rejected before any justification runs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Text cannot be empty")]
    Empty,

    #[error("Text must be a string")]
    WrongType,

    #[error("Text too large: {len} characters (max: {max})")]
    TooLarge { len: usize, max: usize },

    #[error("Invalid width budget: {0} (must be 1-{max})", max = crate::MAX_WIDTH_BUDGET)]
    InvalidWidth(u64),

    #[error("Invalid chunk size: {0}")]
    InvalidChunkSize(usize),
}

impl ValidationError {
    /// Stable machine-readable reason
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::Empty => "empty",
            ValidationError::WrongType => "wrong-type",
            ValidationError::TooLarge { .. } => "too-large",
            ValidationError::InvalidWidth(_) => "invalid-width",
            ValidationError::InvalidChunkSize(_) => "invalid-chunk-size",
        }
    }
}

/// Accelerated module failures
///
/// Never reach callers of the orchestrator: the tier boundary logs them and
/// reruns the primitive on the pure implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("Native module unavailable: {0}")]
    Unavailable(String),

    #[error("Input not supported by native module: {0}")]
    Unsupported(String),

    #[error("Native call failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasons_are_stable() {
        assert_eq!(ValidationError::Empty.reason(), "empty");
        assert_eq!(ValidationError::WrongType.reason(), "wrong-type");
        assert_eq!(
            ValidationError::TooLarge {
                len: 500_001,
                max: 500_000
            }
            .reason(),
            "too-large"
        );
        assert_eq!(ValidationError::InvalidWidth(0).reason(), "invalid-width");
    }

    #[test]
    fn test_only_worker_loss_is_a_tier_failure() {
        assert!(LongtextError::WorkerUnavailable.is_tier_failure());
        assert!(!LongtextError::Terminated.is_tier_failure());
        assert!(!LongtextError::Worker("boom".into()).is_tier_failure());
    }

    #[test]
    fn test_display_messages() {
        let err: LongtextError = ValidationError::TooLarge {
            len: 10,
            max: 5,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Invalid input: Text too large: 10 characters (max: 5)"
        );
        assert_eq!(
            ValidationError::InvalidWidth(0).to_string(),
            "Invalid width budget: 0 (must be 1-1000000)"
        );
    }
}
