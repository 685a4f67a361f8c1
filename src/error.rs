//! Error type shared by every fallible operation in the crate.
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NetError>;

/// Failures surfaced by the training engine and its collaborators.
///
/// Nothing here is retried internally; every variant propagates to the caller.
#[derive(Debug, Error)]
pub enum NetError {
    /// Operand dimensions are incompatible for the named operation.
    #[error("shape mismatch in {op}: {left:?} vs {right:?}")]
    ShapeMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    /// A training or model parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A data or model file row could not be interpreted.
    #[error("malformed input at line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    /// The training state machine was driven out of order.
    #[error("cannot {action} while trainer is {from}")]
    InvalidState { from: &'static str, action: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NetError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        NetError::InvalidConfiguration(reason.into())
    }

    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        NetError::MalformedInput {
            line,
            reason: reason.into(),
        }
    }
}
