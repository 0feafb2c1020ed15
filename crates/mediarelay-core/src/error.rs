//! Error types for workflow submission.

use thiserror::Error;

/// Result alias for workflow submission.
pub type SubmitResult<T> = Result<T, SubmitError>;

/// Reasons a relay request could not be admitted.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// Every admission slot is taken.
    #[error("relay workers are saturated")]
    Saturated {
        /// Total number of runs the pool admits at once.
        capacity: usize,
    },
    /// The pool stopped accepting work.
    #[error("relay workers are shutting down")]
    ShuttingDown,
}
