//! Error types for Telegram delivery.

use thiserror::Error;

/// Result alias for single Telegram calls.
pub type TelegramResult<T> = Result<T, TelegramError>;

/// Result alias for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// A single Bot API call failed.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// The Bot API rejected or failed the request.
    #[error("telegram request failed")]
    Request {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying teloxide error.
        source: teloxide::RequestError,
    },
    /// A test double or adapter refused the call.
    #[error("telegram call rejected")]
    Rejected {
        /// Operation identifier.
        operation: &'static str,
        /// Human-readable reason.
        reason: String,
    },
}

impl TelegramError {
    /// Requester-facing description of the failure.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Request { source, .. } => source.to_string(),
            Self::Rejected { reason, .. } => reason.clone(),
        }
    }
}

/// Archiving or forwarding a file failed.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The backup upload response carried no document.
    #[error("no document in backup message")]
    MissingFileReference {
        /// Backup chat the file was sent to.
        backup_chat_id: i64,
    },
    /// A Bot API call failed.
    #[error("telegram delivery failed")]
    Telegram {
        /// Relay step that failed.
        operation: &'static str,
        /// Underlying Telegram error.
        source: TelegramError,
    },
}

impl RelayError {
    /// Requester-facing description of the failure.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::MissingFileReference { .. } => "no document in backup message".to_string(),
            Self::Telegram { operation, source } => format!("{operation}: {}", source.detail()),
        }
    }
}
