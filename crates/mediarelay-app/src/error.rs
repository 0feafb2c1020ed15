//! # Design
//!
//! - Centralize application-level errors for bootstrap and serving.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration operations failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: mediarelay_config::ConfigError,
    },
    /// API server operations failed.
    #[error("api server operation failed")]
    ApiServer {
        /// Operation identifier.
        operation: &'static str,
        /// Source API server error.
        source: mediarelay_api::ApiServerError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: mediarelay_telemetry::TelemetryError,
    },
    /// Telegram operations failed.
    #[error("telegram operation failed")]
    Telegram {
        /// Operation identifier.
        operation: &'static str,
        /// Source Telegram error.
        source: mediarelay_telegram::TelegramError,
    },
    /// Download setup failed.
    #[error("download setup failed")]
    Fetch {
        /// Operation identifier.
        operation: &'static str,
        /// Source download error.
        source: mediarelay_fetch::FetchError,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: mediarelay_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn api_server(
        operation: &'static str,
        source: mediarelay_api::ApiServerError,
    ) -> Self {
        Self::ApiServer { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: mediarelay_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn telegram(
        operation: &'static str,
        source: mediarelay_telegram::TelegramError,
    ) -> Self {
        Self::Telegram { operation, source }
    }

    pub(crate) const fn fetch(
        operation: &'static str,
        source: mediarelay_fetch::FetchError,
    ) -> Self {
        Self::Fetch { operation, source }
    }
}
