//! # Design
//!
//! - Provide structured, constant-message errors for download strategies.
//! - Capture operation context (paths, URLs, tool output) so failures are reproducible in tests.
//! - Render requester-facing text through [`FetchError::detail`], never through `Display`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for download operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors produced by download strategies.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The external downloader exited unsuccessfully.
    #[error("external downloader failed")]
    ToolFailed {
        /// Program that was executed.
        program: String,
        /// Exit code when the process exited normally.
        code: Option<i32>,
        /// Combined stdout and stderr of the process.
        output: String,
    },
    /// The external downloader could not be started.
    #[error("failed to start external downloader")]
    Spawn {
        /// Program that was executed.
        program: String,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The downloader reported success but no output file was found.
    #[error("downloaded file not found")]
    OutputMissing {
        /// Temp prefix the output was expected under.
        prefix: PathBuf,
    },
    /// The source URL could not be parsed.
    #[error("invalid source url")]
    InvalidUrl {
        /// URL as received.
        url: String,
    },
    /// Building the HTTP client failed.
    #[error("failed to build http client")]
    ClientBuild {
        /// Underlying HTTP client error.
        source: reqwest::Error,
    },
    /// The HTTP transfer failed.
    #[error("http transfer failed")]
    Http {
        /// URL used for the request.
        url: String,
        /// Underlying HTTP client error.
        source: reqwest::Error,
    },
    /// The HTTP server answered with a non-success status.
    #[error("http response status error")]
    HttpStatus {
        /// URL used for the request.
        url: String,
        /// HTTP status code returned by the server.
        status: u16,
    },
    /// Filesystem operations failed.
    #[error("download io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The run was cancelled by service shutdown.
    #[error("download cancelled")]
    Cancelled,
}

impl FetchError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Requester-facing description of the failure.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::ToolFailed { output, .. } => format!("yt-dlp failed: {}", output.trim()),
            Self::Spawn { program, source } => format!("could not start {program}: {source}"),
            Self::OutputMissing { .. } => "downloaded file not found".to_string(),
            Self::InvalidUrl { url } => format!("invalid url: {url}"),
            Self::ClientBuild { source } | Self::Http { source, .. } => {
                format!("download failed: {source}")
            }
            Self::HttpStatus { status, .. } => format!("download failed with status: {status}"),
            Self::Io { operation, .. } => format!("file system error during {operation}"),
            Self::Cancelled => "download cancelled".to_string(),
        }
    }
}
