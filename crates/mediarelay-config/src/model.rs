//! Typed configuration consumed by the relay service.

use std::fmt::{self, Debug, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Secret string that never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the underlying secret value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for Secret {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("Secret(***)")
    }
}

/// Validated service configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Telegram bot token.
    pub bot_token: Secret,
    /// Chat that archives every relayed file.
    pub backup_chat_id: i64,
    /// Bearer token required on `/process`.
    pub api_key: Secret,
    /// Listener address for the HTTP API.
    pub bind_addr: SocketAddr,
    /// Cookie jar handed to the external downloader.
    pub cookies_file: PathBuf,
    /// External downloader executable.
    pub ytdlp_bin: PathBuf,
    /// Scratch directory for downloaded artifacts.
    pub temp_dir: PathBuf,
    /// Client timeout for direct HTTP fetches.
    pub direct_fetch_timeout: Duration,
    /// Number of relay runs executing at once.
    pub max_concurrent_jobs: usize,
    /// Number of admitted runs allowed to wait for an execution slot.
    pub queue_depth: usize,
    /// Largest file relayed as a single upload; bigger files are split.
    pub upload_part_bytes: u64,
    /// Drain window granted to in-flight runs on shutdown.
    pub shutdown_grace: Duration,
    /// Optional Bot API server override.
    pub telegram_api_url: Option<Url>,
    /// Requested log format name (`json` or `pretty`).
    pub log_format: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_debug_is_redacted() {
        let secret = Secret::new("hunter2");
        assert_eq!(format!("{secret:?}"), "Secret(***)");
        assert_eq!(secret.expose(), "hunter2");
    }
}
