//! Environment lookup and defaults for [`RelayConfig`].
//!
//! # Design
//! - All lookups go through a caller-supplied closure so tests never touch the
//!   process environment.
//! - Blank values are treated as unset; defaults apply only to optional fields.
//! - Validation happens once, at startup, and fails on the first bad field.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{RelayConfig, Secret};
use crate::validate::{
    parse_byte_size, parse_chat_id, parse_http_url, parse_ip, parse_log_format, parse_port,
    parse_positive_usize, parse_secs, parse_usize,
};

/// Environment variable names understood by the loader.
pub mod env_keys {
    /// Telegram bot token.
    pub const BOT_TOKEN: &str = "BOT_TOKEN";
    /// Backup chat identifier.
    pub const BACKUP_CHANNEL_ID: &str = "BACKUP_CHANNEL_ID";
    /// Bearer token for `/process`.
    pub const API_KEY: &str = "API_KEY";
    /// Legacy name for [`API_KEY`] kept for existing deployments.
    pub const API_KEY_LEGACY: &str = "KOYEB_API_KEY";
    /// Listener port.
    pub const PORT: &str = "PORT";
    /// Listener address.
    pub const BIND_ADDR: &str = "BIND_ADDR";
    /// Cookie jar for the external downloader.
    pub const COOKIES_FILE: &str = "COOKIES_FILE";
    /// External downloader executable.
    pub const YTDLP_BIN: &str = "YTDLP_BIN";
    /// Scratch directory.
    pub const TEMP_DIR: &str = "TEMP_DIR";
    /// Direct fetch timeout in seconds.
    pub const DIRECT_FETCH_TIMEOUT_SECS: &str = "DIRECT_FETCH_TIMEOUT_SECS";
    /// Concurrent relay runs.
    pub const MAX_CONCURRENT_JOBS: &str = "MAX_CONCURRENT_JOBS";
    /// Waiting relay runs.
    pub const QUEUE_DEPTH: &str = "QUEUE_DEPTH";
    /// Split threshold in bytes.
    pub const UPLOAD_PART_BYTES: &str = "UPLOAD_PART_BYTES";
    /// Shutdown drain window in seconds.
    pub const SHUTDOWN_GRACE_SECS: &str = "SHUTDOWN_GRACE_SECS";
    /// Optional Bot API server override.
    pub const TELEGRAM_API_URL: &str = "TELEGRAM_API_URL";
    /// Log output format.
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
}

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BIND_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_COOKIES_FILE: &str = "/app/cookies.txt";
const DEFAULT_YTDLP_BIN: &str = "yt-dlp";
const DEFAULT_TEMP_DIR: &str = "/tmp";
const DEFAULT_DIRECT_FETCH_TIMEOUT: Duration = Duration::from_secs(600);
const DEFAULT_MAX_CONCURRENT_JOBS: usize = 4;
const DEFAULT_QUEUE_DEPTH: usize = 32;
const DEFAULT_UPLOAD_PART_BYTES: u64 = 50 * 1024 * 1024;
const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

impl RelayConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a value
    /// fails validation.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a value
    /// fails validation.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);

        let bot_token = Secret::new(env.required(env_keys::BOT_TOKEN)?);
        let backup_chat_id = parse_chat_id(
            env_keys::BACKUP_CHANNEL_ID,
            &env.required(env_keys::BACKUP_CHANNEL_ID)?,
        )?;
        let api_key = match env.get(env_keys::API_KEY) {
            Some(key) => key,
            None => env
                .get(env_keys::API_KEY_LEGACY)
                .inspect(|_| debug!("using legacy API key variable"))
                .ok_or(ConfigError::MissingEnv {
                    name: env_keys::API_KEY,
                })?,
        };

        let port = env.parse_or(env_keys::PORT, DEFAULT_PORT, parse_port)?;
        let ip = env.parse_or(env_keys::BIND_ADDR, DEFAULT_BIND_ADDR, parse_ip)?;

        Ok(Self {
            bot_token,
            backup_chat_id,
            api_key: Secret::new(api_key),
            bind_addr: SocketAddr::new(ip, port),
            cookies_file: env.path_or(env_keys::COOKIES_FILE, DEFAULT_COOKIES_FILE),
            ytdlp_bin: env.path_or(env_keys::YTDLP_BIN, DEFAULT_YTDLP_BIN),
            temp_dir: env.path_or(env_keys::TEMP_DIR, DEFAULT_TEMP_DIR),
            direct_fetch_timeout: env.parse_or(
                env_keys::DIRECT_FETCH_TIMEOUT_SECS,
                DEFAULT_DIRECT_FETCH_TIMEOUT,
                parse_secs,
            )?,
            max_concurrent_jobs: env.parse_or(
                env_keys::MAX_CONCURRENT_JOBS,
                DEFAULT_MAX_CONCURRENT_JOBS,
                parse_positive_usize,
            )?,
            queue_depth: env.parse_or(env_keys::QUEUE_DEPTH, DEFAULT_QUEUE_DEPTH, parse_usize)?,
            upload_part_bytes: env.parse_or(
                env_keys::UPLOAD_PART_BYTES,
                DEFAULT_UPLOAD_PART_BYTES,
                parse_byte_size,
            )?,
            shutdown_grace: env.parse_or(
                env_keys::SHUTDOWN_GRACE_SECS,
                DEFAULT_SHUTDOWN_GRACE,
                parse_secs,
            )?,
            telegram_api_url: env
                .get(env_keys::TELEGRAM_API_URL)
                .map(|value| parse_http_url(env_keys::TELEGRAM_API_URL, &value))
                .transpose()?,
            log_format: env
                .get(env_keys::LOG_FORMAT)
                .map(|value| parse_log_format(env_keys::LOG_FORMAT, &value))
                .transpose()?,
        })
    }
}

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, name: &'static str) -> ConfigResult<String> {
        self.get(name).ok_or(ConfigError::MissingEnv { name })
    }

    fn parse_or<T>(
        &self,
        name: &'static str,
        default: T,
        parse: fn(&'static str, &str) -> ConfigResult<T>,
    ) -> ConfigResult<T> {
        self.get(name)
            .map_or(Ok(default), |value| parse(name, &value))
    }

    fn path_or(&self, name: &str, default: &str) -> PathBuf {
        PathBuf::from(self.get(name).unwrap_or_else(|| default.to_string()))
    }
}
