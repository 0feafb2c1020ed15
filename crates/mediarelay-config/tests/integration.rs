use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use mediarelay_config::{ConfigError, RelayConfig, env_keys};

fn full_environment() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        (env_keys::BOT_TOKEN, "123456:ABCDEF"),
        (env_keys::BACKUP_CHANNEL_ID, "-1001234567890"),
        (env_keys::API_KEY, "relay-key"),
        (env_keys::PORT, "8080"),
        (env_keys::BIND_ADDR, "127.0.0.1"),
        (env_keys::COOKIES_FILE, "/etc/relay/cookies.txt"),
        (env_keys::YTDLP_BIN, "/usr/local/bin/yt-dlp"),
        (env_keys::TEMP_DIR, "/var/tmp/relay"),
        (env_keys::DIRECT_FETCH_TIMEOUT_SECS, "120"),
        (env_keys::MAX_CONCURRENT_JOBS, "2"),
        (env_keys::QUEUE_DEPTH, "6"),
        (env_keys::UPLOAD_PART_BYTES, "1048576"),
        (env_keys::SHUTDOWN_GRACE_SECS, "5"),
        (env_keys::TELEGRAM_API_URL, "http://telegram-bot-api:8081"),
        (env_keys::LOG_FORMAT, "pretty"),
    ])
}

#[test]
fn full_environment_is_loaded_verbatim() -> anyhow::Result<()> {
    let env = full_environment();
    let config = RelayConfig::from_lookup(|name| env.get(name).map(ToString::to_string))?;

    assert_eq!(config.bot_token.expose(), "123456:ABCDEF");
    assert_eq!(config.backup_chat_id, -1_001_234_567_890);
    assert_eq!(config.api_key.expose(), "relay-key");
    assert_eq!(config.bind_addr, "127.0.0.1:8080".parse::<SocketAddr>()?);
    assert_eq!(config.cookies_file, PathBuf::from("/etc/relay/cookies.txt"));
    assert_eq!(config.ytdlp_bin, PathBuf::from("/usr/local/bin/yt-dlp"));
    assert_eq!(config.temp_dir, PathBuf::from("/var/tmp/relay"));
    assert_eq!(config.direct_fetch_timeout, Duration::from_secs(120));
    assert_eq!(config.max_concurrent_jobs, 2);
    assert_eq!(config.queue_depth, 6);
    assert_eq!(config.upload_part_bytes, 1_048_576);
    assert_eq!(config.shutdown_grace, Duration::from_secs(5));
    assert_eq!(
        config.telegram_api_url.as_ref().map(url::Url::as_str),
        Some("http://telegram-bot-api:8081/")
    );
    assert_eq!(config.log_format.as_deref(), Some("pretty"));
    Ok(())
}

#[test]
fn debug_output_never_leaks_secrets() -> anyhow::Result<()> {
    let env = full_environment();
    let config = RelayConfig::from_lookup(|name| env.get(name).map(ToString::to_string))?;
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("ABCDEF"));
    assert!(!rendered.contains("relay-key"));
    Ok(())
}

#[test]
fn invalid_port_is_rejected_with_value() {
    let mut env = full_environment();
    env.insert(env_keys::PORT, "not-a-port");
    let result = RelayConfig::from_lookup(|name| env.get(name).map(ToString::to_string));
    match result {
        Err(ConfigError::InvalidField {
            field, reason, value,
        }) => {
            assert_eq!(field, env_keys::PORT);
            assert_eq!(reason, "not_a_port");
            assert_eq!(value.as_deref(), Some("not-a-port"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
