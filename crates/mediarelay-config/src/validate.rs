//! Field parsers applied to raw environment values.

use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Parse a TCP port in `1..=65535`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not a non-zero port.
pub fn parse_port(field: &'static str, value: &str) -> ConfigResult<u16> {
    let port = value
        .parse::<u16>()
        .map_err(|_| ConfigError::invalid(field, "not_a_port", value))?;
    if port == 0 {
        return Err(ConfigError::invalid(field, "zero", value));
    }
    Ok(port)
}

/// Parse an IP address used as the listener bind address.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not an IP address.
pub fn parse_ip(field: &'static str, value: &str) -> ConfigResult<IpAddr> {
    IpAddr::from_str(value).map_err(|_| ConfigError::invalid(field, "not_an_ip_address", value))
}

/// Parse a Telegram chat identifier; zero is rejected.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not a non-zero integer.
pub fn parse_chat_id(field: &'static str, value: &str) -> ConfigResult<i64> {
    let chat_id = value
        .parse::<i64>()
        .map_err(|_| ConfigError::invalid(field, "not_an_integer", value))?;
    if chat_id == 0 {
        return Err(ConfigError::invalid(field, "zero", value));
    }
    Ok(chat_id)
}

/// Parse a strictly positive count.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is zero or not a number.
pub fn parse_positive_usize(field: &'static str, value: &str) -> ConfigResult<usize> {
    match value.parse::<usize>() {
        Ok(0) => Err(ConfigError::invalid(field, "zero", value)),
        Ok(count) => Ok(count),
        Err(_) => Err(ConfigError::invalid(field, "not_an_integer", value)),
    }
}

/// Parse a non-negative count.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not a number.
pub fn parse_usize(field: &'static str, value: &str) -> ConfigResult<usize> {
    value
        .parse::<usize>()
        .map_err(|_| ConfigError::invalid(field, "not_an_integer", value))
}

/// Parse a strictly positive byte count.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is zero or not a number.
pub fn parse_byte_size(field: &'static str, value: &str) -> ConfigResult<u64> {
    match value.parse::<u64>() {
        Ok(0) => Err(ConfigError::invalid(field, "zero", value)),
        Ok(bytes) => Ok(bytes),
        Err(_) => Err(ConfigError::invalid(field, "not_an_integer", value)),
    }
}

/// Parse a whole number of seconds into a [`Duration`].
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not a number.
pub fn parse_secs(field: &'static str, value: &str) -> ConfigResult<Duration> {
    value
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::invalid(field, "not_an_integer", value))
}

/// Parse an absolute `http`/`https` URL.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not an HTTP(S) URL.
pub fn parse_http_url(field: &'static str, value: &str) -> ConfigResult<Url> {
    let url = Url::parse(value).map_err(|_| ConfigError::invalid(field, "not_a_url", value))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::invalid(field, "unsupported_scheme", value)),
    }
}

/// Accept only known log format names.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for anything other than `json`/`pretty`.
pub fn parse_log_format(field: &'static str, value: &str) -> ConfigResult<String> {
    let lowered = value.to_ascii_lowercase();
    match lowered.as_str() {
        "json" | "pretty" => Ok(lowered),
        _ => Err(ConfigError::invalid(field, "unknown_log_format", value)),
    }
}
