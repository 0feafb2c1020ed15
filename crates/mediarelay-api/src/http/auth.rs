//! Bearer-token middleware guarding the processing route.

use axum::{
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::http::constants::BEARER_PREFIX;
use crate::http::errors::ApiError;
use crate::state::ApiState;

pub(crate) async fn require_bearer(
    State(state): State<ApiState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;

    if !constant_time_eq(token.as_bytes(), state.api_key.as_bytes()) {
        warn!("rejected request with invalid API key");
        return Err(ApiError::unauthorized("invalid API key"));
    }

    Ok(next.run(req).await)
}

/// Compare two secrets without short-circuiting on the first differing byte.
fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_time_eq_matches_only_identical_secrets() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secreT"));
        assert!(!constant_time_eq(b"secret", b"secret-longer"));
        assert!(!constant_time_eq(b"", b"x"));
    }
}
