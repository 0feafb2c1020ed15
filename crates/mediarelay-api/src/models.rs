//! Wire DTOs for the HTTP surface.

use mediarelay_core::ProcessRequest;
use serde::{Deserialize, Serialize};

/// Body accepted by `POST /process`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPayload {
    /// Source URL to fetch.
    pub url: String,
    /// Optional display name for the relayed file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
    /// Requesting user; informational only.
    #[serde(default)]
    pub user_id: i64,
    /// Chat that receives progress and the final file.
    pub chat_id: i64,
}

impl From<ProcessPayload> for ProcessRequest {
    fn from(payload: ProcessPayload) -> Self {
        Self {
            url: payload.url,
            custom_name: payload.custom_name,
            user_id: payload.user_id,
            chat_id: payload.chat_id,
        }
    }
}

/// Acknowledgement returned once a request is admitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessAccepted {
    /// Always `processing`.
    pub status: String,
    /// Human-readable acknowledgement.
    pub message: String,
}

impl ProcessAccepted {
    /// The standard acknowledgement body.
    #[must_use]
    pub fn started() -> Self {
        Self {
            status: "processing".to_string(),
            message: "File processing started".to_string(),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests.
    pub status: String,
    /// Current time in RFC 3339.
    pub timestamp: String,
}

/// RFC9457-style problem document returned for every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// Problem type URI.
    #[serde(rename = "type")]
    pub kind: String,
    /// Short summary of the problem class.
    pub title: String,
    /// HTTP status code.
    pub status: u16,
    /// Occurrence-specific explanation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
