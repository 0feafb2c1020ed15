//! Request and result DTOs shared by the relay crates.

use std::path::PathBuf;

/// A single relay job as accepted from the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    /// Source URL to fetch.
    pub url: String,
    /// Optional display name for the relayed file.
    pub custom_name: Option<String>,
    /// Identifier of the requesting user; informational only.
    pub user_id: i64,
    /// Chat that receives progress notifications and the final file.
    pub chat_id: i64,
}

impl ProcessRequest {
    /// Build a request for `url` that is delivered to `chat_id`.
    #[must_use]
    pub fn new(url: impl Into<String>, chat_id: i64) -> Self {
        Self {
            url: url.into(),
            custom_name: None,
            user_id: 0,
            chat_id,
        }
    }

    /// Attach a display name override.
    #[must_use]
    pub fn with_custom_name(mut self, name: impl Into<String>) -> Self {
        self.custom_name = Some(name.into());
        self
    }

    /// Attach the requesting user identifier.
    #[must_use]
    pub const fn with_user_id(mut self, user_id: i64) -> Self {
        self.user_id = user_id;
        self
    }

    /// Display name override, treating an empty string as absent.
    #[must_use]
    pub fn custom_name(&self) -> Option<&str> {
        self.custom_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Artifact produced by a download strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    /// Location of the downloaded file on local disk.
    pub path: PathBuf,
    /// Name presented to the recipient.
    pub file_name: String,
    /// Size of the file in bytes.
    pub size: u64,
}
