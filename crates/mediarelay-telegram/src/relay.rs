//! Archive-then-forward delivery of downloaded files.
//!
//! # Design
//! - Every file is uploaded exactly once, to the backup chat; the requester
//!   receives the same file by its remote reference.
//! - A backup response without a document aborts the relay before anything is
//!   sent to the requester.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use mediarelay_core::DownloadResult;
use tracing::info;

use crate::error::{RelayError, RelayResult};
use crate::messenger::{Messenger, RemoteFileRef};

const MAX_CAPTION_CHARS: usize = 1024;
const SOURCE_LABEL: &str = "🔗 Source: ";

/// Uploads files to the backup chat and forwards them to requesters.
#[derive(Clone)]
pub struct RelayUploader {
    messenger: Arc<dyn Messenger>,
    backup_chat_id: i64,
}

impl RelayUploader {
    /// Build an uploader that archives into `backup_chat_id`.
    #[must_use]
    pub fn new(messenger: Arc<dyn Messenger>, backup_chat_id: i64) -> Self {
        Self {
            messenger,
            backup_chat_id,
        }
    }

    /// Archive `result` in the backup chat, then send it to `chat_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MissingFileReference`] when the backup upload
    /// yields no document, or [`RelayError::Telegram`] when a call fails.
    pub async fn relay(
        &self,
        result: &DownloadResult,
        chat_id: i64,
        source_url: &str,
    ) -> RelayResult<RemoteFileRef> {
        let caption = backup_caption(source_url, Utc::now());
        let remote = self
            .messenger
            .send_document_file(self.backup_chat_id, &result.path, &result.file_name, &caption)
            .await
            .map_err(|source| RelayError::Telegram {
                operation: "backup upload",
                source,
            })?
            .ok_or(RelayError::MissingFileReference {
                backup_chat_id: self.backup_chat_id,
            })?;

        self.messenger
            .send_document_ref(chat_id, &remote)
            .await
            .map_err(|source| RelayError::Telegram {
                operation: "forward",
                source,
            })?;

        info!(
            chat_id,
            backup_chat_id = self.backup_chat_id,
            file_name = %result.file_name,
            size = result.size,
            "file relayed"
        );
        Ok(remote)
    }
}

/// Caption attached to archived files: source link and archive time.
#[must_use]
pub fn backup_caption(source_url: &str, at: DateTime<Utc>) -> String {
    let dated = format!("\n📅 {}", at.to_rfc3339_opts(SecondsFormat::Secs, true));
    let room = MAX_CAPTION_CHARS
        .saturating_sub(SOURCE_LABEL.chars().count() + dated.chars().count());
    let url: String = source_url.chars().take(room).collect();
    format!("{SOURCE_LABEL}{url}{dated}")
}
