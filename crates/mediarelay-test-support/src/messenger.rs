//! In-memory [`Messenger`] that records every call.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use mediarelay_telegram::{MessageRef, Messenger, RemoteFileRef, TelegramError, TelegramResult};

/// A call observed by [`RecordingMessenger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessengerCall {
    /// `send_text` succeeded.
    SendText {
        /// Target chat.
        chat_id: i64,
        /// Message text.
        text: String,
        /// Identifier handed back to the caller.
        message_id: i32,
    },
    /// `edit_text` succeeded.
    EditText {
        /// Edited message.
        message: MessageRef,
        /// Replacement text.
        text: String,
    },
    /// `delete` succeeded.
    Delete {
        /// Deleted message.
        message: MessageRef,
    },
    /// `send_document_file` succeeded.
    UploadFile {
        /// Target chat.
        chat_id: i64,
        /// Display name of the document.
        file_name: String,
        /// Caption attached to the document.
        caption: String,
        /// Size of the local file at upload time, if it existed.
        size: Option<u64>,
    },
    /// `send_document_ref` succeeded.
    SendRef {
        /// Target chat.
        chat_id: i64,
        /// Remote file reference that was sent.
        file_id: String,
    },
}

/// Calls that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// Fail `send_text`.
    SendText,
    /// Fail `edit_text`.
    EditText,
    /// Fail `delete`.
    Delete,
    /// Fail `send_document_file`.
    UploadFile,
    /// Make `send_document_file` succeed without a document.
    UploadWithoutDocument,
    /// Fail `send_document_ref`.
    SendRef,
}

/// Recording chat double with injectable failures.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    calls: Mutex<Vec<MessengerCall>>,
    failures: Mutex<HashSet<FailPoint>>,
    next_message_id: AtomicI32,
    next_file_id: AtomicI32,
}

impl RecordingMessenger {
    /// Create a messenger with no failures configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `point` fail from now on.
    #[must_use]
    pub fn failing_on(self, point: FailPoint) -> Self {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(point);
        }
        self
    }

    /// All successful calls in order.
    #[must_use]
    pub fn calls(&self) -> Vec<MessengerCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Texts passed to `send_text`, in order.
    #[must_use]
    pub fn sent_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MessengerCall::SendText { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Texts passed to `edit_text`, in order.
    #[must_use]
    pub fn edited_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MessengerCall::EditText { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn fails(&self, point: FailPoint) -> bool {
        self.failures
            .lock()
            .is_ok_and(|failures| failures.contains(&point))
    }

    fn record(&self, call: MessengerCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn rejected(operation: &'static str) -> TelegramError {
        TelegramError::Rejected {
            operation,
            reason: format!("{operation} rejected by test double"),
        }
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, chat_id: i64, text: &str) -> TelegramResult<MessageRef> {
        if self.fails(FailPoint::SendText) {
            return Err(Self::rejected("send_message"));
        }
        let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.record(MessengerCall::SendText {
            chat_id,
            text: text.to_string(),
            message_id,
        });
        Ok(MessageRef {
            chat_id,
            message_id,
        })
    }

    async fn edit_text(&self, message: MessageRef, text: &str) -> TelegramResult<()> {
        if self.fails(FailPoint::EditText) {
            return Err(Self::rejected("edit_message_text"));
        }
        self.record(MessengerCall::EditText {
            message,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn delete(&self, message: MessageRef) -> TelegramResult<()> {
        if self.fails(FailPoint::Delete) {
            return Err(Self::rejected("delete_message"));
        }
        self.record(MessengerCall::Delete { message });
        Ok(())
    }

    async fn send_document_file(
        &self,
        chat_id: i64,
        path: &Path,
        file_name: &str,
        caption: &str,
    ) -> TelegramResult<Option<RemoteFileRef>> {
        if self.fails(FailPoint::UploadFile) {
            return Err(Self::rejected("send_document"));
        }
        let size = tokio::fs::metadata(path).await.ok().map(|meta| meta.len());
        self.record(MessengerCall::UploadFile {
            chat_id,
            file_name: file_name.to_string(),
            caption: caption.to_string(),
            size,
        });
        if self.fails(FailPoint::UploadWithoutDocument) {
            return Ok(None);
        }
        let file_id = self.next_file_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Some(RemoteFileRef(format!("file-{file_id}"))))
    }

    async fn send_document_ref(&self, chat_id: i64, file: &RemoteFileRef) -> TelegramResult<()> {
        if self.fails(FailPoint::SendRef) {
            return Err(Self::rejected("send_document"));
        }
        self.record(MessengerCall::SendRef {
            chat_id,
            file_id: file.0.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_and_hands_out_increasing_ids() -> Result<(), TelegramError> {
        let messenger = RecordingMessenger::new();
        let first = messenger.send_text(5, "a").await?;
        let second = messenger.send_text(5, "b").await?;
        assert_eq!(first.message_id, 1);
        assert_eq!(second.message_id, 2);
        messenger.edit_text(first, "a2").await?;
        assert_eq!(messenger.sent_texts(), ["a", "b"]);
        assert_eq!(messenger.edited_texts(), ["a2"]);
        Ok(())
    }

    #[tokio::test]
    async fn configured_failures_are_returned() {
        let messenger = RecordingMessenger::new().failing_on(FailPoint::SendText);
        assert!(messenger.send_text(1, "x").await.is_err());
        assert!(messenger.calls().is_empty());
    }
}
