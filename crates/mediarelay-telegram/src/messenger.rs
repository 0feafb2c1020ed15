//! Chat operations used by the relay pipeline.
//!
//! # Design
//! - The pipeline talks to [`Messenger`], never to the Bot API client, so runs
//!   can be exercised without network access.
//! - Identifiers cross the seam as plain integers and strings.

use std::path::Path;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId};
use tracing::debug;
use url::Url;

use crate::error::{TelegramError, TelegramResult};

/// A message that can later be edited or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    /// Chat holding the message.
    pub chat_id: i64,
    /// Message identifier within the chat.
    pub message_id: i32,
}

/// Server-side reference to an uploaded file, reusable without re-upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileRef(pub String);

/// Identity of the bot account behind the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    /// Numeric user id of the bot.
    pub id: u64,
    /// Bot username, without the leading `@`.
    pub username: Option<String>,
}

/// Chat operations needed by a relay run.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a plain text message.
    async fn send_text(&self, chat_id: i64, text: &str) -> TelegramResult<MessageRef>;

    /// Replace the text of an existing message.
    async fn edit_text(&self, message: MessageRef, text: &str) -> TelegramResult<()>;

    /// Delete an existing message.
    async fn delete(&self, message: MessageRef) -> TelegramResult<()>;

    /// Upload a local file as a document and return its remote reference, if
    /// the response carried one.
    async fn send_document_file(
        &self,
        chat_id: i64,
        path: &Path,
        file_name: &str,
        caption: &str,
    ) -> TelegramResult<Option<RemoteFileRef>>;

    /// Send a previously uploaded document by reference.
    async fn send_document_ref(&self, chat_id: i64, file: &RemoteFileRef) -> TelegramResult<()>;
}

/// [`Messenger`] backed by the teloxide Bot API client.
#[derive(Clone)]
pub struct TeloxideMessenger {
    bot: Bot,
}

impl TeloxideMessenger {
    /// Build a messenger for `token`, optionally against a self-hosted Bot API server.
    #[must_use]
    pub fn new(token: &str, api_url: Option<Url>) -> Self {
        let bot = Bot::new(token);
        let bot = match api_url {
            Some(url) => bot.set_api_url(url),
            None => bot,
        };
        Self { bot }
    }

    /// Ask the Bot API who we are; fails when the token is invalid.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError::Request`] when the call fails.
    pub async fn identity(&self) -> TelegramResult<BotIdentity> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|source| request_error("get_me", source))?;
        Ok(BotIdentity {
            id: me.user.id.0,
            username: me.user.username.clone(),
        })
    }
}

const fn request_error(operation: &'static str, source: teloxide::RequestError) -> TelegramError {
    TelegramError::Request { operation, source }
}

#[async_trait]
impl Messenger for TeloxideMessenger {
    async fn send_text(&self, chat_id: i64, text: &str) -> TelegramResult<MessageRef> {
        let message = self
            .bot
            .send_message(ChatId(chat_id), text)
            .await
            .map_err(|source| request_error("send_message", source))?;
        Ok(MessageRef {
            chat_id,
            message_id: message.id.0,
        })
    }

    async fn edit_text(&self, message: MessageRef, text: &str) -> TelegramResult<()> {
        self.bot
            .edit_message_text(
                ChatId(message.chat_id),
                MessageId(message.message_id),
                text,
            )
            .await
            .map_err(|source| request_error("edit_message_text", source))?;
        Ok(())
    }

    async fn delete(&self, message: MessageRef) -> TelegramResult<()> {
        self.bot
            .delete_message(ChatId(message.chat_id), MessageId(message.message_id))
            .await
            .map_err(|source| request_error("delete_message", source))?;
        Ok(())
    }

    async fn send_document_file(
        &self,
        chat_id: i64,
        path: &Path,
        file_name: &str,
        caption: &str,
    ) -> TelegramResult<Option<RemoteFileRef>> {
        debug!(chat_id, path = %path.display(), file_name, "uploading document");
        let document = InputFile::file(path.to_path_buf()).file_name(file_name.to_string());
        let message = self
            .bot
            .send_document(ChatId(chat_id), document)
            .caption(caption)
            .await
            .map_err(|source| request_error("send_document", source))?;
        Ok(message
            .document()
            .map(|document| RemoteFileRef(document.file.id.clone())))
    }

    async fn send_document_ref(&self, chat_id: i64, file: &RemoteFileRef) -> TelegramResult<()> {
        self.bot
            .send_document(ChatId(chat_id), InputFile::file_id(file.0.clone()))
            .await
            .map_err(|source| request_error("send_document", source))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use httpmock::prelude::*;

    const TOKEN: &str = "123456:test-token";
    const FILE_ID: &str = "BQACAgIAAx0CbackupFileId";

    fn document_message(chat_id: i64) -> String {
        format!(
            r#"{{"ok":true,"result":{{
                "message_id":42,
                "date":1567927221,
                "chat":{{"id":{chat_id},"first_name":"relay","type":"private"}},
                "document":{{
                    "file_id":"{FILE_ID}",
                    "file_unique_id":"unique-1",
                    "file_size":5,
                    "file_name":"song.mp3"
                }}
            }}}}"#
        )
    }

    fn messenger(server: &MockServer) -> anyhow::Result<TeloxideMessenger> {
        Ok(TeloxideMessenger::new(TOKEN, Some(Url::parse(&server.base_url())?)))
    }

    #[tokio::test]
    async fn uploaded_document_yields_its_file_id() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path_includes("SendDocument");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(document_message(777));
            })
            .await;
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("abc.mp3");
        tokio::fs::write(&path, b"audio").await?;

        let remote = messenger(&server)?
            .send_document_file(777, &path, "song.mp3", "caption")
            .await?;

        mock.assert_async().await;
        assert_eq!(remote, Some(RemoteFileRef(FILE_ID.to_string())));
        Ok(())
    }

    #[tokio::test]
    async fn forwarding_sends_the_file_id_without_upload() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path_includes("SendDocument")
                    .body_includes(FILE_ID);
                then.status(200)
                    .header("content-type", "application/json")
                    .body(document_message(100));
            })
            .await;

        messenger(&server)?
            .send_document_ref(100, &RemoteFileRef(FILE_ID.to_string()))
            .await?;

        mock.assert_async().await;
        Ok(())
    }
}
