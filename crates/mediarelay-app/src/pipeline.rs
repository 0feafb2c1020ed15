//! One relay run: notify, download, relay, clean up.
//!
//! # Design
//! - A single progress message is created per run and edited in place; on
//!   success it is deleted and replaced by a completion message.
//! - Download failures are written into the progress message; relay failures
//!   are sent as a new message and leave the progress message at "uploading".
//! - Every scratch file the run produced is owned by [`TempArtifacts`] and is
//!   removed when the run ends, whatever the outcome.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use mediarelay_core::{JobId, Platform, ProcessRequest, classify};
use mediarelay_fetch::{
    DownloadContext, FetchError, StrategySet, TempPaths, remove_quietly, split_into_parts,
};
use mediarelay_telegram::{MessageRef, Messenger, RelayError, RelayUploader, TelegramError};
use mediarelay_telemetry::{JobOutcome, Metrics};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub(crate) const MSG_DOWNLOADING: &str = "⏳ Downloading...";
pub(crate) const MSG_UPLOADING: &str = "📤 Uploading...";
pub(crate) const MSG_DONE: &str = "✅ File sent successfully";
const MAX_MESSAGE_CHARS: usize = 4096;
const ELLIPSIS: char = '…';

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutcome {
    /// Display name of the relayed file.
    pub file_name: String,
    /// Number of documents delivered.
    pub parts: usize,
    /// Total bytes delivered.
    pub bytes: u64,
}

/// Reasons a run ended before delivering the file.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The initial progress message could not be sent.
    #[error("progress notification failed")]
    Notify {
        /// Underlying Telegram error.
        source: TelegramError,
    },
    /// The download strategy failed.
    #[error("download failed")]
    Download {
        /// Platform the URL was classified as.
        platform: Platform,
        /// Underlying download error.
        source: FetchError,
    },
    /// Splitting an oversize download failed.
    #[error("splitting download failed")]
    Split {
        /// Underlying download error.
        source: FetchError,
    },
    /// Archiving or forwarding a part failed.
    #[error("relay failed")]
    Relay {
        /// One-based index of the part that failed.
        part: usize,
        /// Underlying relay error.
        source: RelayError,
    },
}

impl PipelineError {
    /// Metric label for the terminal state this error represents.
    #[must_use]
    pub const fn outcome(&self) -> JobOutcome {
        match self {
            Self::Notify { .. } => JobOutcome::NotifyFailed,
            Self::Download {
                source: FetchError::Cancelled,
                ..
            } => JobOutcome::Cancelled,
            Self::Download { .. } => JobOutcome::DownloadFailed,
            Self::Split { .. } | Self::Relay { .. } => JobOutcome::UploadFailed,
        }
    }

    /// Requester-facing description of the failure.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Notify { source } => source.detail(),
            Self::Download { source, .. } | Self::Split { source } => source.detail(),
            Self::Relay { source, .. } => source.detail(),
        }
    }
}

/// Scratch files produced by one run, removed on drop.
#[derive(Debug, Default)]
struct TempArtifacts {
    paths: Vec<PathBuf>,
}

impl TempArtifacts {
    fn track(&mut self, path: PathBuf) {
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    async fn remove_all(&mut self) {
        for path in self.paths.drain(..) {
            remove_quietly(&path).await;
        }
    }
}

impl Drop for TempArtifacts {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "removed temp artifact"),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => {
                    warn!(error = %err, path = %path.display(), "failed to remove temp artifact");
                }
            }
        }
    }
}

/// Executes relay runs against shared strategies and chat client.
pub struct RelayPipeline {
    messenger: Arc<dyn Messenger>,
    strategies: StrategySet,
    uploader: RelayUploader,
    temp: TempPaths,
    part_bytes: u64,
    metrics: Metrics,
}

impl RelayPipeline {
    /// Assemble a pipeline; files larger than `part_bytes` are relayed in parts.
    #[must_use]
    pub fn new(
        messenger: Arc<dyn Messenger>,
        strategies: StrategySet,
        backup_chat_id: i64,
        temp: TempPaths,
        part_bytes: u64,
        metrics: Metrics,
    ) -> Self {
        let uploader = RelayUploader::new(Arc::clone(&messenger), backup_chat_id);
        Self {
            messenger,
            strategies,
            uploader,
            temp,
            part_bytes,
            metrics,
        }
    }

    /// Chat client shared with the owner of the run.
    #[must_use]
    pub fn messenger(&self) -> Arc<dyn Messenger> {
        Arc::clone(&self.messenger)
    }

    /// Run `request` to completion.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] describing the step that ended the run; the
    /// requester has already been told about download and relay failures.
    pub async fn run(
        &self,
        job_id: JobId,
        request: &ProcessRequest,
        cancel: CancellationToken,
    ) -> Result<RelayOutcome, PipelineError> {
        let chat_id = request.chat_id;
        let progress = self
            .messenger
            .send_text(chat_id, MSG_DOWNLOADING)
            .await
            .map_err(|source| PipelineError::Notify { source })?;

        let mut artifacts = TempArtifacts::default();
        let platform = classify(&request.url);
        let strategy = self.strategies.select(platform);
        info!(%job_id, %platform, strategy = strategy.name(), "download starting");

        let ctx = DownloadContext {
            platform,
            cancel,
            temp: self.temp.clone(),
        };
        let download = match strategy
            .download(&ctx, &request.url, request.custom_name())
            .await
        {
            Ok(download) => {
                self.metrics.inc_download(platform.as_str(), true);
                download
            }
            Err(source) => {
                self.metrics.inc_download(platform.as_str(), false);
                let text = failure_text("❌ Download failed: ", &source.detail());
                self.edit_progress(progress, &text).await;
                return Err(PipelineError::Download { platform, source });
            }
        };
        artifacts.track(download.path.clone());

        self.edit_progress(progress, MSG_UPLOADING).await;

        let parts = match split_into_parts(&download, self.part_bytes).await {
            Ok(parts) => parts,
            Err(source) => {
                let text = failure_text("❌ Upload failed: ", &source.detail());
                self.notify(chat_id, &text).await;
                return Err(PipelineError::Split { source });
            }
        };
        for part in &parts {
            artifacts.track(part.path.clone());
        }
        if parts.len() > 1 {
            self.notify(
                chat_id,
                &format!("📦 File is large; sending {} parts", parts.len()),
            )
            .await;
        }

        let mut bytes = 0_u64;
        for (index, part) in parts.iter().enumerate() {
            if let Err(source) = self.uploader.relay(part, chat_id, &request.url).await {
                let text = failure_text("❌ Upload failed: ", &source.detail());
                self.notify(chat_id, &text).await;
                return Err(PipelineError::Relay {
                    part: index + 1,
                    source,
                });
            }
            self.metrics.add_bytes_relayed(part.size);
            bytes += part.size;
        }

        artifacts.remove_all().await;
        if let Err(err) = self.messenger.delete(progress).await {
            warn!(error = %err, detail = %err.detail(), "failed to delete progress message");
        }
        self.notify(chat_id, MSG_DONE).await;

        Ok(RelayOutcome {
            file_name: download.file_name,
            parts: parts.len(),
            bytes,
        })
    }

    async fn edit_progress(&self, progress: MessageRef, text: &str) {
        if let Err(err) = self.messenger.edit_text(progress, text).await {
            warn!(error = %err, detail = %err.detail(), "failed to edit progress message");
        }
    }

    async fn notify(&self, chat_id: i64, text: &str) {
        if let Err(err) = self.messenger.send_text(chat_id, text).await {
            warn!(error = %err, detail = %err.detail(), chat_id, "failed to send notification");
        }
    }
}

/// Chat text for a failure, keeping the end of `detail` when the whole text
/// exceeds the message limit.
fn failure_text(prefix: &str, detail: &str) -> String {
    let prefix_chars = prefix.chars().count();
    let detail_chars = detail.chars().count();
    if prefix_chars + detail_chars <= MAX_MESSAGE_CHARS {
        return format!("{prefix}{detail}");
    }
    let keep = MAX_MESSAGE_CHARS.saturating_sub(prefix_chars + 1);
    let tail: String = detail.chars().skip(detail_chars - keep).collect();
    format!("{prefix}{ELLIPSIS}{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::Duration;

    use httpmock::prelude::*;
    use mediarelay_fetch::{CommandRunner, YtDlpSettings};
    use mediarelay_test_support::{FailPoint, MessengerCall, RecordingMessenger, ScriptedRunner};

    const BACKUP: i64 = -1_000;

    fn pipeline(
        messenger: Arc<RecordingMessenger>,
        runner: Arc<dyn CommandRunner>,
        dir: &Path,
        part_bytes: u64,
    ) -> anyhow::Result<(RelayPipeline, Metrics)> {
        let settings = YtDlpSettings {
            program: PathBuf::from("yt-dlp"),
            cookies_file: PathBuf::from("/app/cookies.txt"),
        };
        let strategies = StrategySet::standard(&settings, runner, Duration::from_secs(5))?;
        let metrics = Metrics::new()?;
        let pipeline = RelayPipeline::new(
            messenger,
            strategies,
            BACKUP,
            TempPaths::new(dir),
            part_bytes,
            metrics.clone(),
        );
        Ok((pipeline, metrics))
    }

    async fn dir_is_empty(dir: &Path) -> anyhow::Result<bool> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        Ok(entries.next_entry().await?.is_none())
    }

    #[tokio::test]
    async fn youtube_request_is_archived_then_forwarded() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let messenger = Arc::new(RecordingMessenger::new());
        let runner = ScriptedRunner::producing("mp3", b"audio-bytes");
        let (pipeline, metrics) =
            pipeline(messenger.clone(), runner.clone(), dir.path(), 1024)?;
        let request = ProcessRequest::new("https://youtube.com/watch?v=x", 100).with_user_id(1);

        let outcome = pipeline
            .run(JobId::new_v4(), &request, CancellationToken::new())
            .await?;

        assert_eq!(outcome.parts, 1);
        assert_eq!(outcome.bytes, 11);
        assert!(outcome.file_name.ends_with(".mp3"));
        assert!(runner.calls()[0].contains(&"--extract-audio".to_string()));

        let calls = messenger.calls();
        let progress = MessageRef {
            chat_id: 100,
            message_id: 1,
        };
        assert_eq!(
            calls[0],
            MessengerCall::SendText {
                chat_id: 100,
                text: MSG_DOWNLOADING.to_string(),
                message_id: 1,
            }
        );
        assert_eq!(
            calls[1],
            MessengerCall::EditText {
                message: progress,
                text: MSG_UPLOADING.to_string(),
            }
        );
        match &calls[2] {
            MessengerCall::UploadFile {
                chat_id,
                caption,
                size,
                ..
            } => {
                assert_eq!(*chat_id, BACKUP);
                assert!(caption.starts_with("🔗 Source: https://youtube.com/watch?v=x"));
                assert_eq!(*size, Some(11));
            }
            other => panic!("expected backup upload, got {other:?}"),
        }
        assert_eq!(
            calls[3],
            MessengerCall::SendRef {
                chat_id: 100,
                file_id: "file-1".to_string(),
            }
        );
        assert_eq!(calls[4], MessengerCall::Delete { message: progress });
        assert_eq!(messenger.sent_texts().last().map(String::as_str), Some(MSG_DONE));

        assert!(dir_is_empty(dir.path()).await?);
        assert_eq!(metrics.snapshot().bytes_relayed_total, 11);
        Ok(())
    }

    #[tokio::test]
    async fn tool_failure_is_written_into_progress_message() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let messenger = Arc::new(RecordingMessenger::new());
        let runner = ScriptedRunner::failing("ERROR: Sign in to confirm your age");
        let (pipeline, _) = pipeline(messenger.clone(), runner, dir.path(), 1024)?;
        let request = ProcessRequest::new("https://youtu.be/x", 100);

        let outcome = pipeline
            .run(JobId::new_v4(), &request, CancellationToken::new())
            .await;

        match outcome {
            Err(err @ PipelineError::Download { .. }) => {
                assert_eq!(err.outcome(), JobOutcome::DownloadFailed);
            }
            other => panic!("expected download failure, got {other:?}"),
        }
        let edits = messenger.edited_texts();
        assert_eq!(edits.len(), 1);
        assert!(edits[0].contains("ERROR: Sign in to confirm your age"));
        assert!(
            !messenger
                .calls()
                .iter()
                .any(|call| matches!(call, MessengerCall::UploadFile { .. }))
        );
        assert!(dir_is_empty(dir.path()).await?);
        Ok(())
    }

    #[tokio::test]
    async fn long_tool_output_is_cut_to_the_message_limit() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let messenger = Arc::new(RecordingMessenger::new());
        let output = format!(
            "{}ERROR: [youtube] x: Video unavailable",
            "WARNING: [youtube] retrying fragment 12 of 340\n".repeat(200)
        );
        let runner = ScriptedRunner::failing(&output);
        let (pipeline, _) = pipeline(messenger.clone(), runner, dir.path(), 1024)?;
        let request = ProcessRequest::new("https://youtu.be/x", 100);

        let outcome = pipeline
            .run(JobId::new_v4(), &request, CancellationToken::new())
            .await;

        assert!(matches!(outcome, Err(PipelineError::Download { .. })));
        let edits = messenger.edited_texts();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].chars().count(), MAX_MESSAGE_CHARS);
        assert!(edits[0].starts_with("❌ Download failed: …"));
        assert!(edits[0].ends_with("ERROR: [youtube] x: Video unavailable"));
        Ok(())
    }

    #[test]
    fn short_failure_text_is_unchanged() {
        assert_eq!(
            failure_text("❌ Upload failed: ", "file too large"),
            "❌ Upload failed: file too large"
        );
    }

    #[tokio::test]
    async fn direct_fetch_status_error_reports_the_code() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/file.zip");
                then.status(404);
            })
            .await;
        let dir = tempfile::tempdir()?;
        let messenger = Arc::new(RecordingMessenger::new());
        let runner = ScriptedRunner::producing("mp3", b"unused");
        let (pipeline, _) = pipeline(messenger.clone(), runner.clone(), dir.path(), 1024)?;
        let request = ProcessRequest::new(server.url("/file.zip"), 100);

        let outcome = pipeline
            .run(JobId::new_v4(), &request, CancellationToken::new())
            .await;

        mock.assert_async().await;
        assert!(matches!(
            outcome,
            Err(PipelineError::Download {
                platform: Platform::Direct,
                ..
            })
        ));
        assert!(runner.calls().is_empty());
        let edits = messenger.edited_texts();
        assert_eq!(edits.len(), 1);
        assert!(edits[0].contains("404"));
        assert!(
            !messenger
                .calls()
                .iter()
                .any(|call| matches!(call, MessengerCall::UploadFile { .. }))
        );
        assert!(dir_is_empty(dir.path()).await?);
        Ok(())
    }

    #[tokio::test]
    async fn failed_initial_notification_ends_run_silently() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let messenger = Arc::new(RecordingMessenger::new().failing_on(FailPoint::SendText));
        let runner = ScriptedRunner::producing("mp3", b"audio");
        let (pipeline, _) = pipeline(messenger.clone(), runner.clone(), dir.path(), 1024)?;
        let request = ProcessRequest::new("https://youtu.be/x", 100);

        let outcome = pipeline
            .run(JobId::new_v4(), &request, CancellationToken::new())
            .await;

        assert!(matches!(outcome, Err(PipelineError::Notify { .. })));
        assert!(runner.calls().is_empty());
        assert!(messenger.calls().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn relay_failure_sends_new_message_and_cleans_up() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let messenger =
            Arc::new(RecordingMessenger::new().failing_on(FailPoint::UploadWithoutDocument));
        let runner = ScriptedRunner::producing("m4a", b"audio");
        let (pipeline, _) = pipeline(messenger.clone(), runner, dir.path(), 1024)?;
        let request = ProcessRequest::new("https://soundcloud.com/a/b", 100);

        let outcome = pipeline
            .run(JobId::new_v4(), &request, CancellationToken::new())
            .await;

        match outcome {
            Err(err @ PipelineError::Relay { part: 1, .. }) => {
                assert_eq!(err.outcome(), JobOutcome::UploadFailed);
            }
            other => panic!("expected relay failure, got {other:?}"),
        }
        assert_eq!(messenger.edited_texts(), [MSG_UPLOADING]);
        assert_eq!(
            messenger.sent_texts().last().map(String::as_str),
            Some("❌ Upload failed: no document in backup message")
        );
        assert!(
            !messenger
                .calls()
                .iter()
                .any(|call| matches!(call, MessengerCall::Delete { .. }))
        );
        assert!(dir_is_empty(dir.path()).await?);
        Ok(())
    }

    #[tokio::test]
    async fn oversize_download_is_relayed_in_parts() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let messenger = Arc::new(RecordingMessenger::new());
        let runner = ScriptedRunner::producing("mp3", b"0123456789");
        let (pipeline, _) = pipeline(messenger.clone(), runner, dir.path(), 4)?;
        let request =
            ProcessRequest::new("https://youtube.com/watch?v=x", 100).with_custom_name("song.mp3");

        let outcome = pipeline
            .run(JobId::new_v4(), &request, CancellationToken::new())
            .await?;

        assert_eq!(outcome.parts, 3);
        assert_eq!(outcome.bytes, 10);
        assert!(
            messenger
                .sent_texts()
                .contains(&"📦 File is large; sending 3 parts".to_string())
        );
        let uploads: Vec<String> = messenger
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                MessengerCall::UploadFile { file_name, .. } => Some(file_name),
                _ => None,
            })
            .collect();
        assert_eq!(uploads, ["song.part1.mp3", "song.part2.mp3", "song.part3.mp3"]);
        assert!(dir_is_empty(dir.path()).await?);
        Ok(())
    }
}
