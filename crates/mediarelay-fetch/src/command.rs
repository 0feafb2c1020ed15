//! Subprocess execution seam for the external downloader.
//!
//! # Design
//! - Strategies build argument vectors; the runner only executes them.
//! - The child is killed when cancellation fires or the future is dropped.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{FetchError, FetchResult};

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code when the process exited normally.
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Standard output followed by standard error.
    #[must_use]
    pub fn combined(&self) -> String {
        let mut combined = self.stdout.clone();
        if !combined.is_empty() && !self.stderr.is_empty() && !combined.ends_with('\n') {
            combined.push('\n');
        }
        combined.push_str(&self.stderr);
        combined
    }
}

/// Executes external programs on behalf of download strategies.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` to completion and capture its output.
    async fn run(
        &self,
        program: &Path,
        args: &[OsString],
        cancel: &CancellationToken,
    ) -> FetchResult<CommandOutput>;
}

/// [`CommandRunner`] backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(
        &self,
        program: &Path,
        args: &[OsString],
        cancel: &CancellationToken,
    ) -> FetchResult<CommandOutput> {
        let program_name = program.display().to_string();
        debug!(program = %program_name, ?args, "spawning external downloader");
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| FetchError::Spawn {
                program: program_name.clone(),
                source,
            })?;

        let output = tokio::select! {
            output = child.wait_with_output() => output.map_err(|source| FetchError::Spawn {
                program: program_name,
                source,
            })?,
            () = cancel.cancelled() => return Err(FetchError::Cancelled),
        };

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_output_joins_streams() {
        let output = CommandOutput {
            success: false,
            code: Some(1),
            stdout: "[youtube] x: Downloading".to_string(),
            stderr: "ERROR: unavailable\n".to_string(),
        };
        assert_eq!(
            output.combined(),
            "[youtube] x: Downloading\nERROR: unavailable\n"
        );
        assert_eq!(CommandOutput::default().combined(), "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn tokio_runner_captures_exit_status() -> anyhow::Result<()> {
        let runner = TokioCommandRunner;
        let cancel = CancellationToken::new();
        let args = vec![OsString::from("-c"), OsString::from("echo out; echo err >&2; exit 3")];
        let output = runner.run(Path::new("sh"), &args, &cancel).await?;
        assert!(!output.success);
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn tokio_runner_stops_on_cancellation() {
        let runner = TokioCommandRunner;
        let cancel = CancellationToken::new();
        cancel.cancel();
        let args = vec![OsString::from("30")];
        let result = runner.run(Path::new("sleep"), &args, &cancel).await;
        assert!(matches!(result, Err(FetchError::Cancelled)));
    }

    #[tokio::test]
    async fn missing_program_reports_spawn_error() {
        let runner = TokioCommandRunner;
        let cancel = CancellationToken::new();
        let result = runner
            .run(Path::new("/nonexistent/mediarelay-tool"), &[], &cancel)
            .await;
        assert!(matches!(result, Err(FetchError::Spawn { .. })));
    }
}
