//! Scripted [`CommandRunner`] standing in for the external downloader.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mediarelay_fetch::{CommandOutput, CommandRunner, FetchError, FetchResult};
use tokio_util::sync::CancellationToken;

/// Behaviour of a [`ScriptedRunner`] invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerScript {
    /// Write `bytes` to the `-o` template with `%(ext)s` set to `ext` and
    /// print the resulting path.
    Produce {
        /// Extension written in place of `%(ext)s`.
        ext: String,
        /// File contents.
        bytes: Vec<u8>,
    },
    /// Exit unsuccessfully with `output` on stderr.
    Fail {
        /// Diagnostic text.
        output: String,
    },
    /// Block until cancelled.
    Hang,
    /// Panic inside the runner.
    Panic,
}

/// Runner that follows a fixed script and records its arguments.
#[derive(Debug)]
pub struct ScriptedRunner {
    script: RunnerScript,
    calls: Mutex<Vec<Vec<OsString>>>,
}

impl ScriptedRunner {
    /// Runner following `script` on every call.
    #[must_use]
    pub fn new(script: RunnerScript) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Runner producing a file with extension `ext`.
    #[must_use]
    pub fn producing(ext: &str, bytes: &[u8]) -> Arc<Self> {
        Self::new(RunnerScript::Produce {
            ext: ext.to_string(),
            bytes: bytes.to_vec(),
        })
    }

    /// Runner that fails with `output`.
    #[must_use]
    pub fn failing(output: &str) -> Arc<Self> {
        Self::new(RunnerScript::Fail {
            output: output.to_string(),
        })
    }

    /// Arguments of every call, lossily converted to strings.
    #[must_use]
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .map(|calls| {
                calls
                    .iter()
                    .map(|args| {
                        args.iter()
                            .map(|arg| arg.to_string_lossy().into_owned())
                            .collect()
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn output_path(args: &[OsString], ext: &str) -> Option<PathBuf> {
    let position = args.iter().position(|arg| arg == "-o")?;
    let template = args.get(position + 1)?.to_string_lossy().into_owned();
    Some(PathBuf::from(template.replace("%(ext)s", ext)))
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(
        &self,
        _program: &Path,
        args: &[OsString],
        cancel: &CancellationToken,
    ) -> FetchResult<CommandOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(args.to_vec());
        }
        match &self.script {
            RunnerScript::Produce { ext, bytes } => {
                let Some(path) = output_path(args, ext) else {
                    return Ok(CommandOutput {
                        success: false,
                        code: Some(2),
                        stderr: "missing output template".to_string(),
                        ..CommandOutput::default()
                    });
                };
                tokio::fs::write(&path, bytes)
                    .await
                    .map_err(|source| FetchError::Io {
                        operation: "scripted.write",
                        path: path.clone(),
                        source,
                    })?;
                Ok(CommandOutput {
                    success: true,
                    code: Some(0),
                    stdout: format!("{}\n", path.display()),
                    stderr: String::new(),
                })
            }
            RunnerScript::Fail { output } => Ok(CommandOutput {
                success: false,
                code: Some(1),
                stdout: String::new(),
                stderr: output.clone(),
            }),
            RunnerScript::Hang => {
                cancel.cancelled().await;
                Err(FetchError::Cancelled)
            }
            RunnerScript::Panic => panic!("scripted runner panic"),
        }
    }
}
