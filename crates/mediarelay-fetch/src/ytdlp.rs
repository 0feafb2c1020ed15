//! Strategies backed by the external `yt-dlp` downloader.
//!
//! # Design
//! - The output template is `<stem>.%(ext)s` so every artifact of a run shares
//!   the stem and can be purged together.
//! - The tool prints the final path (`--print after_move:filepath`); when that
//!   line is missing or stale, the scratch directory is scanned for `<stem>.*`
//!   and the lexicographically smallest match wins. Other matches are removed.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use mediarelay_core::DownloadResult;
use tracing::{debug, info, warn};

use crate::command::CommandRunner;
use crate::error::{FetchError, FetchResult};
use crate::naming::{display_name, path_file_name};
use crate::strategy::{DownloadContext, DownloadStrategy};
use crate::temp::remove_quietly;

const AUDIO_ARGS: &[&str] = &["--extract-audio", "--audio-format", "mp3"];
const BEST_FORMAT_ARGS: &[&str] = &["-f", "best"];
const IN_PROGRESS_SUFFIXES: &[&str] = &[".part", ".ytdl", ".temp"];

/// Executable and cookie jar shared by the `yt-dlp` strategies.
#[derive(Debug, Clone)]
pub struct YtDlpSettings {
    /// Path or name of the `yt-dlp` executable.
    pub program: PathBuf,
    /// Cookie jar passed through `--cookies`.
    pub cookies_file: PathBuf,
}

/// Audio extraction for the primary video site.
#[derive(Clone)]
pub struct AudioExtractStrategy {
    settings: YtDlpSettings,
    runner: Arc<dyn CommandRunner>,
}

impl AudioExtractStrategy {
    /// Build the strategy around `runner`.
    #[must_use]
    pub fn new(settings: YtDlpSettings, runner: Arc<dyn CommandRunner>) -> Self {
        Self { settings, runner }
    }
}

#[async_trait]
impl DownloadStrategy for AudioExtractStrategy {
    fn name(&self) -> &'static str {
        "ytdlp_audio"
    }

    async fn download(
        &self,
        ctx: &DownloadContext,
        url: &str,
        custom_name: Option<&str>,
    ) -> FetchResult<DownloadResult> {
        run_ytdlp(
            &self.settings,
            self.runner.as_ref(),
            ctx,
            AUDIO_ARGS,
            url,
            custom_name,
        )
        .await
    }
}

/// Best-format download for streaming and restricted sites; streaming
/// categories are converted to audio.
#[derive(Clone)]
pub struct YtDlpStrategy {
    settings: YtDlpSettings,
    runner: Arc<dyn CommandRunner>,
}

impl YtDlpStrategy {
    /// Build the strategy around `runner`.
    #[must_use]
    pub fn new(settings: YtDlpSettings, runner: Arc<dyn CommandRunner>) -> Self {
        Self { settings, runner }
    }
}

#[async_trait]
impl DownloadStrategy for YtDlpStrategy {
    fn name(&self) -> &'static str {
        "ytdlp_generic"
    }

    async fn download(
        &self,
        ctx: &DownloadContext,
        url: &str,
        custom_name: Option<&str>,
    ) -> FetchResult<DownloadResult> {
        let mut extra: Vec<&str> = Vec::with_capacity(5);
        if ctx.platform.wants_audio() {
            extra.extend_from_slice(AUDIO_ARGS);
        }
        extra.extend_from_slice(BEST_FORMAT_ARGS);
        run_ytdlp(
            &self.settings,
            self.runner.as_ref(),
            ctx,
            &extra,
            url,
            custom_name,
        )
        .await
    }
}

fn build_args(settings: &YtDlpSettings, extra: &[&str], stem: &Path, url: &str) -> Vec<OsString> {
    let mut template = stem.as_os_str().to_os_string();
    template.push(".%(ext)s");

    let mut args: Vec<OsString> = extra.iter().map(OsString::from).collect();
    args.push("--cookies".into());
    args.push(settings.cookies_file.clone().into_os_string());
    args.push("-o".into());
    args.push(template);
    args.push("--print".into());
    args.push("after_move:filepath".into());
    args.push("--".into());
    args.push(url.into());
    args
}

async fn run_ytdlp(
    settings: &YtDlpSettings,
    runner: &dyn CommandRunner,
    ctx: &DownloadContext,
    extra: &[&str],
    url: &str,
    custom_name: Option<&str>,
) -> FetchResult<DownloadResult> {
    ctx.temp.ensure_dir().await?;
    let stem = ctx.temp.allocate();
    let args = build_args(settings, extra, &stem, url);

    let output = match runner.run(&settings.program, &args, &ctx.cancel).await {
        Ok(output) => output,
        Err(err) => {
            ctx.temp.purge(&stem).await;
            return Err(err);
        }
    };

    if !output.success {
        ctx.temp.purge(&stem).await;
        return Err(FetchError::ToolFailed {
            program: settings.program.display().to_string(),
            code: output.code,
            output: output.combined(),
        });
    }

    let path = match resolve_output(ctx, &stem, &output.stdout).await {
        Ok(path) => path,
        Err(err) => {
            ctx.temp.purge(&stem).await;
            return Err(err);
        }
    };
    let size = match tokio::fs::metadata(&path).await {
        Ok(metadata) => metadata.len(),
        Err(source) => {
            ctx.temp.purge(&stem).await;
            return Err(FetchError::io("ytdlp.metadata", path, source));
        }
    };

    let file_name = display_name(custom_name, &path_file_name(&path));
    info!(
        platform = %ctx.platform,
        path = %path.display(),
        size,
        "external downloader finished"
    );
    Ok(DownloadResult {
        path,
        file_name,
        size,
    })
}

async fn resolve_output(ctx: &DownloadContext, stem: &Path, stdout: &str) -> FetchResult<PathBuf> {
    if let Some(printed) = stdout
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .map(PathBuf::from)
    {
        if printed.starts_with(ctx.temp.dir()) && is_file(&printed).await {
            return Ok(printed);
        }
        debug!(printed = %printed.display(), "printed output path unusable; scanning");
    }

    let artifacts = ctx.temp.artifacts_for(stem).await?;
    let Some(chosen) = artifacts.iter().find(|path| !is_in_progress(path)).cloned() else {
        return Err(FetchError::OutputMissing {
            prefix: stem.to_path_buf(),
        });
    };
    for extra in artifacts.iter().filter(|path| **path != chosen) {
        warn!(
            chosen = %chosen.display(),
            discarded = %extra.display(),
            "multiple downloader outputs; keeping the first by name"
        );
        remove_quietly(extra).await;
    }
    Ok(chosen)
}

fn is_in_progress(path: &Path) -> bool {
    let name = path_file_name(path);
    IN_PROGRESS_SUFFIXES
        .iter()
        .any(|suffix| name.ends_with(suffix))
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|metadata| metadata.is_file())
}
