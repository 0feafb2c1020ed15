//! Download strategy contract and platform dispatch.
//!
//! # Design
//! - One strategy instance serves every run; per-run state travels in
//!   [`DownloadContext`].
//! - Dispatch is a fixed mapping from [`Platform`] so exactly one strategy runs
//!   per request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mediarelay_core::{DownloadResult, Platform};
use tokio_util::sync::CancellationToken;

use crate::command::CommandRunner;
use crate::direct::DirectFetchStrategy;
use crate::error::FetchResult;
use crate::temp::TempPaths;
use crate::ytdlp::{AudioExtractStrategy, YtDlpSettings, YtDlpStrategy};

/// Per-run inputs shared by all strategies.
#[derive(Debug, Clone)]
pub struct DownloadContext {
    /// Platform the URL was classified as.
    pub platform: Platform,
    /// Tripped when the service shuts down.
    pub cancel: CancellationToken,
    /// Scratch path generator for this run.
    pub temp: TempPaths,
}

/// A way of turning a URL into a local file.
#[async_trait]
pub trait DownloadStrategy: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Download `url` into the scratch directory.
    ///
    /// A non-empty `custom_name` becomes the reported file name verbatim.
    /// Partial outputs are removed before an error is returned.
    async fn download(
        &self,
        ctx: &DownloadContext,
        url: &str,
        custom_name: Option<&str>,
    ) -> FetchResult<DownloadResult>;
}

/// The three strategies, keyed by platform group.
#[derive(Clone)]
pub struct StrategySet {
    audio: Arc<dyn DownloadStrategy>,
    generic: Arc<dyn DownloadStrategy>,
    direct: Arc<dyn DownloadStrategy>,
}

impl StrategySet {
    /// Assemble a set from explicit strategy instances.
    #[must_use]
    pub fn new(
        audio: Arc<dyn DownloadStrategy>,
        generic: Arc<dyn DownloadStrategy>,
        direct: Arc<dyn DownloadStrategy>,
    ) -> Self {
        Self {
            audio,
            generic,
            direct,
        }
    }

    /// Build the production strategy set.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FetchError::ClientBuild`] when the HTTP client cannot be built.
    pub fn standard(
        settings: &YtDlpSettings,
        runner: Arc<dyn CommandRunner>,
        direct_timeout: Duration,
    ) -> FetchResult<Self> {
        Ok(Self::new(
            Arc::new(AudioExtractStrategy::new(
                settings.clone(),
                Arc::clone(&runner),
            )),
            Arc::new(YtDlpStrategy::new(settings.clone(), runner)),
            Arc::new(DirectFetchStrategy::new(direct_timeout)?),
        ))
    }

    /// Strategy responsible for `platform`.
    #[must_use]
    pub fn select(&self, platform: Platform) -> Arc<dyn DownloadStrategy> {
        match platform {
            Platform::Youtube => Arc::clone(&self.audio),
            Platform::Spotify | Platform::Deezer | Platform::SoundCloud | Platform::Restricted => {
                Arc::clone(&self.generic)
            }
            Platform::Direct => Arc::clone(&self.direct),
        }
    }
}
