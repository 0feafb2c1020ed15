//! Plain HTTP GET strategy for everything the classifier does not recognise.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use mediarelay_core::DownloadResult;
use reqwest::{Client, StatusCode};
use tokio::io::AsyncWriteExt;
use tracing::info;
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::naming::{display_name, url_extension, url_file_name};
use crate::strategy::{DownloadContext, DownloadStrategy};
use crate::temp::remove_quietly;

/// Streams a single HTTP response body to a scratch file.
#[derive(Debug, Clone)]
pub struct DirectFetchStrategy {
    client: Client,
}

impl DirectFetchStrategy {
    /// Build the strategy with a client that gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] when the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::ClientBuild { source })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DownloadStrategy for DirectFetchStrategy {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn download(
        &self,
        ctx: &DownloadContext,
        url: &str,
        custom_name: Option<&str>,
    ) -> FetchResult<DownloadResult> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;
        let extension = url_extension(&parsed);
        let file_name = display_name(custom_name, &url_file_name(&parsed, &extension));

        ctx.temp.ensure_dir().await?;
        let mut path = ctx.temp.allocate().into_os_string();
        path.push(&extension);
        let path = PathBuf::from(path);

        match self.fetch_to(ctx, parsed, &path).await {
            Ok(size) => {
                info!(path = %path.display(), size, "direct fetch finished");
                Ok(DownloadResult {
                    path,
                    file_name,
                    size,
                })
            }
            Err(err) => {
                remove_quietly(&path).await;
                Err(err)
            }
        }
    }
}

impl DirectFetchStrategy {
    async fn fetch_to(&self, ctx: &DownloadContext, url: Url, path: &Path) -> FetchResult<u64> {
        let url_text = url.to_string();
        let response = tokio::select! {
            response = self.client.get(url).send() => response.map_err(|source| FetchError::Http {
                url: url_text.clone(),
                source,
            })?,
            () = ctx.cancel.cancelled() => return Err(FetchError::Cancelled),
        };

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::HttpStatus {
                url: url_text,
                status: status.as_u16(),
            });
        }

        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|source| FetchError::io("direct.create", path, source))?;
        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        loop {
            let next = tokio::select! {
                next = stream.next() => next,
                () = ctx.cancel.cancelled() => return Err(FetchError::Cancelled),
            };
            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk.map_err(|source| FetchError::Http {
                url: url_text.clone(),
                source,
            })?;
            file.write_all(&chunk)
                .await
                .map_err(|source| FetchError::io("direct.write", path, source))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|source| FetchError::io("direct.flush", path, source))?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use mediarelay_core::Platform;
    use tokio_util::sync::CancellationToken;

    use crate::temp::TempPaths;

    fn context(dir: &Path) -> DownloadContext {
        DownloadContext {
            platform: Platform::Direct,
            cancel: CancellationToken::new(),
            temp: TempPaths::new(dir),
        }
    }

    #[tokio::test]
    async fn body_is_streamed_to_file_with_url_extension() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/files/archive.zip");
                then.status(200).body("zip-bytes");
            })
            .await;
        let dir = tempfile::tempdir()?;
        let strategy = DirectFetchStrategy::new(Duration::from_secs(5))?;

        let result = strategy
            .download(&context(dir.path()), &server.url("/files/archive.zip"), None)
            .await?;

        mock.assert_async().await;
        assert_eq!(result.file_name, "archive.zip");
        assert_eq!(result.size, 9);
        assert_eq!(
            result.path.extension().and_then(|ext| ext.to_str()),
            Some("zip")
        );
        assert_eq!(tokio::fs::read(&result.path).await?, b"zip-bytes");
        Ok(())
    }

    #[tokio::test]
    async fn url_without_extension_uses_bin() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/download");
                then.status(200).body("raw");
            })
            .await;
        let dir = tempfile::tempdir()?;
        let strategy = DirectFetchStrategy::new(Duration::from_secs(5))?;

        let result = strategy
            .download(&context(dir.path()), &server.url("/download"), None)
            .await?;
        assert_eq!(
            result.path.extension().and_then(|ext| ext.to_str()),
            Some("bin")
        );
        assert_eq!(result.file_name, "download");
        Ok(())
    }

    #[tokio::test]
    async fn custom_name_overrides_derived_name() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/a.pdf");
                then.status(200).body("pdf");
            })
            .await;
        let dir = tempfile::tempdir()?;
        let strategy = DirectFetchStrategy::new(Duration::from_secs(5))?;

        let result = strategy
            .download(
                &context(dir.path()),
                &server.url("/a.pdf"),
                Some("Quarterly Report.pdf"),
            )
            .await?;
        assert_eq!(result.file_name, "Quarterly Report.pdf");
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_is_reported_and_nothing_is_left() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing.zip");
                then.status(404);
            })
            .await;
        let dir = tempfile::tempdir()?;
        let strategy = DirectFetchStrategy::new(Duration::from_secs(5))?;

        let result = strategy
            .download(&context(dir.path()), &server.url("/missing.zip"), None)
            .await;
        match result {
            Err(err @ FetchError::HttpStatus { status: 404, .. }) => {
                assert!(err.detail().contains("404"));
            }
            other => anyhow::bail!("unexpected result: {other:?}"),
        }
        let mut entries = tokio::fs::read_dir(dir.path()).await?;
        assert!(entries.next_entry().await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn cancellation_mid_body_removes_the_partial_file() -> anyhow::Result<()> {
        use tokio::io::AsyncReadExt;
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (sent_tx, sent_rx) = tokio::sync::oneshot::channel();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await?;
            let mut request = [0_u8; 1024];
            let _ = socket.read(&mut request).await?;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 1048576\r\n\r\nfirst-chunk")
                .await?;
            socket.flush().await?;
            let _ = sent_tx.send(());
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, std::io::Error>(())
        });

        let dir = tempfile::tempdir()?;
        let ctx = context(dir.path());
        let cancel = ctx.cancel.clone();
        tokio::spawn(async move {
            if sent_rx.await.is_ok() {
                tokio::time::sleep(Duration::from_millis(100)).await;
                cancel.cancel();
            }
        });
        let strategy = DirectFetchStrategy::new(Duration::from_secs(30))?;

        let result = strategy
            .download(&ctx, &format!("http://{addr}/big.iso"), None)
            .await;

        assert!(matches!(result, Err(FetchError::Cancelled)), "{result:?}");
        let mut entries = tokio::fs::read_dir(dir.path()).await?;
        assert!(entries.next_entry().await?.is_none());
        server.abort();
        Ok(())
    }

    #[tokio::test]
    async fn unparsable_url_is_rejected() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let strategy = DirectFetchStrategy::new(Duration::from_secs(5))?;
        let result = strategy
            .download(&context(dir.path()), "not a url", None)
            .await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
        Ok(())
    }
}
