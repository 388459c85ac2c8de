use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Url;
use ripkit_core::fetch::{ArchiveSource, DownloadProgress};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const COPY_CHUNK: usize = 64 * 1024;

/// Downloads archives over HTTP(S) with reqwest, or copies them from `file://` URLs.
pub struct HttpArchiveSource {
    client: reqwest::Client,
}

impl HttpArchiveSource {
    pub fn new(connect_timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        Ok(Self {
            client: builder.build().context("failed to build http client")?,
        })
    }

    async fn fetch_http(
        &self,
        url: Url,
        dest: &Path,
        on_progress: &mut (dyn FnMut(DownloadProgress) + Send),
    ) -> Result<u64> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("GET {url} returned HTTP {}", status.as_u16());
        }

        let total = resp.content_length();
        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = resp.bytes_stream();
        let mut transferred = 0u64;
        on_progress(DownloadProgress { transferred, total });

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.with_context(|| format!("reading body of {url}"))?;
            file.write_all(&chunk).await?;
            transferred += chunk.len() as u64;
            on_progress(DownloadProgress { transferred, total });
        }
        file.flush().await?;

        tracing::debug!(url = %url, bytes = transferred, "archive downloaded");
        Ok(transferred)
    }

    async fn copy_local(
        &self,
        src: &Path,
        dest: &Path,
        on_progress: &mut (dyn FnMut(DownloadProgress) + Send),
    ) -> Result<u64> {
        let mut input = tokio::fs::File::open(src)
            .await
            .with_context(|| format!("open {}", src.display()))?;
        let total = input.metadata().await.ok().map(|m| m.len());
        let mut output = tokio::fs::File::create(dest).await?;

        let mut buf = vec![0u8; COPY_CHUNK];
        let mut transferred = 0u64;
        on_progress(DownloadProgress { transferred, total });
        loop {
            let n = input.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            output.write_all(&buf[..n]).await?;
            transferred += n as u64;
            on_progress(DownloadProgress { transferred, total });
        }
        output.flush().await?;
        Ok(transferred)
    }
}

#[async_trait]
impl ArchiveSource for HttpArchiveSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn download(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &mut (dyn FnMut(DownloadProgress) + Send),
    ) -> Result<u64> {
        let parsed = Url::parse(url).with_context(|| format!("invalid archive url: {url}"))?;
        match parsed.scheme() {
            "file" => {
                let path = parsed
                    .to_file_path()
                    .map_err(|_| anyhow!("not a local path: {url}"))?;
                self.copy_local(&path, dest, on_progress).await
            }
            "http" | "https" => self.fetch_http(parsed, dest, on_progress).await,
            other => bail!("unsupported url scheme '{other}' in {url}"),
        }
    }
}
