//! HTTP snapshot client with retry and in-memory decompression.

use async_compression::tokio::bufread::BzDecoder;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use tokio::io::AsyncReadExt;
use tracing::debug;

use hauler_core::{Error, Result};

/// HTTP client for snapshot downloads.
///
/// Transient failures are retried with exponential backoff before an error
/// reaches the caller.
pub struct SnapshotClient {
    http: ClientWithMiddleware,
}

impl SnapshotClient {
    /// Create a client with the default retry policy (3 attempts).
    pub fn new() -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let http = ClientBuilder::new(reqwest::Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        Self { http }
    }

    /// Fetch a URL as text.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!(url, "downloading");
        let response = self.send(url).await?;
        let response = response
            .error_for_status()
            .map_err(|err| Error::download(err.to_string()))?;
        response
            .text()
            .await
            .map_err(|err| Error::download(err.to_string()))
    }

    /// Fetch a URL as text, mapping 404 to `None`.
    ///
    /// Weekly history files appear with a lag; a missing file is an
    /// expected condition, not a download failure.
    pub async fn fetch_text_optional(&self, url: &str) -> Result<Option<String>> {
        debug!(url, "downloading");
        let response = self.send(url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(|err| Error::download(err.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|err| Error::download(err.to_string()))?;
        Ok(Some(body))
    }

    /// Fetch a bz2-compressed URL and decompress it in memory.
    pub async fn fetch_bz2(&self, url: &str) -> Result<String> {
        debug!(url, "downloading compressed snapshot");
        let response = self.send(url).await?;
        let response = response
            .error_for_status()
            .map_err(|err| Error::download(err.to_string()))?;
        let body = response
            .bytes()
            .await
            .map_err(|err| Error::download(err.to_string()))?;

        let mut decoder = BzDecoder::new(&body[..]);
        let mut text = String::new();
        decoder.read_to_string(&mut text).await?;
        debug!(
            compressed = body.len(),
            decompressed = text.len(),
            "decompressed snapshot"
        );
        Ok(text)
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response> {
        self.http
            .get(url)
            .send()
            .await
            .map_err(|err| Error::download(err.to_string()))
    }
}

impl Default for SnapshotClient {
    fn default() -> Self {
        Self::new()
    }
}
