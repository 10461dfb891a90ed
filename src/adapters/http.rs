//! HTTP media downloader.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::Downloader;

/// Downloader backed by a plain HTTP GET (full payload, no streaming)
pub struct HttpDownloader {
    client: reqwest::Client,
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpDownloader {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch: {}", url))?
            .error_for_status()
            .with_context(|| format!("Download rejected: {}", url))?;

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body: {}", url))?;

        debug!(url, bytes = bytes.len(), "Download complete");
        Ok(bytes.to_vec())
    }
}
