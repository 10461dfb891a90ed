//! Collaborator interfaces for external systems.
//!
//! The pipeline talks to three external collaborators through traits:
//! the podcast feed, the media host, and the speech-to-text model.
//! One concrete adapter exists for each.

pub mod http;
pub mod rss;
pub mod whisper;

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::Episode;

// Re-export the concrete adapters
pub use http::HttpDownloader;
pub use rss::RssFeedSource;
pub use whisper::WhisperTranscriber;

/// Source of podcast episodes
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the feed and return its episodes in feed order
    async fn fetch_episodes(&self, feed_url: &str) -> Result<Vec<Episode>>;
}

/// Fetches episode media bytes
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Fetch the full payload at `url` (no streaming, no retry)
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Speech-to-text backend
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a local audio file, with an ISO 639-1 language hint
    async fn transcribe(&self, audio_path: &Path, language: &str) -> Result<String>;
}
