//! Main orchestrator for a feed pass.
//!
//! Walks the feed in order and, per episode, decides from ledger state
//! whether to download and/or transcribe. Episodes run strictly one
//! after another; a failure in one episode is logged and does not stop
//! the rest of the pass.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::adapters::{Downloader, FeedSource, Transcriber};
use crate::config::Config;
use crate::domain::{format_transcript, sanitize_title, Episode};

use super::ledger::Ledger;

/// Stage of the per-episode pipeline an error occurred in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Download,
    Transcribe,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Download => write!(f, "download"),
            Stage::Transcribe => write!(f, "transcribe"),
        }
    }
}

/// A per-episode failure with enough context to diagnose
#[derive(Debug, Error)]
#[error("Episode '{title}' failed at {stage}: {source}")]
pub struct StageError {
    pub title: String,
    pub stage: Stage,
    #[source]
    pub source: anyhow::Error,
}

/// Counts for one pass over the feed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Episodes discovered in the feed
    pub discovered: usize,

    /// Episodes newly downloaded this pass
    pub downloaded: usize,

    /// Episodes newly transcribed this pass
    pub transcribed: usize,

    /// Episodes already fully processed
    pub skipped: usize,

    /// Episodes that failed (download or transcription)
    pub failed: usize,
}

/// Drives the download/transcribe pipeline for one feed
pub struct Orchestrator {
    config: Config,
    feed: Box<dyn FeedSource>,
    downloader: Box<dyn Downloader>,
    transcriber: Box<dyn Transcriber>,
}

impl Orchestrator {
    pub fn new(
        config: Config,
        feed: Box<dyn FeedSource>,
        downloader: Box<dyn Downloader>,
        transcriber: Box<dyn Transcriber>,
    ) -> Self {
        Self {
            config,
            feed,
            downloader,
            transcriber,
        }
    }

    /// Run a single pass over the feed.
    ///
    /// Loads the ledger, processes every episode in feed order, and
    /// returns counts for the pass. Per-episode failures are logged and
    /// isolated; only ledger load failures abort the pass.
    #[instrument(skip(self), fields(feed_url = %self.config.feed_url))]
    pub async fn run(&self) -> Result<RunSummary> {
        let mut ledger = Ledger::load(&self.config.ledger_path)
            .await
            .context("Failed to load episode ledger")?;

        let episodes = self
            .feed
            .fetch_episodes(&self.config.feed_url)
            .await
            .context("Failed to fetch feed")?;

        info!(count = episodes.len(), "Feed episodes discovered");

        let mut summary = RunSummary {
            discovered: episodes.len(),
            ..Default::default()
        };

        for episode in &episodes {
            match self.process_episode(&mut ledger, episode).await {
                Ok(outcome) => {
                    summary.downloaded += usize::from(outcome.downloaded);
                    summary.transcribed += usize::from(outcome.transcribed);
                    if !outcome.downloaded && !outcome.transcribed {
                        summary.skipped += 1;
                    }
                }
                Err(e) => {
                    error!(title = %e.title, stage = %e.stage, error = %e.source, "Episode failed");
                    summary.failed += 1;
                }
            }
        }

        info!(
            downloaded = summary.downloaded,
            transcribed = summary.transcribed,
            skipped = summary.skipped,
            failed = summary.failed,
            "Feed pass complete"
        );

        Ok(summary)
    }

    /// Process one episode: Unknown -> Downloaded -> Transcribed.
    ///
    /// Both transitions are idempotent; re-entry at any state performs
    /// only the remaining work.
    async fn process_episode(
        &self,
        ledger: &mut Ledger,
        episode: &Episode,
    ) -> Result<EpisodeOutcome, StageError> {
        let media_path = self.media_path(&episode.title);
        let mut outcome = EpisodeOutcome::default();

        if ledger.is_downloaded(&episode.title) {
            info!(title = %episode.title, "Already downloaded, skipping fetch");
        } else {
            self.download(ledger, episode, &media_path)
                .await
                .map_err(|source| StageError {
                    title: episode.title.clone(),
                    stage: Stage::Download,
                    source,
                })?;
            outcome.downloaded = true;
        }

        if ledger.is_transcribed(&episode.title) {
            info!(title = %episode.title, "Already transcribed, skipping");
        } else {
            self.transcribe(ledger, episode, &media_path)
                .await
                .map_err(|source| StageError {
                    title: episode.title.clone(),
                    stage: Stage::Transcribe,
                    source,
                })?;
            outcome.transcribed = true;
        }

        Ok(outcome)
    }

    async fn download(
        &self,
        ledger: &mut Ledger,
        episode: &Episode,
        media_path: &Path,
    ) -> Result<()> {
        info!(title = %episode.title, url = %episode.media_url, "Downloading episode");

        let bytes = self.downloader.fetch(&episode.media_url).await?;

        if let Some(parent) = media_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create media dir: {}", parent.display()))?;
        }
        tokio::fs::write(media_path, &bytes)
            .await
            .with_context(|| format!("Failed to write media file: {}", media_path.display()))?;

        ledger
            .add_downloaded(&episode.title)
            .await
            .context("Failed to record download in ledger")?;

        info!(title = %episode.title, path = %media_path.display(), "Episode downloaded");
        Ok(())
    }

    async fn transcribe(
        &self,
        ledger: &mut Ledger,
        episode: &Episode,
        media_path: &Path,
    ) -> Result<()> {
        info!(title = %episode.title, "Transcribing episode");

        let text = self
            .transcriber
            .transcribe(media_path, &self.config.language)
            .await?;

        let transcript_path = self.transcript_path(&episode.title);
        if let Some(parent) = transcript_path.parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create transcript dir: {}", parent.display())
            })?;
        }
        tokio::fs::write(&transcript_path, format_transcript(&text))
            .await
            .with_context(|| {
                format!("Failed to write transcript: {}", transcript_path.display())
            })?;

        ledger
            .mark_transcribed(&episode.title)
            .await
            .context("Failed to record transcription in ledger")?;

        info!(title = %episode.title, path = %transcript_path.display(), "Episode transcribed");
        Ok(())
    }

    /// Media file path for an episode: `<media_dir>/<sanitized>.mp3`
    fn media_path(&self, title: &str) -> PathBuf {
        self.config
            .media_dir
            .join(format!("{}.mp3", sanitize_title(title)))
    }

    /// Transcript file path for an episode: `<transcript_dir>/<sanitized>.txt`
    fn transcript_path(&self, title: &str) -> PathBuf {
        self.config
            .transcript_dir
            .join(format!("{}.txt", sanitize_title(title)))
    }
}

/// What actually happened for one episode this pass
#[derive(Debug, Clone, Copy, Default)]
struct EpisodeOutcome {
    downloaded: bool,
    transcribed: bool,
}
