//! RSS feed adapter.
//!
//! Fetches the feed over HTTP and parses it with feed-rs. An entry
//! becomes an episode when it has a title and an audio enclosure;
//! anything else is skipped with a warning.

use anyhow::{Context, Result};
use async_trait::async_trait;
use feed_rs::model::Entry;
use tracing::{debug, warn};

use crate::domain::Episode;

use super::FeedSource;

/// Feed source backed by an HTTP fetch and feed-rs parsing
pub struct RssFeedSource {
    client: reqwest::Client,
}

impl Default for RssFeedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RssFeedSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl FeedSource for RssFeedSource {
    async fn fetch_episodes(&self, feed_url: &str) -> Result<Vec<Episode>> {
        let response = self
            .client
            .get(feed_url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch feed: {}", feed_url))?
            .error_for_status()
            .with_context(|| format!("Feed request rejected: {}", feed_url))?;

        let body = response
            .bytes()
            .await
            .context("Failed to read feed body")?;

        let feed = feed_rs::parser::parse(body.as_ref())
            .with_context(|| format!("Failed to parse feed: {}", feed_url))?;

        let mut episodes = Vec::new();
        for entry in feed.entries {
            match episode_from_entry(entry) {
                Some(episode) => episodes.push(episode),
                None => warn!("Skipping feed entry without title or enclosure"),
            }
        }

        debug!(feed_url, count = episodes.len(), "Feed fetched");
        Ok(episodes)
    }
}

/// Map a feed entry to an episode, if it carries a title and an enclosure
fn episode_from_entry(entry: Entry) -> Option<Episode> {
    let title = entry.title.map(|t| t.content)?;

    let media_url = entry
        .media
        .first()
        .and_then(|m| m.content.first())
        .and_then(|c| c.url.as_ref())
        .map(|u| u.to_string())
        .or_else(|| {
            entry
                .links
                .iter()
                .find(|l| {
                    l.media_type
                        .as_deref()
                        .is_some_and(|t| t.starts_with("audio/"))
                })
                .map(|l| l.href.clone())
        })?;

    Some(Episode::new(title, media_url))
}
