//! Episode types and title handling.

use serde::{Deserialize, Serialize};

/// Characters that are stripped from titles before filesystem use
const FORBIDDEN_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// One unit of podcast content as discovered in the feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    /// Feed-provided title, used verbatim as the ledger key
    pub title: String,

    /// URL of the episode's media enclosure
    pub media_url: String,
}

impl Episode {
    pub fn new(title: impl Into<String>, media_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            media_url: media_url.into(),
        }
    }
}

/// Persisted processing state for a single episode.
///
/// Presence of a record means the episode has been downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Feed-provided title (exact match key, no normalization)
    pub title: String,

    /// Whether a transcript has been produced
    pub transcribed: bool,
}

impl EpisodeRecord {
    /// Create a record for a freshly downloaded episode
    pub fn downloaded(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            transcribed: false,
        }
    }
}

/// Strip characters that are unsafe in filenames and trim whitespace.
///
/// The title itself stays untouched as a ledger key; this only derives
/// the on-disk name for media and transcript files.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !FORBIDDEN_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Break transcript text into one sentence per line.
pub fn format_transcript(text: &str) -> String {
    text.replace(". ", ".\n")
}
