//! Domain types for the podscribe pipeline.
//!
//! This module contains the core data structures:
//! - Episode: One feed entry (title + media URL)
//! - EpisodeRecord: Persisted processing state per episode

pub mod episode;

// Re-export commonly used types
pub use episode::{format_transcript, sanitize_title, Episode, EpisodeRecord};
