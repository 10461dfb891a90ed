//! JSON-backed ledger of episode processing state.
//!
//! The ledger is the single source of truth for which episodes have been
//! downloaded and transcribed. It is a plain JSON array of records, loaded
//! once at startup and flushed to disk after every mutation. Each flush
//! also snapshots the file via the backup rotator.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::domain::EpisodeRecord;

use super::backup;

/// Seed record written on cold start so the file is never an empty array
const PLACEHOLDER_TITLE: &str = "dummy";

/// Errors that can occur with the ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Ledger file is corrupt: {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No ledger record for episode: {0}")]
    UnknownEpisode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistent record of which episodes have been processed.
///
/// Records keep insertion order (discovery order), with at most one
/// record per title. Titles are compared verbatim.
pub struct Ledger {
    /// Path to the ledger JSON file
    path: PathBuf,

    /// In-memory records, flushed after every mutation
    records: Vec<EpisodeRecord>,
}

impl Ledger {
    /// Load the ledger from disk.
    ///
    /// A missing file is a cold start, not an error: the ledger is seeded
    /// with a single placeholder record. Unparseable content is
    /// [`LedgerError::Corrupt`].
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();

        if !path.exists() {
            info!(path = %path.display(), "No ledger found, starting cold");
            return Ok(Self {
                path,
                records: vec![EpisodeRecord::downloaded(PLACEHOLDER_TITLE)],
            });
        }

        let content = fs::read_to_string(&path).await?;
        let records: Vec<EpisodeRecord> =
            serde_json::from_str(&content).map_err(|source| LedgerError::Corrupt {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), count = records.len(), "Ledger loaded");
        Ok(Self { path, records })
    }

    /// Path to the ledger file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether any record matches `title` exactly
    pub fn is_downloaded(&self, title: &str) -> bool {
        self.records.iter().any(|r| r.title == title)
    }

    /// Whether a record matches `title` and has been transcribed
    pub fn is_transcribed(&self, title: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.title == title && r.transcribed)
    }

    /// Record an episode as downloaded and persist.
    ///
    /// The ledger is authoritative about uniqueness: inserting a title
    /// that already exists leaves the existing record (and its
    /// `transcribed` flag) untouched. Returns whether a record was
    /// newly inserted.
    pub async fn add_downloaded(&mut self, title: &str) -> Result<bool, LedgerError> {
        if self.is_downloaded(title) {
            debug!(title, "Episode already in ledger, not re-adding");
            return Ok(false);
        }

        self.records.push(EpisodeRecord::downloaded(title));
        self.save().await?;
        Ok(true)
    }

    /// Set the `transcribed` flag on an existing record and persist.
    ///
    /// The flag only ever transitions false -> true. An unknown title is
    /// an explicit error rather than a silent no-op.
    pub async fn mark_transcribed(&mut self, title: &str) -> Result<(), LedgerError> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.title == title)
            .ok_or_else(|| LedgerError::UnknownEpisode(title.to_string()))?;

        record.transcribed = true;
        self.save().await
    }

    /// All records in discovery order
    pub fn records(&self) -> &[EpisodeRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the ledger holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize all records to disk, then snapshot the file.
    ///
    /// Snapshot rotation is best-effort: a rotation failure is logged
    /// and never fails the save.
    pub async fn save(&self) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.path, content).await?;

        if let Err(e) = backup::rotate(&self.path).await {
            warn!(path = %self.path.display(), error = %e, "Ledger backup rotation failed");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ledger_path(temp: &TempDir) -> PathBuf {
        temp.path().join("episodes.json")
    }

    #[tokio::test]
    async fn test_cold_start_seeds_placeholder() {
        let temp = TempDir::new().unwrap();
        let ledger = Ledger::load(ledger_path(&temp)).await.unwrap();

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.records()[0].title, PLACEHOLDER_TITLE);
        assert!(!ledger.records()[0].transcribed);
    }

    #[tokio::test]
    async fn test_corrupt_ledger_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = ledger_path(&temp);
        tokio::fs::write(&path, "{not json").await.unwrap();

        let result = Ledger::load(&path).await;
        assert!(matches!(result, Err(LedgerError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn test_add_downloaded_persists_and_reloads() {
        let temp = TempDir::new().unwrap();
        let path = ledger_path(&temp);

        let mut ledger = Ledger::load(&path).await.unwrap();
        assert!(ledger.add_downloaded("Avsnitt 1").await.unwrap());
        assert!(ledger.is_downloaded("Avsnitt 1"));
        assert!(!ledger.is_transcribed("Avsnitt 1"));

        // Reload from disk
        let reloaded = Ledger::load(&path).await.unwrap();
        assert!(reloaded.is_downloaded("Avsnitt 1"));
    }

    #[tokio::test]
    async fn test_add_downloaded_is_upsert() {
        let temp = TempDir::new().unwrap();
        let mut ledger = Ledger::load(ledger_path(&temp)).await.unwrap();

        assert!(ledger.add_downloaded("Avsnitt 1").await.unwrap());
        ledger.mark_transcribed("Avsnitt 1").await.unwrap();

        // Re-adding neither duplicates nor clears the transcribed flag
        assert!(!ledger.add_downloaded("Avsnitt 1").await.unwrap());
        let matching: Vec<_> = ledger
            .records()
            .iter()
            .filter(|r| r.title == "Avsnitt 1")
            .collect();
        assert_eq!(matching.len(), 1);
        assert!(matching[0].transcribed);
    }

    #[tokio::test]
    async fn test_titles_match_exactly() {
        let temp = TempDir::new().unwrap();
        let mut ledger = Ledger::load(ledger_path(&temp)).await.unwrap();

        ledger.add_downloaded("Avsnitt 1").await.unwrap();
        assert!(!ledger.is_downloaded("avsnitt 1"));
        assert!(!ledger.is_downloaded("Avsnitt 1 "));
    }

    #[tokio::test]
    async fn test_mark_transcribed_unknown_title() {
        let temp = TempDir::new().unwrap();
        let mut ledger = Ledger::load(ledger_path(&temp)).await.unwrap();

        let result = ledger.mark_transcribed("nonexistent").await;
        assert!(matches!(result, Err(LedgerError::UnknownEpisode(_))));
    }

    #[tokio::test]
    async fn test_insertion_order_preserved() {
        let temp = TempDir::new().unwrap();
        let path = ledger_path(&temp);
        let mut ledger = Ledger::load(&path).await.unwrap();

        ledger.add_downloaded("b").await.unwrap();
        ledger.add_downloaded("a").await.unwrap();
        ledger.add_downloaded("c").await.unwrap();

        let reloaded = Ledger::load(&path).await.unwrap();
        let titles: Vec<_> = reloaded.records().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec![PLACEHOLDER_TITLE, "b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_ledger_file_is_plain_json_array() {
        let temp = TempDir::new().unwrap();
        let path = ledger_path(&temp);
        let mut ledger = Ledger::load(&path).await.unwrap();
        ledger.add_downloaded("Avsnitt 1").await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1]["title"], "Avsnitt 1");
        assert_eq!(entries[1]["transcribed"], false);
    }
}
