//! Timestamped ledger snapshots with bounded retention.
//!
//! Every ledger save copies the file to `<name>_<YYYYMMDD_HHMMSS>.bak`
//! next to it, then prunes snapshots beyond the retention bound. The
//! whole operation is best-effort from the caller's point of view.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use chrono::Local;
use tokio::fs;
use tracing::{debug, warn};

/// Snapshots retained per ledger, most recent first
pub const MAX_SNAPSHOTS: usize = 100;

/// Snapshot the ledger file and prune old snapshots.
///
/// Returns the path of the snapshot that was written.
pub async fn rotate(ledger_path: &Path) -> Result<PathBuf> {
    let snapshot_path = snapshot_path(ledger_path, Local::now().format("%Y%m%d_%H%M%S"));

    fs::copy(ledger_path, &snapshot_path)
        .await
        .with_context(|| format!("Failed to snapshot ledger to {}", snapshot_path.display()))?;

    debug!(snapshot = %snapshot_path.display(), "Ledger snapshot written");

    prune(ledger_path).await?;

    Ok(snapshot_path)
}

/// Delete every snapshot beyond the `MAX_SNAPSHOTS` most recent by mtime.
///
/// Individual deletions are allowed to fail without aborting the prune.
pub async fn prune(ledger_path: &Path) -> Result<()> {
    let mut snapshots = list_snapshots(ledger_path)?;

    if snapshots.len() <= MAX_SNAPSHOTS {
        return Ok(());
    }

    // Most recent first
    snapshots.sort_by(|a, b| b.1.cmp(&a.1));

    for (path, _) in snapshots.drain(MAX_SNAPSHOTS..) {
        if let Err(e) = fs::remove_file(&path).await {
            warn!(snapshot = %path.display(), error = %e, "Failed to delete old snapshot");
        }
    }

    Ok(())
}

/// All snapshots for this ledger with their modification times
pub fn list_snapshots(ledger_path: &Path) -> Result<Vec<(PathBuf, SystemTime)>> {
    let pattern = snapshot_path(ledger_path, "*");
    let pattern = pattern
        .to_str()
        .context("Ledger path is not valid UTF-8")?
        .to_string();

    let mut snapshots = Vec::new();
    for entry in glob::glob(&pattern).context("Invalid snapshot glob pattern")? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "Unreadable snapshot entry");
                continue;
            }
        };

        match path.metadata().and_then(|m| m.modified()) {
            Ok(mtime) => snapshots.push((path, mtime)),
            Err(e) => warn!(snapshot = %path.display(), error = %e, "No mtime for snapshot"),
        }
    }

    Ok(snapshots)
}

/// Snapshot name for a ledger file: `<file-name>_<tag>.bak` in the same directory
fn snapshot_path(ledger_path: &Path, tag: impl std::fmt::Display) -> PathBuf {
    let file_name = ledger_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    ledger_path.with_file_name(format!("{}_{}.bak", file_name, tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_rotate_writes_snapshot_next_to_ledger() {
        let temp = TempDir::new().unwrap();
        let ledger = temp.path().join("episodes.json");
        fs::write(&ledger, "[]").await.unwrap();

        let snapshot = rotate(&ledger).await.unwrap();

        assert_eq!(snapshot.parent(), ledger.parent());
        let name = snapshot.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("episodes.json_"));
        assert!(name.ends_with(".bak"));

        // Timestamp tag is second-resolution: YYYYMMDD_HHMMSS
        let tag = name
            .trim_start_matches("episodes.json_")
            .trim_end_matches(".bak");
        assert_eq!(tag.len(), 15);

        let content = fs::read_to_string(&snapshot).await.unwrap();
        assert_eq!(content, "[]");
    }

    #[tokio::test]
    async fn test_rotate_missing_ledger_is_an_error() {
        let temp = TempDir::new().unwrap();
        let ledger = temp.path().join("missing.json");

        assert!(rotate(&ledger).await.is_err());
    }

    #[tokio::test]
    async fn test_list_snapshots_ignores_unrelated_files() {
        let temp = TempDir::new().unwrap();
        let ledger = temp.path().join("episodes.json");
        fs::write(&ledger, "[]").await.unwrap();
        fs::write(temp.path().join("episodes.json_20240101_000000.bak"), "[]")
            .await
            .unwrap();
        fs::write(temp.path().join("other.json_20240101_000000.bak"), "[]")
            .await
            .unwrap();
        fs::write(temp.path().join("notes.txt"), "x").await.unwrap();

        let snapshots = list_snapshots(&ledger).unwrap();
        assert_eq!(snapshots.len(), 1);
    }

    #[tokio::test]
    async fn test_prune_keeps_most_recent() {
        let temp = TempDir::new().unwrap();
        let ledger = temp.path().join("episodes.json");
        fs::write(&ledger, "[]").await.unwrap();

        // Create bound + 5 snapshots with increasing mtimes
        let base = filetime::FileTime::from_unix_time(1_700_000_000, 0);
        for i in 0..(MAX_SNAPSHOTS + 5) {
            let path = temp
                .path()
                .join(format!("episodes.json_20240101_{:06}.bak", i));
            fs::write(&path, "[]").await.unwrap();
            let mtime = filetime::FileTime::from_unix_time(base.unix_seconds() + i as i64, 0);
            filetime::set_file_mtime(&path, mtime).unwrap();
        }

        prune(&ledger).await.unwrap();

        let mut remaining = list_snapshots(&ledger).unwrap();
        assert_eq!(remaining.len(), MAX_SNAPSHOTS);

        // The oldest five are the ones that were deleted
        remaining.sort_by(|a, b| a.1.cmp(&b.1));
        let oldest_name = remaining[0].0.file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(oldest_name, "episodes.json_20240101_000005.bak");
    }
}
