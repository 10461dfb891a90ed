//! Configuration for podscribe.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (PODSCRIBE_FEED_URL, PODSCRIBE_HOME, PODSCRIBE_LANGUAGE)
//! 2. Config file (YAML, `--config` or ~/.podscribe/config.yaml)
//! 3. Defaults (~/.podscribe, Swedish)
//!
//! Relative paths in the config file are resolved against the config
//! file's directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Language whisper is hinted with when the config doesn't say
const DEFAULT_LANGUAGE: &str = "sv";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// RSS feed URL for the podcast
    pub feed_url: Option<String>,

    /// Directory for downloaded media files
    pub media_dir: Option<String>,

    /// Directory for transcript files
    pub transcript_dir: Option<String>,

    /// Path to the ledger JSON file
    pub ledger_path: Option<String>,

    /// ISO 639-1 language hint for transcription
    pub language: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct Config {
    pub feed_url: String,
    pub media_dir: PathBuf,
    pub transcript_dir: PathBuf,
    pub ledger_path: PathBuf,
    pub language: String,
}

impl Config {
    /// Load configuration from a config file, env vars, and defaults.
    ///
    /// When `config_path` is `None`, `~/.podscribe/config.yaml` is used
    /// if it exists. The feed URL must come from somewhere; everything
    /// else has a default under the podscribe home directory.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let default_path = default_home().map(|h| h.join("config.yaml"));

        let file = match config_path {
            Some(path) => Some(load_config_file(path)?),
            None => match default_path {
                Ok(ref path) if path.exists() => Some(load_config_file(path)?),
                _ => None,
            },
        };

        let base_dir = config_path
            .and_then(|p| p.parent())
            .map(Path::to_path_buf)
            .map(Ok)
            .unwrap_or_else(default_home)?;

        let feed_url = std::env::var("PODSCRIBE_FEED_URL")
            .ok()
            .or_else(|| file.as_ref().and_then(|f| f.feed_url.clone()))
            .context("No feed URL configured (set feed_url or PODSCRIBE_FEED_URL)")?;

        let home = std::env::var("PODSCRIBE_HOME")
            .map(PathBuf::from)
            .map(Ok)
            .unwrap_or_else(|_| default_home())?;

        let media_dir = file
            .as_ref()
            .and_then(|f| f.media_dir.as_deref())
            .map(|p| resolve_path(&base_dir, p))
            .unwrap_or_else(|| home.join("media"));

        let transcript_dir = file
            .as_ref()
            .and_then(|f| f.transcript_dir.as_deref())
            .map(|p| resolve_path(&base_dir, p))
            .unwrap_or_else(|| home.join("transcripts"));

        let ledger_path = file
            .as_ref()
            .and_then(|f| f.ledger_path.as_deref())
            .map(|p| resolve_path(&base_dir, p))
            .unwrap_or_else(|| home.join("episodes.json"));

        let language = std::env::var("PODSCRIBE_LANGUAGE")
            .ok()
            .or_else(|| file.as_ref().and_then(|f| f.language.clone()))
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Ok(Self {
            feed_url,
            media_dir,
            transcript_dir,
            ledger_path,
            language,
        })
    }
}

/// Default podscribe home (~/.podscribe)
fn default_home() -> Result<PathBuf> {
    Ok(dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".podscribe"))
}

/// Load and parse a config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
feed_url: "https://feeds.example.com/shows/abc"
media_dir: ./media
transcript_dir: ./transcripts
ledger_path: ./episodes.json
language: sv
"#
        )
        .unwrap();

        let config = Config::load(Some(&config_path)).unwrap();
        assert_eq!(config.feed_url, "https://feeds.example.com/shows/abc");
        assert_eq!(config.media_dir, temp.path().join("./media"));
        assert_eq!(config.transcript_dir, temp.path().join("./transcripts"));
        assert_eq!(config.ledger_path, temp.path().join("./episodes.json"));
        assert_eq!(config.language, "sv");
    }

    #[test]
    fn test_missing_feed_url_is_an_error() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.yaml");
        std::fs::write(&config_path, "language: en\n").unwrap();

        // Only meaningful when the env override is unset
        if std::env::var("PODSCRIBE_FEED_URL").is_err() {
            assert!(Config::load(Some(&config_path)).is_err());
        }
    }

    #[test]
    fn test_language_defaults_to_swedish() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.yaml");
        std::fs::write(&config_path, "feed_url: \"https://feeds.example.com/x\"\n").unwrap();

        if std::env::var("PODSCRIBE_LANGUAGE").is_err() {
            let config = Config::load(Some(&config_path)).unwrap();
            assert_eq!(config.language, "sv");
        }
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/podcast");

        assert_eq!(
            resolve_path(&base, "./media"),
            PathBuf::from("/home/user/podcast/./media")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/media"),
            PathBuf::from("/absolute/media")
        );
    }
}
