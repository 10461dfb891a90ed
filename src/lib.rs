//! podscribe - podcast feed poller and transcriber
//!
//! Polls a podcast RSS feed, downloads new episodes, and transcribes
//! them to text, tracking state in a small JSON-backed ledger so that
//! nothing is downloaded or transcribed twice.
//!
//! # Architecture
//!
//! The ledger is the single source of truth:
//! - Presence of a record means the episode is downloaded
//! - Its `transcribed` flag only ever goes from false to true
//! - The file is flushed after every mutation and snapshotted on each flush
//!
//! # Modules
//!
//! - `adapters`: External collaborators (feed, HTTP download, whisper)
//! - `core`: Ledger, backup rotation, and the orchestration loop
//! - `domain`: Data structures (Episode, EpisodeRecord)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Download and transcribe anything new in the feed
//! podscribe run
//!
//! # See what the ledger knows
//! podscribe status
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{Downloader, FeedSource, Transcriber};
pub use config::Config;
pub use core::{Ledger, LedgerError, Orchestrator, RunSummary, Stage, StageError};
pub use domain::{Episode, EpisodeRecord};
