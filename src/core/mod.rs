//! Core pipeline logic.
//!
//! This module contains:
//! - Ledger: JSON-backed episode state, flushed on every mutation
//! - Backup: timestamped ledger snapshots with bounded retention
//! - Orchestrator: the single-pass download/transcribe loop

pub mod backup;
pub mod ledger;
pub mod orchestrator;

// Re-export commonly used types
pub use backup::MAX_SNAPSHOTS;
pub use ledger::{Ledger, LedgerError};
pub use orchestrator::{Orchestrator, RunSummary, Stage, StageError};
