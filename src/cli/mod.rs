//! Command-line interface for podscribe.
//!
//! Provides commands for running a single feed pass and for inspecting
//! the ledger.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::adapters::{HttpDownloader, RssFeedSource, WhisperTranscriber};
use crate::config::Config;
use crate::core::{Ledger, Orchestrator};

/// podscribe - poll a podcast feed, download and transcribe new episodes
#[derive(Parser, Debug)]
#[command(name = "podscribe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the config file (defaults to ~/.podscribe/config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one pass over the feed: download and transcribe new episodes
    Run {
        /// Whisper model name
        #[arg(short, long, default_value = "large", env = "PODSCRIBE_WHISPER_MODEL")]
        model: String,
    },

    /// Show the ledger: which episodes are downloaded and transcribed
    Status,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match self.command {
            Commands::Run { model } => run_pass(config, model).await,
            Commands::Status => show_status(config).await,
        }
    }
}

async fn run_pass(config: Config, model: String) -> Result<()> {
    let orchestrator = Orchestrator::new(
        config,
        Box::new(RssFeedSource::new()),
        Box::new(HttpDownloader::new()),
        Box::new(WhisperTranscriber::new(model)),
    );

    let summary = orchestrator.run().await?;

    println!(
        "Discovered {} episode(s): {} downloaded, {} transcribed, {} skipped, {} failed",
        summary.discovered,
        summary.downloaded,
        summary.transcribed,
        summary.skipped,
        summary.failed
    );

    if summary.failed > 0 {
        anyhow::bail!("{} episode(s) failed", summary.failed);
    }

    Ok(())
}

async fn show_status(config: Config) -> Result<()> {
    let ledger = Ledger::load(&config.ledger_path).await?;

    println!("Ledger: {}", ledger.path().display());
    for record in ledger.records() {
        let state = if record.transcribed {
            "transcribed"
        } else {
            "downloaded"
        };
        println!("  [{}] {}", state, record.title);
    }

    Ok(())
}
