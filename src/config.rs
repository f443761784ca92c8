//! Command-line configuration for the `quizdrill` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::runtime::handle::RuntimeConfig;

/// Interactive quiz trainer.
#[derive(Debug, Clone, Parser)]
#[command(name = "quizdrill", version, about = "Interactive command-line quiz trainer")]
pub struct AppConfig {
    /// SQLite journal holding the quizzes
    #[arg(long, env = "QUIZDRILL_DB", default_value = "quizzes.db")]
    pub db: PathBuf,

    /// Keep quizzes in memory only; nothing is written to disk
    #[arg(long)]
    pub in_memory: bool,

    /// Seed for the play order, for reproducible rounds
    #[arg(long)]
    pub seed: Option<u64>,

    /// Snapshot the store every N changes (0 disables snapshots)
    #[arg(long, default_value_t = RuntimeConfig::default().snapshot_every_ops)]
    pub snapshot_every: usize,
}

impl AppConfig {
    /// Store runtime settings derived from the command line.
    pub fn runtime(&self) -> RuntimeConfig {
        RuntimeConfig {
            snapshot_every_ops: self.snapshot_every,
            ..RuntimeConfig::default()
        }
    }
}
