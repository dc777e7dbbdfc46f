//! Command-line and environment configuration.
//!
//! Values come from flags first, then from the environment (a `.env` file is
//! loaded by the binary before parsing), then from the defaults below.

use std::thread;

use clap::{Parser, Subcommand};

use crate::bench::DEFAULT_WORKER_COUNTS;
use crate::blockchain::DEFAULT_DIFFICULTY;
use crate::error::{Error, Result};
use crate::mining;

#[derive(Debug, Parser)]
#[command(name = "parallel_pow", version, about = "Concurrent proof-of-work mining demo")]
pub struct Config {
    /// Leading hex zeros required in a block digest.
    #[arg(long, short, env = "POW_DIFFICULTY", default_value_t = DEFAULT_DIFFICULTY, global = true)]
    pub difficulty: u32,

    /// Worker threads per mining session (defaults to available parallelism).
    #[arg(long, short, env = "POW_WORKERS", global = true)]
    pub workers: Option<usize>,

    /// Print JSON instead of human-readable output.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Mine a single block and print it.
    Mine {
        #[arg(long, env = "POW_PAYLOAD", default_value = "Concurrent Mining Block")]
        payload: String,
    },
    /// Time mining across several worker counts.
    Bench {
        #[arg(long, env = "POW_PAYLOAD", default_value = "Concurrent Mining Block")]
        payload: String,
        /// Comma-separated worker counts.
        #[arg(long, value_delimiter = ',')]
        counts: Vec<usize>,
    },
    /// Build a toy ledger, print it and validate it.
    Chain {
        /// Payload of each block appended after genesis (repeatable).
        #[arg(long = "block", default_values = ["SecondBlock", "ThirdBlock"])]
        blocks: Vec<String>,
    },
}

impl Config {
    /// Resolved worker count.
    pub fn worker_count(&self) -> usize {
        self.workers
            .unwrap_or_else(|| thread::available_parallelism().map_or(1, |n| n.get()))
    }

    /// Worker counts to sweep for `bench`.
    pub fn bench_counts<'a>(&self, counts: &'a [usize]) -> &'a [usize] {
        if counts.is_empty() {
            &DEFAULT_WORKER_COUNTS[..]
        } else {
            counts
        }
    }

    /// Reject configurations mining cannot run with.
    pub fn validate(&self) -> Result<()> {
        mining::check_params(self.difficulty, self.worker_count())?;
        if let Command::Bench { counts, .. } = &self.command {
            if counts.contains(&0) {
                return Err(Error::config("bench worker counts must be at least 1"));
            }
        }
        Ok(())
    }
}
