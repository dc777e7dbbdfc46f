//! Wall-clock timing of mining across worker counts.
//!
//! Only the samples are produced here; charting them is left to whoever
//! consumes the output.

use std::fmt::Write as _;
use std::time::Duration;

use log::info;
use serde::Serialize;

use crate::blockchain::{Block, BlockHash};
use crate::error::Result;
use crate::mining;

/// Worker counts swept when none are given.
pub const DEFAULT_WORKER_COUNTS: [usize; 4] = [1, 2, 4, 8];

/// One timing measurement.
#[derive(Debug, Clone, Serialize)]
pub struct BenchSample {
    pub workers: usize,
    pub elapsed: Duration,
    pub nonce: u64,
    pub hash: BlockHash,
    pub probes: u64,
}

impl BenchSample {
    /// Hashes per second over the whole session.
    pub fn hash_rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.probes as f64 / secs
        } else {
            0.0
        }
    }
}

/// Mine one fresh block per entry of `worker_counts`, in order.
///
/// Every configuration is rejected up front, so a bad entry never leaves a
/// partial sweep behind.
pub fn sweep(payload: &str, difficulty: u32, worker_counts: &[usize]) -> Result<Vec<BenchSample>> {
    for &workers in worker_counts {
        mining::check_params(difficulty, workers)?;
    }

    let mut samples = Vec::with_capacity(worker_counts.len());
    for &workers in worker_counts {
        let block = Block::now(1, BlockHash::ZERO, payload);
        let report = mining::mine_with_report(block, difficulty, workers)?;
        info!(
            "BENCH - workers={} elapsed={:.3}s nonce={}",
            workers,
            report.elapsed.as_secs_f64(),
            report.block.nonce()
        );
        samples.push(BenchSample {
            workers,
            elapsed: report.elapsed,
            nonce: report.block.nonce(),
            hash: *report.block.hash(),
            probes: report.probes,
        });
    }
    Ok(samples)
}

/// Render samples as a plain-text table.
pub fn render_table(samples: &[BenchSample]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>7} | {:>10} | {:>12} | {:>12} | {:>12}",
        "workers", "time (s)", "nonce", "probes", "hash/s"
    );
    let _ = writeln!(out, "{}", "-".repeat(65));
    for s in samples {
        let _ = writeln!(
            out,
            "{:>7} | {:>10.3} | {:>12} | {:>12} | {:>12.0}",
            s.workers,
            s.elapsed.as_secs_f64(),
            s.nonce,
            s.probes,
            s.hash_rate()
        );
    }
    out
}
