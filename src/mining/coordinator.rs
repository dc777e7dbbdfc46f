use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};
use serde::Serialize;

use super::slot::{Claim, StopFlag, WinnerSlot};
use crate::blockchain::{Block, BlockHash, MAX_DIFFICULTY};
use crate::error::{Error, Result};

/// Outcome of one mining session.
#[derive(Debug, Clone, Serialize)]
pub struct MiningReport {
    pub block: Block,
    /// Id of the worker whose claim was committed.
    pub winner: usize,
    /// Candidate nonces hashed across all workers.
    pub probes: u64,
    /// Qualifying nonces found after the slot was already taken.
    pub discarded_claims: u64,
    pub elapsed: Duration,
}

/// Reject parameters under which mining cannot make progress.
pub fn check_params(difficulty: u32, worker_count: usize) -> Result<()> {
    if worker_count == 0 {
        return Err(Error::config("worker_count must be at least 1"));
    }
    if difficulty > MAX_DIFFICULTY {
        return Err(Error::config(format!(
            "difficulty {difficulty} exceeds the {MAX_DIFFICULTY} hex characters of a digest"
        )));
    }
    Ok(())
}

/// Mine `block` with `worker_count` threads and return it sealed.
pub fn mine(block: Block, difficulty: u32, worker_count: usize) -> Result<Block> {
    mine_with_report(block, difficulty, worker_count).map(|report| report.block)
}

/// Mine a fresh block carrying `payload` and measure the wall-clock time spent.
pub fn mine_block(
    payload: impl Into<String>,
    difficulty: u32,
    worker_count: usize,
) -> Result<(Block, Duration)> {
    let block = Block::now(1, BlockHash::ZERO, payload);
    let report = mine_with_report(block, difficulty, worker_count)?;
    Ok((report.block, report.elapsed))
}

/// Mine `block` and report which worker won and how much work was done.
///
/// Worker `w` probes nonces `w, w + n, w + 2n, ...` for `n = worker_count`,
/// so the workers never overlap and together cover every nonce. The first
/// qualifying nonce registered in the [`WinnerSlot`] is the only one that can
/// be sealed; the block is sealed after every worker has been joined.
pub fn mine_with_report(
    mut block: Block,
    difficulty: u32,
    worker_count: usize,
) -> Result<MiningReport> {
    check_params(difficulty, worker_count)?;
    if block.is_sealed() {
        return Err(Error::AlreadySealed {
            index: block.index(),
        });
    }

    info!(
        "MINER - block #{} difficulty={} workers={}",
        block.index(),
        difficulty,
        worker_count
    );

    let started = Instant::now();

    // Nonce 0 always qualifies at difficulty 0.
    if difficulty == 0 {
        block.seal(0)?;
        return Ok(MiningReport {
            block,
            winner: 0,
            probes: 1,
            discarded_claims: 0,
            elapsed: started.elapsed(),
        });
    }

    let race = Race::default();
    let stride = worker_count as u64;

    let (probes, spawn_error) = {
        let (candidate, race) = (&block, &race);
        thread::scope(|s| {
            let mut handles = Vec::with_capacity(worker_count);
            let mut spawn_error = None;
            for worker in 0..worker_count {
                let spawned = thread::Builder::new()
                    .name(format!("pow-worker-{worker}"))
                    .spawn_scoped(s, move || {
                        search(candidate, difficulty, worker, worker as u64, stride, race)
                    });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        race.stop.raise();
                        spawn_error = Some(e);
                        break;
                    }
                }
            }
            let probes: u64 = handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|p| std::panic::resume_unwind(p)))
                .sum();
            (probes, spawn_error)
        })
    };

    if let Some(e) = spawn_error {
        return Err(Error::Io(e));
    }

    let Race { slot, discarded, .. } = race;
    let Claim { nonce, worker } = slot
        .into_winner()
        .ok_or(Error::NonceSpaceExhausted { difficulty })?;
    block.seal(nonce)?;
    let elapsed = started.elapsed();

    info!(
        "MINER - sealed block #{} (hash={}, nonce={}, worker={}, probes={}, {:.3}s)",
        block.index(),
        block.hash(),
        nonce,
        worker,
        probes,
        elapsed.as_secs_f64()
    );

    Ok(MiningReport {
        block,
        winner: worker,
        probes,
        discarded_claims: discarded.into_inner(),
        elapsed,
    })
}

/// State shared by the workers of one mining session.
#[derive(Debug, Default)]
struct Race {
    slot: WinnerSlot,
    stop: StopFlag,
    discarded: AtomicU64,
}

/// One worker's search loop, probing `start, start + stride, ...` until the
/// stop flag is raised or the nonce space runs out. Returns the number of
/// nonces probed.
fn search(
    block: &Block,
    difficulty: u32,
    worker: usize,
    start: u64,
    stride: u64,
    race: &Race,
) -> u64 {
    let mut nonce = start;
    let mut probes = 0u64;

    while !race.stop.is_raised() {
        probes += 1;
        if block.recompute_digest(nonce).meets_difficulty(difficulty) {
            if race.slot.claim(Claim { nonce, worker }) {
                debug!("worker {worker} claimed nonce {nonce}");
                race.stop.raise();
            } else {
                race.discarded.fetch_add(1, Ordering::Relaxed);
                debug!("worker {worker} discarded late nonce {nonce}");
            }
            break;
        }
        match nonce.checked_add(stride) {
            Some(next) => nonce = next,
            None => break,
        }
    }

    probes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(payload: &str) -> Block {
        Block::new(1, BlockHash::ZERO, 1_700_000_000_000, payload)
    }

    #[test]
    fn rejects_zero_workers() {
        let err = mine(candidate("A"), 1, 0).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_unreachable_difficulty() {
        let err = mine(candidate("A"), MAX_DIFFICULTY + 1, 2).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_sealed_block() {
        let mut block = candidate("A");
        block.seal(3).unwrap();
        let err = mine(block, 1, 2).unwrap_err();
        assert!(matches!(err, Error::AlreadySealed { index: 1 }));
    }

    #[test]
    fn difficulty_zero_seals_nonce_zero() {
        let report = mine_with_report(candidate("A"), 0, 4).unwrap();
        assert_eq!(report.block.nonce(), 0);
        assert_eq!(report.winner, 0);
        assert!(report.block.is_sealed());
        assert!(report.block.has_intact_digest());
    }

    #[test]
    fn sealed_digest_meets_difficulty() {
        for workers in [1, 2, 3, 8] {
            let block = mine(candidate("payload"), 3, workers).unwrap();
            assert!(block.is_sealed());
            assert!(block.is_valid(3));
            assert!(block.hash().to_hex().starts_with("000"));
        }
    }

    #[test]
    fn single_worker_finds_lowest_qualifying_nonce() {
        let block = candidate("deterministic");
        let expected = (0u64..)
            .find(|n| block.recompute_digest(*n).meets_difficulty(2))
            .unwrap();
        let report = mine_with_report(block, 2, 1).unwrap();
        assert_eq!(report.block.nonce(), expected);
        assert_eq!(report.probes, expected + 1);
        assert_eq!(report.discarded_claims, 0);
    }

    #[test]
    fn winner_owns_its_nonce_residue() {
        for _ in 0..20 {
            let report = mine_with_report(candidate("stride"), 2, 5).unwrap();
            assert_eq!(report.block.nonce() % 5, report.winner as u64);
        }
    }

    #[test]
    fn search_stops_when_flag_already_raised() {
        let block = candidate("A");
        let race = Race::default();
        race.stop.raise();
        assert_eq!(search(&block, 1, 0, 0, 1, &race), 0);
        assert!(race.slot.winner().is_none());
    }

    #[test]
    fn late_claim_is_discarded() {
        let block = candidate("A");
        let race = Race::default();
        assert!(race.slot.claim(Claim {
            nonce: u64::MAX,
            worker: 9
        }));
        search(&block, 0, 0, 0, 1, &race);
        assert_eq!(race.discarded.load(Ordering::Relaxed), 1);
        assert_eq!(race.slot.winner().map(|c| c.worker), Some(9));
    }

    #[test]
    fn search_ends_at_top_of_nonce_space() {
        let block = candidate("A");
        let race = Race::default();
        // One probe at u64::MAX - 1, then the next step would overflow.
        let probes = search(&block, MAX_DIFFICULTY, 0, u64::MAX - 1, 2, &race);
        assert_eq!(probes, 1);
        assert!(race.slot.winner().is_none());
        assert!(!race.stop.is_raised());
    }

    #[test]
    fn mine_block_reports_elapsed_time() {
        let (block, elapsed) = mine_block("timed", 2, 2).unwrap();
        assert!(block.is_valid(2));
        assert!(elapsed > Duration::ZERO);
    }
}
