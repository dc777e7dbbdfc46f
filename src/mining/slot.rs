use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// A winning nonce together with the worker that found it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    pub nonce: u64,
    pub worker: usize,
}

/// Single-writer-wins slot: the first `claim` fills it, every later claim
/// observes it filled and is rejected.
#[derive(Debug, Default)]
pub struct WinnerSlot {
    winner: OnceLock<Claim>,
}

impl WinnerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to register `claim`. Returns `true` only for the one caller whose
    /// claim was stored.
    pub fn claim(&self, claim: Claim) -> bool {
        self.winner.set(claim).is_ok()
    }

    pub fn winner(&self) -> Option<Claim> {
        self.winner.get().copied()
    }

    pub fn into_winner(self) -> Option<Claim> {
        self.winner.into_inner()
    }
}

/// Cooperative stop signal: set once, polled by every worker.
#[derive(Debug, Default)]
pub struct StopFlag(AtomicBool);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[test]
    fn first_claim_wins() {
        let slot = WinnerSlot::new();
        assert!(slot.winner().is_none());
        assert!(slot.claim(Claim { nonce: 7, worker: 3 }));
        assert!(!slot.claim(Claim { nonce: 1, worker: 0 }));
        assert_eq!(slot.winner(), Some(Claim { nonce: 7, worker: 3 }));
    }

    #[test]
    fn exactly_one_concurrent_claim_succeeds() {
        const THREADS: usize = 16;
        for _ in 0..200 {
            let slot = WinnerSlot::new();
            let barrier = Barrier::new(THREADS);
            let successes = AtomicUsize::new(0);

            thread::scope(|s| {
                for worker in 0..THREADS {
                    let (slot, barrier, successes) = (&slot, &barrier, &successes);
                    s.spawn(move || {
                        barrier.wait();
                        let claim = Claim {
                            nonce: worker as u64 * 10,
                            worker,
                        };
                        if slot.claim(claim) {
                            successes.fetch_add(1, Ordering::Relaxed);
                        }
                    });
                }
            });

            assert_eq!(successes.load(Ordering::Relaxed), 1);
            let winner = slot.into_winner().unwrap();
            assert_eq!(winner.nonce, winner.worker as u64 * 10);
        }
    }

    #[test]
    fn stop_flag_is_idempotent() {
        let flag = StopFlag::new();
        assert!(!flag.is_raised());
        flag.raise();
        flag.raise();
        assert!(flag.is_raised());
    }
}
