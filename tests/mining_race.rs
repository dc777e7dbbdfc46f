use parallel_pow::{Block, BlockHash, Error, mine, mine_with_report};
use proptest::prelude::*;

fn candidate(index: u64, payload: &str) -> Block {
    Block::new(index, BlockHash::ZERO, 1_700_000_000_000 + index as i64, payload)
}

#[test]
fn eight_workers_never_commit_a_bad_nonce() {
    for run in 0..1000u64 {
        let report = mine_with_report(candidate(run, "race"), 2, 8).unwrap();
        let block = &report.block;

        assert!(block.is_sealed());
        assert!(block.meets_difficulty(2), "run {run}: {}", block.hash());
        assert_eq!(block.hash(), &block.recompute_digest(block.nonce()));
        // The committed nonce lies in the winner's own stride lane.
        assert_eq!(block.nonce() % 8, report.winner as u64);
    }
}

#[test]
fn mined_block_cannot_be_sealed_again() {
    let mut block = mine(candidate(1, "once"), 1, 8).unwrap();
    let nonce = block.nonce();
    assert!(matches!(block.seal(nonce + 1), Err(Error::AlreadySealed { .. })));
    assert_eq!(block.nonce(), nonce);
    assert!(block.has_intact_digest());
}

#[test]
fn difficulty_zero_with_four_workers_seals_nonce_zero() {
    let block = mine(candidate(1, "zero"), 0, 4).unwrap();
    assert_eq!(block.nonce(), 0);
    assert!(block.has_intact_digest());
}

#[test]
fn repeated_runs_all_validate() {
    let fixed = candidate(7, "same payload");
    for workers in 1..=6 {
        for _ in 0..10 {
            let block = mine(fixed.clone(), 2, workers).unwrap();
            assert!(block.is_valid(2));
            assert_eq!(block.payload(), "same payload");
            assert_eq!(block.timestamp(), fixed.timestamp());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn sealed_block_meets_requested_difficulty(
        difficulty in 0u32..=2,
        workers in 1usize..=6,
        payload in "[a-zA-Z0-9 ]{0,32}",
    ) {
        let block = mine(candidate(1, &payload), difficulty, workers).unwrap();
        prop_assert!(block.is_sealed());
        prop_assert!(block.is_valid(difficulty));
        let prefix = "0".repeat(difficulty as usize);
        prop_assert!(block.hash().to_hex().starts_with(&prefix));
    }
}
