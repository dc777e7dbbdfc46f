//! Parallel proof-of-work search over a partitioned nonce space.

pub mod coordinator;
pub mod slot;

pub use coordinator::{MiningReport, check_params, mine, mine_block, mine_with_report};
pub use slot::{Claim, StopFlag, WinnerSlot};
