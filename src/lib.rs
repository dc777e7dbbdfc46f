pub mod bench;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod mining;

pub use blockchain::{Block, BlockHash, Blockchain};
pub use error::{Error, Result};
pub use mining::{MiningReport, mine, mine_block, mine_with_report};
