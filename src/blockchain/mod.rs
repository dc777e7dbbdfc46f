pub mod block;
pub mod hasher;
pub mod model;

pub use block::Block;
pub use hasher::{BlockHash, digest};
pub use model::{Blockchain, ValidationFailure, ValidationReport};

/// Default Proof-of-Work difficulty (number of leading hex zeros).
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// A digest has 64 hex characters, so no higher difficulty can be met.
pub const MAX_DIFFICULTY: u32 = 64;

/// Payload of the genesis block.
pub const GENESIS_PAYLOAD: &str = "Genesis Block";
