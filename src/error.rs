//! Error types for mining and chain construction.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Rejected before any worker starts; values are never clamped.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("block #{index} is already sealed")]
    AlreadySealed { index: u64 },

    #[error("nonce space exhausted without a digest meeting difficulty {difficulty}")]
    NonceSpaceExhausted { difficulty: u32 },

    #[error("chain has no genesis block")]
    EmptyChain,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
