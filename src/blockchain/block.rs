use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::hasher::{self, BlockHash};
use crate::error::{Error, Result};

/// A single block in the chain carrying an opaque payload.
///
/// A block starts unsealed with `nonce = 0`. Mining probes candidate nonces
/// through [`Block::recompute_digest`], which never mutates the block, and the
/// winning nonce is committed exactly once through [`Block::seal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub(crate) index: u64,
    pub(crate) previous_hash: BlockHash,
    pub(crate) timestamp: i64, // Unix milliseconds (UTC)
    pub(crate) payload: String,
    pub(crate) nonce: u64,
    pub(crate) hash: BlockHash, // Cached digest over the fields above
    #[serde(default)]
    pub(crate) sealed: bool,
}

impl Block {
    /// Create an unsealed block with `nonce = 0` and its digest already computed.
    pub fn new(
        index: u64,
        previous_hash: BlockHash,
        timestamp: i64,
        payload: impl Into<String>,
    ) -> Self {
        let mut block = Self {
            index,
            previous_hash,
            timestamp,
            payload: payload.into(),
            nonce: 0,
            hash: BlockHash::ZERO,
            sealed: false,
        };
        block.hash = block.recompute_digest(0);
        block
    }

    /// Like [`Block::new`], stamped with the current time.
    pub fn now(index: u64, previous_hash: BlockHash, payload: impl Into<String>) -> Self {
        Self::new(index, previous_hash, Utc::now().timestamp_millis(), payload)
    }

    /// Create the genesis block. It is sealed unconditionally, without PoW,
    /// and links to [`BlockHash::ZERO`].
    pub fn genesis(payload: impl Into<String>) -> Self {
        let mut block = Self::now(0, BlockHash::ZERO, payload);
        block.sealed = true;
        block
    }

    /// Digest of this block's fixed fields combined with `nonce`.
    pub fn recompute_digest(&self, nonce: u64) -> BlockHash {
        hasher::digest(
            self.index,
            &self.previous_hash,
            self.timestamp,
            self.payload.as_bytes(),
            nonce,
        )
    }

    /// Commit the winning nonce. Fails if the block was already sealed.
    pub fn seal(&mut self, nonce: u64) -> Result<()> {
        if self.sealed {
            return Err(Error::AlreadySealed { index: self.index });
        }
        self.nonce = nonce;
        self.hash = self.recompute_digest(nonce);
        self.sealed = true;
        Ok(())
    }

    /// Whether the cached digest matches a fresh recomputation.
    pub fn has_intact_digest(&self) -> bool {
        self.hash == self.recompute_digest(self.nonce)
    }

    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        self.hash.meets_difficulty(difficulty)
    }

    /// Digest integrity plus PoW. Chain linkage is not checked here.
    pub fn is_valid(&self, difficulty: u32) -> bool {
        self.has_intact_digest() && self.meets_difficulty(difficulty)
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn previous_hash(&self) -> &BlockHash {
        &self.previous_hash
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn hash(&self) -> &BlockHash {
        &self.hash
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }
}
