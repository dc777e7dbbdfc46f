use log::warn;
use serde::{Deserialize, Serialize};

use super::{Block, BlockHash, GENESIS_PAYLOAD};
use crate::error::{Error, Result};
use crate::mining;

/// Why a block failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationFailure {
    /// Genesis is missing, not at index 0, not linked to the zero digest, or
    /// its digest does not match its fields.
    BadGenesis,
    /// Stored digest differs from a fresh recomputation.
    DigestMismatch,
    /// `previous_hash` differs from the predecessor's stored digest.
    BrokenLink,
    /// Index is not the predecessor's index plus one.
    IndexGap,
}

/// Summary of a full chain validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub length: usize,
    /// Position of the first block that failed, if any.
    pub first_invalid: Option<usize>,
    pub reason: Option<ValidationFailure>,
}

impl ValidationReport {
    fn ok(length: usize) -> Self {
        Self {
            valid: true,
            length,
            first_invalid: None,
            reason: None,
        }
    }

    fn failed(length: usize, position: usize, reason: ValidationFailure) -> Self {
        warn!("chain invalid at block #{position}: {reason:?}");
        Self {
            valid: false,
            length,
            first_invalid: Some(position),
            reason: Some(reason),
        }
    }
}

/// Simple in-memory, append-only blockchain with Proof-of-Work.
#[derive(Debug, Clone, Serialize)]
pub struct Blockchain {
    pub(crate) chain: Vec<Block>,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    /// Initialize a new blockchain with the standard genesis block.
    pub fn new() -> Self {
        Self::with_genesis_payload(GENESIS_PAYLOAD)
    }

    pub fn with_genesis_payload(payload: impl Into<String>) -> Self {
        Self {
            chain: vec![Self::genesis(payload)],
        }
    }

    /// The fixed first block: sealed without PoW, linked to the zero digest.
    pub fn genesis(payload: impl Into<String>) -> Block {
        Block::genesis(payload)
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> Option<&Block> {
        self.chain.last()
    }

    /// Mine a block carrying `payload` on top of the current tail and append it.
    ///
    /// The freshly mined block is trusted; integrity is only checked by
    /// [`Blockchain::validate`].
    pub fn append(
        &mut self,
        payload: impl Into<String>,
        difficulty: u32,
        worker_count: usize,
    ) -> Result<&Block> {
        let tail = self.last_block().ok_or(Error::EmptyChain)?;
        let candidate = Block::now(tail.index() + 1, *tail.hash(), payload);

        let block = mining::mine(candidate, difficulty, worker_count)?;
        self.chain.push(block);
        self.last_block().ok_or(Error::EmptyChain)
    }

    /// Whether every digest and every link in the chain checks out.
    pub fn validate(&self) -> bool {
        self.validation_report().valid
    }

    /// Validate the entire chain and report the first failing block.
    pub fn validation_report(&self) -> ValidationReport {
        let length = self.chain.len();

        let Some(genesis) = self.chain.first() else {
            return ValidationReport::failed(length, 0, ValidationFailure::BadGenesis);
        };
        if genesis.index() != 0
            || genesis.previous_hash() != &BlockHash::ZERO
            || !genesis.has_intact_digest()
        {
            return ValidationReport::failed(length, 0, ValidationFailure::BadGenesis);
        }

        for (i, pair) in self.chain.windows(2).enumerate() {
            let (prev, current) = (&pair[0], &pair[1]);
            let position = i + 1;

            if !current.has_intact_digest() {
                return ValidationReport::failed(length, position, ValidationFailure::DigestMismatch);
            }
            if current.previous_hash() != prev.hash() {
                return ValidationReport::failed(length, position, ValidationFailure::BrokenLink);
            }
            if current.index() != prev.index() + 1 {
                return ValidationReport::failed(length, position, ValidationFailure::IndexGap);
            }
        }

        ValidationReport::ok(length)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn get(&self, position: usize) -> Option<&Block> {
        self.chain.get(position)
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}
