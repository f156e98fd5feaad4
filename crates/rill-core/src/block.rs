//! Blocks and the leading-zero proof-of-work search (§3, §4.F, §6).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::DEFAULT_MAX_MINING_ATTEMPTS;
use crate::error::BlockError;
use crate::hash::{double_sha256, to_hex};
use crate::tx::Transaction;

/// A mined block: header fields plus its body of transactions.
#[derive(Debug, Clone, Serialize, Deserialize, bincode::Encode, bincode::Decode, PartialEq, Eq)]
pub struct Block {
    pub index: u32,
    pub timestamp: u64,
    pub transactions: Vec<Transaction>,
    pub previous_hash: String,
    pub nonce: u32,
    pub difficulty: u32,
    pub hash: String,
}

impl Block {
    /// Build a block with `nonce = 0` and its hash computed over that
    /// nonce. Callers that need a sealed block should go through
    /// [`Block::mine`] instead.
    pub fn new(
        index: u32,
        timestamp: u64,
        transactions: Vec<Transaction>,
        previous_hash: impl Into<String>,
        difficulty: u32,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp,
            transactions,
            previous_hash: previous_hash.into(),
            nonce: 0,
            difficulty,
            hash: String::new(),
        };
        block.recompute_hash();
        block
    }

    /// Header format (§6): `index:u32 LE | timestamp:u64 LE |
    /// previous_hash: 64 ascii bytes | nonce:u32 LE | difficulty:u32 LE |`
    /// followed by each transaction's hash as 64 ascii bytes, in order.
    pub fn serialize_for_hashing(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.index.to_le_bytes());
        out.extend_from_slice(&self.timestamp.to_le_bytes());
        out.extend_from_slice(self.previous_hash.as_bytes());
        out.extend_from_slice(&self.nonce.to_le_bytes());
        out.extend_from_slice(&self.difficulty.to_le_bytes());
        for tx in &self.transactions {
            out.extend_from_slice(tx.tx_hash.as_bytes());
        }
        out
    }

    pub fn recompute_hash(&mut self) {
        self.hash = to_hex(&double_sha256(&self.serialize_for_hashing()));
    }

    /// Whether `hash` starts with `difficulty` hex zero characters (§3:
    /// leading-zero count is measured in the printable hex form, not bits).
    pub fn meets_difficulty(&self) -> bool {
        let want = self.difficulty as usize;
        self.hash.len() >= want && self.hash.as_bytes()[..want].iter().all(|&b| b == b'0')
    }

    /// Structural + PoW checks a standalone block can make about itself,
    /// without reference to a chain tip (§4.G delegates the linkage check).
    pub fn validate_self(&self) -> Result<(), BlockError> {
        if self.transactions.is_empty() {
            return Err(BlockError::EmptyBlock);
        }
        if !self.transactions[0].is_coinbase() {
            return Err(BlockError::FirstTxNotCoinbase);
        }
        if self.transactions[1..].iter().any(Transaction::is_coinbase) {
            return Err(BlockError::MultipleCoinbase);
        }
        let mut seen = std::collections::HashSet::new();
        for tx in &self.transactions {
            if !seen.insert(tx.tx_hash.clone()) {
                return Err(BlockError::DuplicateTxHash(tx.tx_hash.clone()));
            }
        }
        let mut recomputed = self.clone();
        recomputed.recompute_hash();
        if recomputed.hash != self.hash {
            return Err(BlockError::HashMismatch);
        }
        if !self.meets_difficulty() {
            return Err(BlockError::InsufficientProofOfWork {
                difficulty: self.difficulty,
            });
        }
        Ok(())
    }

    /// Search for a nonce whose hash meets `difficulty`, incrementing from
    /// zero. Bounded by `max_attempts` (§4.F, §5's cooperative-cancellation
    /// requirement); returns [`BlockError::ProofOfWorkNotFound`] on
    /// exhaustion. Deterministic given the header fields and the search
    /// order.
    pub fn mine(
        index: u32,
        timestamp: u64,
        transactions: Vec<Transaction>,
        previous_hash: impl Into<String>,
        difficulty: u32,
        max_attempts: u64,
    ) -> Result<Self, BlockError> {
        let previous_hash = previous_hash.into();
        let mut block = Self {
            index,
            timestamp,
            transactions,
            previous_hash,
            nonce: 0,
            difficulty,
            hash: String::new(),
        };

        for attempt in 0..max_attempts {
            block.nonce = attempt as u32;
            block.recompute_hash();
            if block.meets_difficulty() {
                debug!(index, nonce = block.nonce, attempt, "block mined");
                return Ok(block);
            }
        }

        Err(BlockError::ProofOfWorkNotFound)
    }

    /// [`Self::mine`] with the protocol's default attempt budget.
    pub fn mine_default(
        index: u32,
        timestamp: u64,
        transactions: Vec<Transaction>,
        previous_hash: impl Into<String>,
        difficulty: u32,
    ) -> Result<Self, BlockError> {
        Self::mine(
            index,
            timestamp,
            transactions,
            previous_hash,
            difficulty,
            DEFAULT_MAX_MINING_ATTEMPTS,
        )
    }
}
