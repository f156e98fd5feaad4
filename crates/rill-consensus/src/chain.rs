//! The chain validator (§4.G): pending-pool bookkeeping, mining, and
//! whole-chain validation over rill-core's block/transaction/UTXO types.

use tracing::info;

use rill_core::block::Block;
use rill_core::constants::{DEFAULT_MAX_MINING_ATTEMPTS, ZERO_HASH_HEX};
use rill_core::error::{BlockError, ChainError, RillError};
use rill_core::tx::Transaction;
use rill_core::utxo::UTXOSet;

fn now_unix() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// An append-only chain of blocks plus the UTXO set and pending pool it
/// maintains (§3, §5). Single-threaded and synchronous: callers must
/// serialize access externally.
#[derive(Debug, Clone)]
pub struct Chain {
    blocks: Vec<Block>,
    pending: Vec<Transaction>,
    utxo_set: UTXOSet,
    difficulty: u32,
    mining_reward: u64,
    max_mining_attempts: u64,
}

impl Chain {
    /// Construct a chain and produce its genesis block, funding
    /// `genesis_address` with `genesis_amount` (§3: "the first block is
    /// produced at chain construction and funds a distinguished genesis
    /// output").
    pub fn new(genesis_address: impl Into<String>, genesis_amount: u64, difficulty: u32, mining_reward: u64) -> Self {
        let genesis_tx = Transaction::coinbase(genesis_address, genesis_amount, 0);
        // The genesis block carries no proof-of-work obligation of its own;
        // it is accepted by construction, not mined.
        let genesis_block = Block::new(0, 0, vec![genesis_tx], ZERO_HASH_HEX, 0);

        let mut utxo_set = UTXOSet::new();
        utxo_set.apply_transaction(&genesis_block.transactions[0]);

        info!(genesis_hash = %genesis_block.hash, "chain constructed");

        Self {
            blocks: vec![genesis_block],
            pending: Vec::new(),
            utxo_set,
            difficulty,
            mining_reward,
            max_mining_attempts: DEFAULT_MAX_MINING_ATTEMPTS,
        }
    }

    pub fn with_max_mining_attempts(mut self, max_mining_attempts: u64) -> Self {
        self.max_mining_attempts = max_mining_attempts;
        self
    }

    pub fn tip(&self) -> &Block {
        self.blocks.last().expect("chain always has a genesis block")
    }

    pub fn height(&self) -> u64 {
        self.blocks.len() as u64 - 1
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn utxo_set(&self) -> &UTXOSet {
        &self.utxo_set
    }

    pub fn balance_of(&self, address: &str) -> u64 {
        self.utxo_set.balance_of(address)
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Validate `tx` against the current UTXO set and, on success, append it
    /// to the pending pool (§4.G). Coinbase-shaped transactions bypass
    /// input validation entirely.
    pub fn add_transaction(&mut self, tx: Transaction) -> Result<(), RillError> {
        tx.validate(&self.utxo_set)?;
        self.pending.push(tx);
        Ok(())
    }

    /// Assemble a coinbase plus the pending pool into a new block, mine it,
    /// and on success atomically append it to the chain, apply its
    /// transactions to the UTXO set, and clear the pending pool (§4.G, §7:
    /// partial state is never observable — either the whole step succeeds
    /// or nothing changes).
    pub fn mine_pending(&mut self, miner_address: impl Into<String>) -> Result<&Block, BlockError> {
        let timestamp = now_unix();
        let mut transactions = Vec::with_capacity(1 + self.pending.len());
        transactions.push(Transaction::coinbase(miner_address, self.mining_reward, timestamp as u32));
        transactions.extend(self.pending.iter().cloned());

        let tip = self.tip();
        let block = Block::mine(
            tip.index + 1,
            timestamp,
            transactions,
            tip.hash.clone(),
            self.difficulty,
            self.max_mining_attempts,
        )?;

        for tx in &block.transactions {
            self.utxo_set.apply_transaction(tx);
        }
        self.pending.clear();
        self.blocks.push(block);

        info!(height = self.height(), "block mined and applied");
        Ok(self.tip())
    }

    /// Whole-chain validity check (§4.G, S6): for every block after
    /// genesis, its stored hash must match its recomputed hash, its
    /// `previous_hash` must link to the prior block's stored hash, and its
    /// hash must meet its declared difficulty. Short-circuits on the first
    /// failure — a tampered block 1 is reported without ever inspecting
    /// block 2.
    pub fn is_chain_valid(&self) -> Result<(), ChainError> {
        if self.blocks.is_empty() {
            return Err(ChainError::EmptyChain);
        }
        for i in 1..self.blocks.len() {
            let block = &self.blocks[i];
            let prev = &self.blocks[i - 1];

            if block.previous_hash != prev.hash {
                return Err(ChainError::InvalidBlock(i as u64));
            }
            if block.validate_self().is_err() {
                return Err(ChainError::InvalidBlock(i as u64));
            }
        }
        Ok(())
    }
}
