//! The unspent-transaction-output set (§3, §4.E).

use std::collections::BTreeMap;

use crate::tx::{Transaction, TxOutput};

/// A pointer to a specific output: `(tx_hash, output_index)`.
pub type Outpoint = (String, u32);

/// Mapping from outpoint to the output it still holds, unspent.
#[derive(Debug, Clone, Default)]
pub struct UTXOSet {
    entries: BTreeMap<Outpoint, TxOutput>,
}

impl UTXOSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tx_hash: impl Into<String>, index: u32, output: TxOutput) {
        self.entries.insert((tx_hash.into(), index), output);
    }

    pub fn remove(&mut self, tx_hash: &str, index: u32) -> Option<TxOutput> {
        self.entries.remove(&(tx_hash.to_string(), index))
    }

    pub fn get(&self, tx_hash: &str, index: u32) -> Option<&TxOutput> {
        self.entries.get(&(tx_hash.to_string(), index))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn balance_of(&self, address: &str) -> u64 {
        self.entries
            .values()
            .filter(|o| o.recipient == address)
            .map(|o| o.amount)
            .sum()
    }

    pub fn utxos_of(&self, address: &str) -> Vec<(Outpoint, &TxOutput)> {
        self.entries
            .iter()
            .filter(|(_, o)| o.recipient == address)
            .map(|(k, v)| (k.clone(), v))
            .collect()
    }

    pub fn total_value(&self) -> u64 {
        self.entries.values().map(|o| o.amount).sum()
    }

    /// Apply a confirmed transaction: delete every outpoint it spends
    /// (skipping the coinbase input), then insert its new outputs (§4.E).
    pub fn apply_transaction(&mut self, tx: &Transaction) {
        if !tx.is_coinbase() {
            for input in &tx.inputs {
                self.remove(&input.prev_tx_hash, input.prev_output_index);
            }
        }
        for (index, output) in tx.outputs.iter().enumerate() {
            self.add(tx.tx_hash.clone(), index as u32, output.clone());
        }
    }
}
