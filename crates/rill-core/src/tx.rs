//! Transactions and the canonical hashing serialization (§4.E).

use serde::{Deserialize, Serialize};

use crate::constants::ZERO_HASH_HEX;
use crate::error::TransactionError;
use crate::hash::{double_sha256, to_hex};
use crate::sig;
use crate::utxo::UTXOSet;

/// The coinbase input's sentinel previous-output index.
pub const COINBASE_OUTPUT_INDEX: u32 = 0xFFFF_FFFF;

/// One spend reference plus the proof authorizing it.
#[derive(Debug, Clone, Serialize, Deserialize, bincode::Encode, bincode::Decode, PartialEq, Eq)]
pub struct TxInput {
    /// Ascii-hex hash of the transaction that created the referenced output.
    pub prev_tx_hash: String,
    pub prev_output_index: u32,
    pub signature: Vec<u8>,
    pub public_key: Vec<u8>,
}

impl TxInput {
    pub fn is_coinbase(&self) -> bool {
        self.prev_tx_hash == ZERO_HASH_HEX && self.prev_output_index == COINBASE_OUTPUT_INDEX
    }
}

/// A payment to an opaque address (§3: addresses only support equality).
#[derive(Debug, Clone, Serialize, Deserialize, bincode::Encode, bincode::Decode, PartialEq, Eq)]
pub struct TxOutput {
    pub amount: u64,
    pub recipient: String,
}

/// A signed (or coinbase) transaction.
#[derive(Debug, Clone, Serialize, Deserialize, bincode::Encode, bincode::Decode, PartialEq, Eq)]
pub struct Transaction {
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub timestamp: u32,
    pub tx_hash: String,
}

/// A minimal keypair/address binding used by [`Transaction::sign_inputs`].
/// Address encoding niceties (Base58/Bech32) are out of scope (§1); an
/// address here is whatever opaque string the caller already assigned.
#[derive(Debug, Clone)]
pub struct Wallet {
    pub address: String,
    pub priv_key: Vec<u8>,
}

impl Wallet {
    pub fn new(address: impl Into<String>, priv_key: Vec<u8>) -> Self {
        Self {
            address: address.into(),
            priv_key,
        }
    }

    pub fn pub_key(&self) -> Vec<u8> {
        sig::derive_public_key(&self.priv_key)
    }
}

impl Transaction {
    /// Build a transaction and compute its hash.
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>, timestamp: u32) -> Self {
        let mut tx = Self {
            inputs,
            outputs,
            timestamp,
            tx_hash: String::new(),
        };
        tx.recompute_hash();
        tx
    }

    /// Build the distinguished coinbase transaction for a mined block.
    pub fn coinbase(recipient: impl Into<String>, reward: u64, timestamp: u32) -> Self {
        let input = TxInput {
            prev_tx_hash: ZERO_HASH_HEX.to_string(),
            prev_output_index: COINBASE_OUTPUT_INDEX,
            signature: Vec::new(),
            public_key: Vec::new(),
        };
        let output = TxOutput {
            amount: reward,
            recipient: recipient.into(),
        };
        Self::new(vec![input], vec![output], timestamp)
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].is_coinbase()
    }

    /// Canonical unsigned serialization (§4.E, §6): signatures and public
    /// keys are deliberately excluded so the hash is stable across signing.
    ///
    /// Layout: `timestamp:u32 LE | input_count:u32 LE | (prev_tx_hash:64
    /// ascii bytes | prev_output_index:u32 LE)* | output_count:u32 LE |
    /// (amount:u64 LE | recipient_len:u32 LE | recipient_ascii)*`.
    pub fn serialize_for_hashing(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.timestamp.to_le_bytes());
        out.extend_from_slice(&(self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            out.extend_from_slice(input.prev_tx_hash.as_bytes());
            out.extend_from_slice(&input.prev_output_index.to_le_bytes());
        }
        out.extend_from_slice(&(self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            out.extend_from_slice(&output.amount.to_le_bytes());
            let recipient = output.recipient.as_bytes();
            out.extend_from_slice(&(recipient.len() as u32).to_le_bytes());
            out.extend_from_slice(recipient);
        }
        out
    }

    pub fn recompute_hash(&mut self) {
        self.tx_hash = to_hex(&double_sha256(&self.serialize_for_hashing()));
    }

    /// Sign every input whose referenced UTXO belongs to `wallet`'s address
    /// (§4.E). Recomputes `tx_hash` afterward — harmless, since signatures
    /// aren't part of the hashed payload, but keeps the invariant obvious
    /// at call sites.
    pub fn sign_inputs(&mut self, wallet: &Wallet, utxo_set: &UTXOSet) {
        let message = self.serialize_for_hashing();
        let pub_key = wallet.pub_key();
        for input in &mut self.inputs {
            if input.is_coinbase() {
                continue;
            }
            let Some(utxo) = utxo_set.get(&input.prev_tx_hash, input.prev_output_index) else {
                continue;
            };
            if utxo.recipient != wallet.address {
                continue;
            }
            input.signature = sig::sign(&wallet.priv_key, &message);
            input.public_key = pub_key.clone();
        }
        self.recompute_hash();
    }

    /// True iff every non-coinbase input carries a non-empty signature and
    /// public key, its referenced UTXO exists, and the verifier accepts
    /// (§4.E).
    pub fn verify_signatures(&self, utxo_set: &UTXOSet) -> bool {
        let message = self.serialize_for_hashing();
        for input in &self.inputs {
            if input.is_coinbase() {
                continue;
            }
            if input.signature.is_empty() || input.public_key.is_empty() {
                return false;
            }
            let Some(_utxo) = utxo_set.get(&input.prev_tx_hash, input.prev_output_index) else {
                return false;
            };
            if !sig::verify(&input.public_key, &message, &input.signature) {
                return false;
            }
        }
        true
    }

    /// Validate against the chain validator's per-transaction rules
    /// (§4.G): referenced UTXOs exist, outputs don't exceed the sum of
    /// referenced input amounts, and signatures verify. Coinbase
    /// transactions bypass input validation entirely.
    pub fn validate(&self, utxo_set: &UTXOSet) -> Result<(), TransactionError> {
        if self.inputs.is_empty() || self.outputs.is_empty() {
            return Err(TransactionError::EmptyInputsOrOutputs);
        }
        for (i, output) in self.outputs.iter().enumerate() {
            if output.amount == 0 {
                return Err(TransactionError::ZeroValueOutput(i));
            }
        }

        if self.is_coinbase() {
            return Ok(());
        }

        let mut seen = std::collections::HashSet::new();
        let mut input_total: u64 = 0;
        for input in &self.inputs {
            let key = format!("{}:{}", input.prev_tx_hash, input.prev_output_index);
            if !seen.insert(key.clone()) {
                return Err(TransactionError::DuplicateInput(key));
            }
            let utxo = utxo_set
                .get(&input.prev_tx_hash, input.prev_output_index)
                .ok_or_else(|| TransactionError::UnknownUtxo(key))?;
            input_total = input_total
                .checked_add(utxo.amount)
                .ok_or(TransactionError::ValueOverflow)?;
        }

        let output_total: u64 = self
            .outputs
            .iter()
            .try_fold(0u64, |acc, o| acc.checked_add(o.amount))
            .ok_or(TransactionError::ValueOverflow)?;

        if output_total > input_total {
            return Err(TransactionError::OutputsExceedInputs {
                inputs: input_total,
                outputs: output_total,
            });
        }

        if !self.verify_signatures(utxo_set) {
            return Err(TransactionError::InvalidSignature { index: 0 });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utxo::UTXOSet;

    #[test]
    fn hash_is_stable_across_signing() {
        let mut utxos = UTXOSet::new();
        let wallet = Wallet::new("alice", vec![0x01; 32]);
        utxos.add(
            "a".repeat(64),
            0,
            TxOutput {
                amount: 1000,
                recipient: "alice".to_string(),
            },
        );

        let mut tx = Transaction::new(
            vec![TxInput {
                prev_tx_hash: "a".repeat(64),
                prev_output_index: 0,
                signature: Vec::new(),
                public_key: Vec::new(),
            }],
            vec![TxOutput {
                amount: 900,
                recipient: "bob".to_string(),
            }],
            1000,
        );
        let hash_before = tx.tx_hash.clone();
        tx.sign_inputs(&wallet, &utxos);
        assert_eq!(tx.tx_hash, hash_before);
        assert!(!tx.inputs[0].signature.is_empty());
    }

    #[test]
    fn coinbase_has_no_inputs_to_sign() {
        let tx = Transaction::coinbase("miner", 50_0000_0000, 0);
        assert!(tx.is_coinbase());
        let utxos = UTXOSet::new();
        assert!(tx.verify_signatures(&utxos));
        assert!(tx.validate(&utxos).is_ok());
    }

    #[test]
    fn sign_inputs_only_signs_owned_utxos() {
        let mut utxos = UTXOSet::new();
        utxos.add(
            "a".repeat(64),
            0,
            TxOutput {
                amount: 1000,
                recipient: "alice".to_string(),
            },
        );
        utxos.add(
            "b".repeat(64),
            0,
            TxOutput {
                amount: 2000,
                recipient: "carol".to_string(),
            },
        );
        let wallet = Wallet::new("alice", vec![0x01; 32]);

        let mut tx = Transaction::new(
            vec![
                TxInput {
                    prev_tx_hash: "a".repeat(64),
                    prev_output_index: 0,
                    signature: Vec::new(),
                    public_key: Vec::new(),
                },
                TxInput {
                    prev_tx_hash: "b".repeat(64),
                    prev_output_index: 0,
                    signature: Vec::new(),
                    public_key: Vec::new(),
                },
            ],
            vec![TxOutput {
                amount: 500,
                recipient: "bob".to_string(),
            }],
            1000,
        );
        tx.sign_inputs(&wallet, &utxos);
        assert!(!tx.inputs[0].signature.is_empty());
        assert!(tx.inputs[1].signature.is_empty());
    }

    #[test]
    fn full_sign_verify_validate_round_trip() {
        let mut utxos = UTXOSet::new();
        let wallet = Wallet::new("alice", vec![0x09; 32]);
        utxos.add(
            "a".repeat(64),
            0,
            TxOutput {
                amount: 1000,
                recipient: "alice".to_string(),
            },
        );

        let mut tx = Transaction::new(
            vec![TxInput {
                prev_tx_hash: "a".repeat(64),
                prev_output_index: 0,
                signature: Vec::new(),
                public_key: Vec::new(),
            }],
            vec![TxOutput {
                amount: 1000,
                recipient: "bob".to_string(),
            }],
            1000,
        );
        tx.sign_inputs(&wallet, &utxos);
        assert!(tx.verify_signatures(&utxos));
        assert!(tx.validate(&utxos).is_ok());
    }

    #[test]
    fn unsigned_transaction_fails_validation() {
        let mut utxos = UTXOSet::new();
        utxos.add(
            "a".repeat(64),
            0,
            TxOutput {
                amount: 1000,
                recipient: "alice".to_string(),
            },
        );
        let tx = Transaction::new(
            vec![TxInput {
                prev_tx_hash: "a".repeat(64),
                prev_output_index: 0,
                signature: Vec::new(),
                public_key: Vec::new(),
            }],
            vec![TxOutput {
                amount: 1000,
                recipient: "bob".to_string(),
            }],
            1000,
        );
        assert!(tx.validate(&utxos).is_err());
    }

    #[test]
    fn outputs_exceeding_inputs_is_rejected() {
        let mut utxos = UTXOSet::new();
        let wallet = Wallet::new("alice", vec![0x02; 32]);
        utxos.add(
            "a".repeat(64),
            0,
            TxOutput {
                amount: 100,
                recipient: "alice".to_string(),
            },
        );
        let mut tx = Transaction::new(
            vec![TxInput {
                prev_tx_hash: "a".repeat(64),
                prev_output_index: 0,
                signature: Vec::new(),
                public_key: Vec::new(),
            }],
            vec![TxOutput {
                amount: 1000,
                recipient: "bob".to_string(),
            }],
            1000,
        );
        tx.sign_inputs(&wallet, &utxos);
        assert!(matches!(
            tx.validate(&utxos),
            Err(TransactionError::OutputsExceedInputs { .. })
        ));
    }
}
