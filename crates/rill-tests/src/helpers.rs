//! Shared test helpers for end-to-end and adversarial tests.

use rill_consensus::Chain;
use rill_core::tx::{Transaction, TxInput, TxOutput, Wallet};

pub const COIN: u64 = 100_000_000;

/// A chain with a single genesis output of `amount` sat paid to `address`,
/// difficulty 1 (cheap to mine in tests).
pub fn funded_chain(address: &str, amount: u64) -> Chain {
    Chain::new(address, amount, 1, 50 * COIN)
}

/// Spend `wallet`'s first UTXO on `chain`, paying `to` and returning any
/// remainder to `wallet`'s own address. Panics if the wallet has no UTXOs.
pub fn spend_first_utxo(chain: &Chain, wallet: &Wallet, to: &str, amount: u64) -> Transaction {
    let utxos = chain.utxo_set().utxos_of(&wallet.address);
    let ((prev_tx_hash, prev_output_index), utxo) = utxos.first().cloned().expect("wallet has a spendable utxo");

    let mut outputs = vec![TxOutput {
        amount,
        recipient: to.to_string(),
    }];
    let change = utxo.amount - amount;
    if change > 0 {
        outputs.push(TxOutput {
            amount: change,
            recipient: wallet.address.clone(),
        });
    }

    let mut tx = Transaction::new(
        vec![TxInput {
            prev_tx_hash,
            prev_output_index,
            signature: Vec::new(),
            public_key: Vec::new(),
        }],
        outputs,
        1,
    );
    tx.sign_inputs(wallet, chain.utxo_set());
    tx
}
