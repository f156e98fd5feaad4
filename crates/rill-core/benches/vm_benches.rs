//! Criterion benchmarks for rill-core critical operations.
//!
//! Covers: script VM execution, SHA-256 block hashing, reference-scheme
//! sign/verify, and transaction serialization.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rill_core::block::Block;
use rill_core::hash::hash160;
use rill_core::sig;
use rill_core::templates::{multisig_lock, multisig_unlock, p2pkh_lock, p2pkh_unlock};
use rill_core::tx::{Transaction, TxInput, TxOutput};
use rill_core::vm::{execute, Context};

fn sample_transaction() -> Transaction {
    Transaction::new(
        vec![TxInput {
            prev_tx_hash: "a".repeat(64),
            prev_output_index: 0,
            signature: vec![0u8; 32],
            public_key: vec![0u8; 32],
        }],
        vec![
            TxOutput {
                amount: 50 * 100_000_000,
                recipient: "alice".to_string(),
            },
            TxOutput {
                amount: 25 * 100_000_000,
                recipient: "bob".to_string(),
            },
        ],
        1_700_000_000,
    )
}

fn bench_p2pkh_execute(c: &mut Criterion) {
    let priv_key = [0x11u8; 32];
    let pub_key = sig::derive_public_key(&priv_key);
    let tx_data = b"bench message".to_vec();
    let signature = sig::sign(&priv_key, &tx_data);
    let lock = p2pkh_lock(&hash160(&pub_key));
    let unlock = p2pkh_unlock(signature, pub_key);
    let script = unlock.concat(lock);
    let context = Context {
        tx_data,
        ..Context::default()
    };

    c.bench_function("vm_execute_p2pkh", |b| {
        b.iter(|| execute(black_box(&script), black_box(&context)))
    });
}

fn bench_multisig_execute(c: &mut Criterion) {
    let privs: [[u8; 32]; 3] = [[1u8; 32], [2u8; 32], [3u8; 32]];
    let pubs: Vec<Vec<u8>> = privs.iter().map(|p| sig::derive_public_key(p)).collect();
    let tx_data = b"bench message".to_vec();
    let sig1 = sig::sign(&privs[0], &tx_data);
    let sig2 = sig::sign(&privs[1], &tx_data);
    let lock = multisig_lock(2, &pubs);
    let unlock = multisig_unlock(&[sig1, sig2]);
    let script = unlock.concat(lock);
    let context = Context {
        tx_data,
        ..Context::default()
    };

    c.bench_function("vm_execute_2_of_3_multisig", |b| {
        b.iter(|| execute(black_box(&script), black_box(&context)))
    });
}

fn bench_mining(c: &mut Criterion) {
    let coinbase = Transaction::coinbase("miner", 50 * 100_000_000, 0);

    c.bench_function("mine_difficulty_2", |b| {
        b.iter(|| {
            Block::mine(
                black_box(0),
                black_box(0),
                black_box(vec![coinbase.clone()]),
                black_box(rill_core::constants::ZERO_HASH_HEX),
                black_box(2),
                black_box(10_000_000),
            )
        })
    });
}

fn bench_transaction_serde(c: &mut Criterion) {
    let tx = sample_transaction();
    let encoded = bincode::encode_to_vec(&tx, bincode::config::standard()).expect("encode failed");

    c.bench_function("transaction_serialization", |b| {
        b.iter(|| bincode::encode_to_vec(black_box(&tx), bincode::config::standard()))
    });

    c.bench_function("transaction_deserialization", |b| {
        b.iter(|| {
            let (decoded, _): (Transaction, usize) =
                bincode::decode_from_slice(black_box(&encoded), bincode::config::standard())
                    .expect("decode failed");
            decoded
        })
    });
}

criterion_group!(
    benches,
    bench_p2pkh_execute,
    bench_multisig_execute,
    bench_mining,
    bench_transaction_serde,
);
criterion_main!(benches);
