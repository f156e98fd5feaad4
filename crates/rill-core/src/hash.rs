//! Hash primitives used throughout the protocol.
//!
//! `sha256` and `double_sha256` back transaction/block hashing (§4.E, §4.F);
//! `hash160` backs pubkey-hash script templates (§4.D).

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// SHA-256 applied twice, Bitcoin's standard hash for transactions and
/// block headers.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// RIPEMD-160(SHA-256(data)), Bitcoin's pubkey-hash construction.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = sha256(data);
    Ripemd160::digest(sha).into()
}

/// Hex-encode a hash for display, serialization, and the canonical wire
/// formats in §6 (previous_hash, tx_hash fields are ASCII hex).
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}
