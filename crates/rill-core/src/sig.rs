//! Pluggable signature verification (§4.A, §6, §9).
//!
//! The VM and script templates only ever call [`SignatureScheme::sign`] and
//! [`SignatureScheme::verify`] through the trait. [`ReferenceMac`] is the
//! scheme used everywhere in this crate today; it is a deliberately
//! insecure symmetric construction kept interface-compatible with a future
//! real ECDSA/Schnorr swap.
//!
//! # Why the reference scheme is insecure by design
//!
//! `verify(pub, msg, sig)` recomputes `sha256(pub || msg)` and compares —
//! it never needs the private key. That means anyone who knows a public
//! key can forge a valid signature for it. This is intentional and
//! documented: the reference scheme exists so the VM's `OP_CHECKSIG`
//! family has something byte-exact and dependency-free to call, not to
//! model real digital signatures. Swap in a real scheme by implementing
//! [`SignatureScheme`] and threading it through [`crate::tx::sign_inputs`]
//! and [`crate::vm::Interpreter`].

use crate::hash::sha256;

/// Signatures are fixed at 32 bytes under the reference scheme.
pub const SIGNATURE_LEN: usize = 32;

/// A pluggable sign/verify capability.
///
/// `sign` must be deterministic in `(priv_bytes, msg)` — the VM and
/// wallet-side signing code rely on repeatable output for a given key and
/// message so that transaction hashes stay stable across re-signs.
pub trait SignatureScheme {
    /// Derive the public key bytes corresponding to a private key.
    fn derive_public_key(&self, priv_bytes: &[u8]) -> Vec<u8>;

    /// Deterministically sign `msg` with `priv_bytes`.
    fn sign(&self, priv_bytes: &[u8], msg: &[u8]) -> Vec<u8>;

    /// Verify that `sig` is `sign(priv, msg)` for the `priv` corresponding
    /// to `pub_bytes`.
    fn verify(&self, pub_bytes: &[u8], msg: &[u8], sig: &[u8]) -> bool;
}

/// The reference verifier: a symmetric MAC over `(derived pubkey, message)`.
///
/// `derive_public_key(priv) = sha256(priv || b"pubkey")`,
/// `sign(priv, msg) = sha256(derive_public_key(priv) || msg)`,
/// `verify(pub, msg, sig) = sig == sha256(pub || msg)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceMac;

impl SignatureScheme for ReferenceMac {
    fn derive_public_key(&self, priv_bytes: &[u8]) -> Vec<u8> {
        let mut data = priv_bytes.to_vec();
        data.extend_from_slice(b"pubkey");
        sha256(&data).to_vec()
    }

    fn sign(&self, priv_bytes: &[u8], msg: &[u8]) -> Vec<u8> {
        let pubkey = self.derive_public_key(priv_bytes);
        mac(&pubkey, msg)
    }

    fn verify(&self, pub_bytes: &[u8], msg: &[u8], sig: &[u8]) -> bool {
        if sig.len() != SIGNATURE_LEN {
            return false;
        }
        sig == mac(pub_bytes, msg).as_slice()
    }
}

fn mac(pub_bytes: &[u8], msg: &[u8]) -> Vec<u8> {
    let mut data = pub_bytes.to_vec();
    data.extend_from_slice(msg);
    sha256(&data).to_vec()
}

/// Free functions matching §6's external interface exactly
/// (`sign(priv_bytes, msg_bytes) -> sig_bytes`,
/// `verify(pub_bytes, msg_bytes, sig_bytes) -> bool`), backed by
/// [`ReferenceMac`].
pub fn sign(priv_bytes: &[u8], msg: &[u8]) -> Vec<u8> {
    ReferenceMac.sign(priv_bytes, msg)
}

/// See [`sign`].
pub fn verify(pub_bytes: &[u8], msg: &[u8], sig: &[u8]) -> bool {
    ReferenceMac.verify(pub_bytes, msg, sig)
}

/// Derive the reference-scheme public key for a private key.
pub fn derive_public_key(priv_bytes: &[u8]) -> Vec<u8> {
    ReferenceMac.derive_public_key(priv_bytes)
}
