//! Script templates (§4.D): pure functions building canonical locking and
//! unlocking scripts. None of these touch the VM or the UTXO set — they only
//! assemble [`Script`] values.

use crate::num::encode_num;
use crate::opcode::Opcode;
use crate::script::Script;

/// `OP_DUP OP_HASH160 <pubkey_hash> OP_EQUALVERIFY OP_CHECKSIG`.
pub fn p2pkh_lock(pubkey_hash: &[u8]) -> Script {
    let mut s = Script::new();
    s.push_op(Opcode::Dup)
        .push_op(Opcode::Hash160)
        .push_bytes(pubkey_hash.to_vec())
        .push_op(Opcode::EqualVerify)
        .push_op(Opcode::CheckSig);
    s
}

/// `<signature> <pubkey>`.
pub fn p2pkh_unlock(signature: Vec<u8>, pubkey: Vec<u8>) -> Script {
    let mut s = Script::new();
    s.push_bytes(signature).push_bytes(pubkey);
    s
}

/// `OP_HASH160 <script_hash> OP_EQUAL`.
pub fn p2sh_lock(script_hash: &[u8]) -> Script {
    let mut s = Script::new();
    s.push_op(Opcode::Hash160)
        .push_bytes(script_hash.to_vec())
        .push_op(Opcode::Equal);
    s
}

/// `OP_0 <pubkey_hash>` — the witness-version-0 pubkey-hash program.
pub fn p2wpkh_lock(pubkey_hash: &[u8]) -> Script {
    let mut s = Script::new();
    s.push_bytes(Vec::new()).push_bytes(pubkey_hash.to_vec());
    s
}

/// `OP_0 <script_hash>` — the witness-version-0 script-hash program.
pub fn p2wsh_lock(script_hash: &[u8]) -> Script {
    let mut s = Script::new();
    s.push_bytes(Vec::new()).push_bytes(script_hash.to_vec());
    s
}

/// `OP_<m> <pub_1> .. <pub_n> OP_<n> OP_CHECKMULTISIG`. `n` is taken from
/// `pubkeys.len()`; both `m` and `n` must fall in `1..=16` (§4.D).
pub fn multisig_lock(m: u8, pubkeys: &[Vec<u8>]) -> Script {
    let n = pubkeys.len();
    assert!((1..=16u8).contains(&m), "m must be an OP_1..OP_16 small int");
    assert!((1..=16usize).contains(&n), "n must be an OP_1..OP_16 small int");
    let mut s = Script::new();
    s.push_small_int(m);
    for pubkey in pubkeys {
        s.push_bytes(pubkey.clone());
    }
    s.push_small_int(n as u8).push_op(Opcode::CheckMultiSig);
    s
}

/// `OP_0 <sig_1> .. <sig_m>` — the leading `OP_0` is the historical
/// `OP_CHECKMULTISIG` extra-pop bug-compatibility dummy (§4.D).
pub fn multisig_unlock(signatures: &[Vec<u8>]) -> Script {
    let mut s = Script::new();
    s.push_bytes(Vec::new());
    for sig in signatures {
        s.push_bytes(sig.clone());
    }
    s
}

/// P2PKH guarded by an absolute timelock: `<locktime> OP_CHECKLOCKTIMEVERIFY
/// OP_DROP` prefixed onto [`p2pkh_lock`].
pub fn cltv_p2pkh_lock(locktime: i64, pubkey_hash: &[u8]) -> Script {
    let mut s = Script::new();
    s.push_bytes(encode_num(locktime))
        .push_op(Opcode::CheckLockTimeVerify)
        .push_op(Opcode::Drop);
    s.concat(p2pkh_lock(pubkey_hash))
}

/// P2PKH guarded by a relative timelock: `<sequence>
/// OP_CHECKSEQUENCEVERIFY OP_DROP` prefixed onto [`p2pkh_lock`].
pub fn csv_p2pkh_lock(sequence: i64, pubkey_hash: &[u8]) -> Script {
    let mut s = Script::new();
    s.push_bytes(encode_num(sequence))
        .push_op(Opcode::CheckSequenceVerify)
        .push_op(Opcode::Drop);
    s.concat(p2pkh_lock(pubkey_hash))
}

/// Hash-and-time-locked contract (§9's IF/ELSE open question, resolved by
/// extending the VM with a conditional-execution stack):
///
/// ```text
/// OP_IF
///     OP_HASH160 <hash_lock> OP_EQUALVERIFY
///     OP_DUP OP_HASH160 <recipient_hash> OP_EQUALVERIFY OP_CHECKSIG
/// OP_ELSE
///     <timeout> OP_CHECKLOCKTIMEVERIFY OP_DROP
///     OP_DUP OP_HASH160 <refund_hash> OP_EQUALVERIFY OP_CHECKSIG
/// OP_ENDIF
/// ```
///
/// The claim path spends by revealing `preimage` such that
/// `hash160(preimage) == hash_lock`, signed by the recipient key. The
/// refund path is available once `timeout` has passed, signed by the
/// refund key.
pub fn htlc_lock(hash_lock: &[u8], timeout: i64, recipient_hash: &[u8], refund_hash: &[u8]) -> Script {
    let mut s = Script::new();
    s.push_op(Opcode::If)
        .push_op(Opcode::Hash160)
        .push_bytes(hash_lock.to_vec())
        .push_op(Opcode::EqualVerify)
        .push_op(Opcode::Dup)
        .push_op(Opcode::Hash160)
        .push_bytes(recipient_hash.to_vec())
        .push_op(Opcode::EqualVerify)
        .push_op(Opcode::CheckSig)
        .push_op(Opcode::Else)
        .push_bytes(encode_num(timeout))
        .push_op(Opcode::CheckLockTimeVerify)
        .push_op(Opcode::Drop)
        .push_op(Opcode::Dup)
        .push_op(Opcode::Hash160)
        .push_bytes(refund_hash.to_vec())
        .push_op(Opcode::EqualVerify)
        .push_op(Opcode::CheckSig)
        .push_op(Opcode::EndIf);
    s
}

/// `<signature> <pubkey> <preimage> OP_1` — selects the claim branch.
pub fn htlc_claim_unlock(signature: Vec<u8>, pubkey: Vec<u8>, preimage: Vec<u8>) -> Script {
    let mut s = Script::new();
    s.push_bytes(signature)
        .push_bytes(pubkey)
        .push_bytes(preimage)
        .push_small_int(1);
    s
}

/// `<signature> <pubkey> OP_0` — selects the refund branch.
pub fn htlc_refund_unlock(signature: Vec<u8>, pubkey: Vec<u8>) -> Script {
    let mut s = Script::new();
    s.push_bytes(signature).push_bytes(pubkey).push_bytes(Vec::new());
    s
}
