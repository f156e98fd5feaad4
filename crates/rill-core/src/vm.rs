//! Script VM: a stack machine evaluating spending conditions (§4.C).
//!
//! [`execute`] is the only public entry point. It never returns an error to
//! the caller — per §7's policy, script failures are caught here and turned
//! into a `false` result. The fallible inner walk lives in
//! [`Interpreter::run`] so the opcode handlers can use `?` freely.

use tracing::trace;

use crate::constants::{LOCKTIME_THRESHOLD, MAX_SCRIPT_OPS, MAX_STACK_SIZE};
use crate::error::ScriptError;
use crate::num::{cast_to_bool, decode_num, encode_num};
use crate::opcode::Opcode;
use crate::script::{Script, ScriptItem};
use crate::sig;

/// Transaction context supplied to the VM for signature and timelock
/// opcodes (§3, §6).
#[derive(Debug, Clone)]
pub struct Context {
    /// Canonical bytes signed over. Opaque to the VM.
    pub tx_data: Vec<u8>,
    /// Wall-clock seconds, compared against CLTV thresholds ≥ 500_000_000.
    pub current_time: u64,
    /// Block height, compared against CLTV thresholds < 500_000_000.
    pub block_height: u32,
    /// Relative-lock field for CSV.
    pub sequence: u32,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            tx_data: Vec::new(),
            current_time: now_unix(),
            block_height: 0,
            sequence: 0xFFFF_FFFF,
        }
    }
}

fn now_unix() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Run `script` against `context` and return whether it succeeds.
///
/// Success means no error was raised and the top-of-stack casts to true at
/// the end of the program (§4.C).
pub fn execute(script: &Script, context: &Context) -> bool {
    let result = Interpreter::new(context).run(script);
    match &result {
        Ok(ok) => trace!(ok, items = script.len(), "script executed"),
        Err(err) => trace!(%err, items = script.len(), "script execution failed"),
    }
    matches!(result, Ok(true))
}

/// The stack machine. Construct with [`Interpreter::new`] and drive with
/// [`Interpreter::run`]; both are crate-internal plumbing behind
/// [`execute`].
struct Interpreter<'a> {
    main: Vec<Vec<u8>>,
    alt: Vec<Vec<u8>>,
    cond_stack: Vec<bool>,
    op_count: usize,
    ctx: &'a Context,
}

impl<'a> Interpreter<'a> {
    fn new(ctx: &'a Context) -> Self {
        Self {
            main: Vec::new(),
            alt: Vec::new(),
            cond_stack: Vec::new(),
            op_count: 0,
            ctx,
        }
    }

    /// Whether execution is currently inside a false IF/NOTIF branch.
    fn executing(&self) -> bool {
        self.cond_stack.iter().all(|&b| b)
    }

    fn run(&mut self, script: &Script) -> Result<bool, ScriptError> {
        for item in script.items() {
            match item {
                ScriptItem::Push(data) => {
                    if self.executing() {
                        self.push(data.clone())?;
                    }
                }
                ScriptItem::Op(op) => {
                    self.op_count += 1;
                    if self.op_count > MAX_SCRIPT_OPS {
                        return Err(ScriptError::TooManyOps {
                            count: self.op_count,
                            limit: MAX_SCRIPT_OPS,
                        });
                    }
                    self.dispatch(*op)?;
                }
            }
        }

        if !self.cond_stack.is_empty() {
            return Err(ScriptError::UnterminatedConditional);
        }

        match self.main.last() {
            Some(top) => Ok(cast_to_bool(top)),
            None => Ok(false),
        }
    }

    fn push(&mut self, item: Vec<u8>) -> Result<(), ScriptError> {
        if self.main.len() >= MAX_STACK_SIZE {
            return Err(ScriptError::StackOverflow {
                size: self.main.len() + 1,
                limit: MAX_STACK_SIZE,
            });
        }
        self.main.push(item);
        Ok(())
    }

    fn pop(&mut self) -> Result<Vec<u8>, ScriptError> {
        self.main.pop().ok_or(ScriptError::StackUnderflow {
            need: 1,
            have: 0,
        })
    }

    fn require(&self, need: usize) -> Result<(), ScriptError> {
        if self.main.len() < need {
            return Err(ScriptError::StackUnderflow {
                need,
                have: self.main.len(),
            });
        }
        Ok(())
    }

    fn dispatch(&mut self, op: Opcode) -> Result<(), ScriptError> {
        // Conditional-stack opcodes run regardless of the current branch
        // state (they're what flips it); everything else is a no-op while
        // any enclosing condition is false.
        match op {
            Opcode::If | Opcode::NotIf => {
                let taken = if self.executing() {
                    let top = self.pop()?;
                    cast_to_bool(&top)
                } else {
                    false
                };
                let want = matches!(op, Opcode::If);
                self.cond_stack.push(taken == want);
                return Ok(());
            }
            Opcode::Else => {
                let top = self
                    .cond_stack
                    .last_mut()
                    .ok_or(ScriptError::UnbalancedConditional)?;
                *top = !*top;
                return Ok(());
            }
            Opcode::EndIf => {
                self.cond_stack
                    .pop()
                    .ok_or(ScriptError::UnbalancedConditional)?;
                return Ok(());
            }
            _ => {}
        }

        if !self.executing() {
            return Ok(());
        }

        match op {
            Opcode::If | Opcode::NotIf | Opcode::Else | Opcode::EndIf => unreachable!(),
            Opcode::OpNegate1 => self.push(encode_num(-1))?,
            Opcode::Op1 | Opcode::Op2 | Opcode::Op3 | Opcode::Op4 | Opcode::Op5
            | Opcode::Op6 | Opcode::Op7 | Opcode::Op8 | Opcode::Op9 | Opcode::Op10
            | Opcode::Op11 | Opcode::Op12 | Opcode::Op13 | Opcode::Op14 | Opcode::Op15
            | Opcode::Op16 => {
                let n = op.as_small_int().expect("small-int opcode");
                self.push(encode_num(n as i64))?;
            }
            Opcode::Nop
            | Opcode::Nop1
            | Opcode::Nop4
            | Opcode::Nop5
            | Opcode::Nop6
            | Opcode::Nop7
            | Opcode::Nop8
            | Opcode::Nop9
            | Opcode::Nop10 => {}
            Opcode::Verify => {
                let top = self.pop()?;
                if !cast_to_bool(&top) {
                    return Err(ScriptError::VerifyFailed);
                }
            }
            Opcode::Return => return Err(ScriptError::Return),
            Opcode::Dup => {
                self.require(1)?;
                let top = self.main.last().unwrap().clone();
                self.push(top)?;
            }
            Opcode::TwoDup => {
                self.require(2)?;
                let len = self.main.len();
                let (a, b) = (self.main[len - 2].clone(), self.main[len - 1].clone());
                self.push(a)?;
                self.push(b)?;
            }
            Opcode::ThreeDup => {
                self.require(3)?;
                let len = self.main.len();
                let (a, b, c) = (
                    self.main[len - 3].clone(),
                    self.main[len - 2].clone(),
                    self.main[len - 1].clone(),
                );
                self.push(a)?;
                self.push(b)?;
                self.push(c)?;
            }
            Opcode::Over => {
                self.require(2)?;
                let len = self.main.len();
                let item = self.main[len - 2].clone();
                self.push(item)?;
            }
            Opcode::Drop => {
                self.pop()?;
            }
            Opcode::TwoDrop => {
                self.require(2)?;
                self.pop()?;
                self.pop()?;
            }
            Opcode::Swap => {
                self.require(2)?;
                let len = self.main.len();
                self.main.swap(len - 1, len - 2);
            }
            Opcode::Rot => {
                self.require(3)?;
                let len = self.main.len();
                self.main.swap(len - 3, len - 2);
                self.main.swap(len - 2, len - 1);
            }
            Opcode::Equal => {
                self.require(2)?;
                let b = self.pop()?;
                let a = self.pop()?;
                self.push(if a == b { encode_num(1) } else { Vec::new() })?;
            }
            Opcode::EqualVerify => {
                self.require(2)?;
                let b = self.pop()?;
                let a = self.pop()?;
                if a != b {
                    return Err(ScriptError::EqualVerifyFailed);
                }
            }
            Opcode::OneAdd => {
                let n = decode_num(&self.pop()?);
                self.push(encode_num(n + 1))?;
            }
            Opcode::OneSub => {
                let n = decode_num(&self.pop()?);
                self.push(encode_num(n - 1))?;
            }
            Opcode::Add => {
                self.require(2)?;
                let b = decode_num(&self.pop()?);
                let a = decode_num(&self.pop()?);
                self.push(encode_num(a + b))?;
            }
            Opcode::Sub => {
                self.require(2)?;
                let b = decode_num(&self.pop()?);
                let a = decode_num(&self.pop()?);
                self.push(encode_num(a - b))?;
            }
            Opcode::Sha256 => {
                let data = self.pop()?;
                self.push(crate::hash::sha256(&data).to_vec())?;
            }
            Opcode::Hash160 => {
                let data = self.pop()?;
                self.push(crate::hash::hash160(&data).to_vec())?;
            }
            Opcode::Hash256 => {
                let data = self.pop()?;
                self.push(crate::hash::double_sha256(&data).to_vec())?;
            }
            Opcode::CheckSig => {
                let ok = self.check_sig()?;
                self.push(if ok { encode_num(1) } else { Vec::new() })?;
            }
            Opcode::CheckSigVerify => {
                if !self.check_sig()? {
                    return Err(ScriptError::CheckSigVerifyFailed);
                }
            }
            Opcode::CheckMultiSig => {
                let ok = self.check_multisig()?;
                self.push(if ok { encode_num(1) } else { Vec::new() })?;
            }
            Opcode::CheckLockTimeVerify => {
                self.require(1)?;
                let top = self.main.last().unwrap();
                let locktime = decode_num(top);
                if locktime < 0 {
                    return Err(ScriptError::LockTimeNotSatisfied);
                }
                let satisfied = if (locktime as u64) < LOCKTIME_THRESHOLD {
                    self.ctx.block_height as u64 >= locktime as u64
                } else {
                    self.ctx.current_time >= locktime as u64
                };
                if !satisfied {
                    return Err(ScriptError::LockTimeNotSatisfied);
                }
            }
            Opcode::CheckSequenceVerify => {
                self.require(1)?;
                let top = self.main.last().unwrap();
                let lock = decode_num(top);
                if lock < 0 || lock as u64 > self.ctx.sequence as u64 {
                    return Err(ScriptError::SequenceLockNotSatisfied);
                }
            }
            Opcode::PushData1 | Opcode::PushData2 | Opcode::PushData4 => {
                // Never produced as standalone items by the script model —
                // these bytes are consumed as push-length prefixes during
                // deserialization, not dispatched as opcodes.
                unreachable!("push-data prefixes never reach opcode dispatch")
            }
        }
        Ok(())
    }

    fn check_sig(&mut self) -> Result<bool, ScriptError> {
        self.require(2)?;
        let pubkey = self.pop()?;
        let signature = self.pop()?;
        Ok(sig::verify(&pubkey, &self.ctx.tx_data, &signature))
    }

    /// OP_CHECKMULTISIG (§4.C), including the historical "extra pop" bug:
    /// an additional stack element is popped and discarded before matching
    /// begins, and public keys are matched in the order they come off the
    /// stack (the reverse of their declared, ascending order).
    fn check_multisig(&mut self) -> Result<bool, ScriptError> {
        self.require(1)?;
        let n = decode_num(&self.pop()?);
        if n < 0 {
            return Err(ScriptError::StackUnderflow { need: 0, have: 0 });
        }
        let n = n as usize;
        self.require(n)?;
        let mut pubkeys = Vec::with_capacity(n);
        for _ in 0..n {
            pubkeys.push(self.pop()?);
        }

        self.require(1)?;
        let m = decode_num(&self.pop()?);
        if m < 0 {
            return Err(ScriptError::StackUnderflow { need: 0, have: 0 });
        }
        let m = m as usize;
        self.require(m)?;
        let mut sigs = Vec::with_capacity(m);
        for _ in 0..m {
            sigs.push(self.pop()?);
        }

        // Bug-compatible extra pop.
        self.pop()?;

        let mut ikey = 0usize;
        let mut isig = 0usize;
        while isig < m && ikey < n {
            if m - isig > n - ikey {
                break;
            }
            if sig::verify(&pubkeys[ikey], &self.ctx.tx_data, &sigs[isig]) {
                isig += 1;
            }
            ikey += 1;
        }

        Ok(isig == m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sig;

    fn ctx() -> Context {
        Context::default()
    }

    #[test]
    fn op_1_op_1_op_equal_is_true() {
        let mut s = Script::new();
        s.push_small_int(1).push_small_int(1).push_op(Opcode::Equal);
        assert!(execute(&s, &ctx()));
    }

    #[test]
    fn op_return_always_fails() {
        let mut s = Script::new();
        s.push_small_int(1).push_op(Opcode::Return);
        assert!(!execute(&s, &ctx()));
    }

    #[test]
    fn empty_script_is_false() {
        assert!(!execute(&Script::new(), &ctx()));
    }

    #[test]
    fn unassigned_opcode_byte_is_rejected_at_parse_time() {
        // Unassigned opcode bytes are caught by Script::deserialize, well
        // before the VM would ever see them.
        assert!(Script::deserialize(&[0x62u8]).is_err());
    }

    #[test]
    fn stack_underflow_fails_closed() {
        let mut s = Script::new();
        s.push_op(Opcode::Dup);
        assert!(!execute(&s, &ctx()));
    }

    #[test]
    fn dup_duplicates_top() {
        let mut s = Script::new();
        s.push_bytes(vec![5]).push_op(Opcode::Dup).push_op(Opcode::Equal);
        assert!(execute(&s, &ctx()));
    }

    #[test]
    fn swap_and_sub_yields_positive() {
        let mut s = Script::new();
        s.push_small_int(3)
            .push_small_int(10)
            .push_op(Opcode::Swap)
            .push_op(Opcode::Sub); // 10 - 3
        let mut check = s.clone();
        check.push_small_int(7).push_op(Opcode::Equal);
        assert!(execute(&check, &ctx()));
    }

    #[test]
    fn equalverify_then_verify_true() {
        let mut s = Script::new();
        s.push_bytes(vec![1, 2, 3])
            .push_bytes(vec![1, 2, 3])
            .push_op(Opcode::EqualVerify)
            .push_small_int(1);
        assert!(execute(&s, &ctx()));
    }

    #[test]
    fn equalverify_mismatch_fails() {
        let mut s = Script::new();
        s.push_bytes(vec![1]).push_bytes(vec![2]).push_op(Opcode::EqualVerify);
        assert!(!execute(&s, &ctx()));
    }

    #[test]
    fn hash_opcodes_are_internally_consistent() {
        let mut s = Script::new();
        s.push_bytes(b"rill".to_vec())
            .push_op(Opcode::Sha256)
            .push_bytes(crate::hash::sha256(b"rill").to_vec())
            .push_op(Opcode::Equal);
        assert!(execute(&s, &ctx()));
    }

    #[test]
    fn checksig_roundtrip() {
        let priv_key = [0x11u8; 32];
        let pub_key = sig::derive_public_key(&priv_key);
        let tx_data = b"msg".to_vec();
        let signature = sig::sign(&priv_key, &tx_data);

        let mut s = Script::new();
        s.push_bytes(signature).push_bytes(pub_key).push_op(Opcode::CheckSig);

        let context = Context {
            tx_data,
            ..Context::default()
        };
        assert!(execute(&s, &context));
    }

    #[test]
    fn checksig_tampered_signature_fails() {
        let priv_key = [0x22u8; 32];
        let pub_key = sig::derive_public_key(&priv_key);
        let tx_data = b"msg".to_vec();
        let mut signature = sig::sign(&priv_key, &tx_data);
        signature[0] ^= 0xFF;

        let mut s = Script::new();
        s.push_bytes(signature).push_bytes(pub_key).push_op(Opcode::CheckSig);

        let context = Context {
            tx_data,
            ..Context::default()
        };
        assert!(!execute(&s, &context));
    }

    #[test]
    fn cltv_before_threshold_fails_after_succeeds() {
        let locktime: i64 = 2_000_000_000;
        let mut s = Script::new();
        s.push_bytes(encode_num(locktime))
            .push_op(Opcode::CheckLockTimeVerify)
            .push_op(Opcode::Drop)
            .push_small_int(1);

        let too_early = Context {
            current_time: 1_999_999_999,
            ..Context::default()
        };
        assert!(!execute(&s, &too_early));

        let after = Context {
            current_time: 2_000_000_001,
            ..Context::default()
        };
        assert!(execute(&s, &after));
    }

    #[test]
    fn csv_respects_sequence() {
        let mut s = Script::new();
        s.push_small_int(5)
            .push_op(Opcode::CheckSequenceVerify)
            .push_op(Opcode::Drop)
            .push_small_int(1);

        let enough = Context {
            sequence: 10,
            ..Context::default()
        };
        assert!(execute(&s, &enough));

        let not_enough = Context {
            sequence: 2,
            ..Context::default()
        };
        assert!(!execute(&s, &not_enough));
    }

    #[test]
    fn multisig_two_of_three_ascending_order_succeeds() {
        let privs: [[u8; 32]; 3] = [[1u8; 32], [2u8; 32], [3u8; 32]];
        let pubs: Vec<Vec<u8>> = privs.iter().map(|p| sig::derive_public_key(p)).collect();
        let tx_data = b"msg".to_vec();
        let sig1 = sig::sign(&privs[0], &tx_data);
        let sig2 = sig::sign(&privs[1], &tx_data);

        let mut s = Script::new();
        s.push_bytes(Vec::new()) // OP_0 dummy
            .push_bytes(sig1)
            .push_bytes(sig2)
            .push_small_int(2)
            .push_bytes(pubs[0].clone())
            .push_bytes(pubs[1].clone())
            .push_bytes(pubs[2].clone())
            .push_small_int(3)
            .push_op(Opcode::CheckMultiSig);

        let context = Context {
            tx_data,
            ..Context::default()
        };
        assert!(execute(&s, &context));
    }

    #[test]
    fn multisig_too_few_signatures_fails() {
        let privs: [[u8; 32]; 3] = [[1u8; 32], [2u8; 32], [3u8; 32]];
        let pubs: Vec<Vec<u8>> = privs.iter().map(|p| sig::derive_public_key(p)).collect();
        let tx_data = b"msg".to_vec();
        let sig1 = sig::sign(&privs[0], &tx_data);

        let mut s = Script::new();
        s.push_bytes(Vec::new())
            .push_bytes(sig1)
            .push_small_int(2)
            .push_bytes(pubs[0].clone())
            .push_bytes(pubs[1].clone())
            .push_bytes(pubs[2].clone())
            .push_small_int(3)
            .push_op(Opcode::CheckMultiSig);

        let context = Context {
            tx_data,
            ..Context::default()
        };
        assert!(!execute(&s, &context));
    }

    #[test]
    fn multisig_out_of_order_signatures_fail() {
        let privs: [[u8; 32]; 3] = [[1u8; 32], [2u8; 32], [3u8; 32]];
        let pubs: Vec<Vec<u8>> = privs.iter().map(|p| sig::derive_public_key(p)).collect();
        let tx_data = b"msg".to_vec();
        let sig1 = sig::sign(&privs[0], &tx_data);
        let sig2 = sig::sign(&privs[1], &tx_data);

        let mut s = Script::new();
        s.push_bytes(Vec::new())
            .push_bytes(sig2) // swapped order
            .push_bytes(sig1)
            .push_small_int(2)
            .push_bytes(pubs[0].clone())
            .push_bytes(pubs[1].clone())
            .push_bytes(pubs[2].clone())
            .push_small_int(3)
            .push_op(Opcode::CheckMultiSig);

        let context = Context {
            tx_data,
            ..Context::default()
        };
        assert!(!execute(&s, &context));
    }

    #[test]
    fn if_else_endif_takes_true_branch() {
        let mut s = Script::new();
        s.push_small_int(1)
            .push_op(Opcode::If)
            .push_small_int(7)
            .push_op(Opcode::Else)
            .push_small_int(9)
            .push_op(Opcode::EndIf);
        let mut check = s.clone();
        check.push_small_int(7).push_op(Opcode::Equal);
        assert!(execute(&check, &ctx()));
    }

    #[test]
    fn if_else_endif_takes_false_branch() {
        let mut s = Script::new();
        s.push_bytes(Vec::new()) // false
            .push_op(Opcode::If)
            .push_small_int(7)
            .push_op(Opcode::Else)
            .push_small_int(9)
            .push_op(Opcode::EndIf);
        let mut check = s.clone();
        check.push_small_int(9).push_op(Opcode::Equal);
        assert!(execute(&check, &ctx()));
    }

    #[test]
    fn unterminated_if_fails() {
        let mut s = Script::new();
        s.push_small_int(1).push_op(Opcode::If).push_small_int(7);
        assert!(!execute(&s, &ctx()));
    }

    #[test]
    fn stray_else_fails() {
        let mut s = Script::new();
        s.push_op(Opcode::Else);
        assert!(!execute(&s, &ctx()));
    }

    #[test]
    fn opcode_count_limit_enforced() {
        let mut s = Script::new();
        for _ in 0..(crate::constants::MAX_SCRIPT_OPS + 1) {
            s.push_op(Opcode::Nop);
        }
        assert!(!execute(&s, &ctx()));
    }

    #[test]
    fn stack_size_limit_enforced() {
        let mut s = Script::new();
        for _ in 0..(crate::constants::MAX_STACK_SIZE + 1) {
            s.push_bytes(vec![1]);
        }
        assert!(!execute(&s, &ctx()));
    }
}
