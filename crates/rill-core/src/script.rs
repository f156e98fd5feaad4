//! Script model: wire serialization of push items and opcodes (§4.B).

use crate::error::ScriptError;
use crate::opcode::Opcode;

/// One item in a script: either an instruction or a push payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptItem {
    Op(Opcode),
    Push(Vec<u8>),
}

/// An ordered sequence of script items.
///
/// Invariant: `Script::deserialize(&s.serialize()) == Ok(s)` for any
/// well-formed script (§3, invariant 2 of §8).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Script {
    items: Vec<ScriptItem>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<ScriptItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ScriptItem] {
        &self.items
    }

    pub fn push_op(&mut self, op: Opcode) -> &mut Self {
        self.items.push(ScriptItem::Op(op));
        self
    }

    pub fn push_bytes(&mut self, data: impl Into<Vec<u8>>) -> &mut Self {
        self.items.push(ScriptItem::Push(data.into()));
        self
    }

    pub fn push_small_int(&mut self, n: u8) -> &mut Self {
        debug_assert!((1..=16).contains(&n));
        self.items
            .push(ScriptItem::Op(Opcode::small_int(n).expect("n in 1..=16")));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Concatenate two scripts (the usual way an unlocking script is
    /// combined with a locking script before execution).
    pub fn concat(mut self, other: Script) -> Script {
        self.items.extend(other.items);
        self
    }

    /// Serialize per §4.B's push-length rules.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for item in &self.items {
            match item {
                ScriptItem::Op(op) => out.push(op.to_byte()),
                ScriptItem::Push(data) => {
                    let len = data.len();
                    if len < 76 {
                        out.push(len as u8);
                    } else if len <= 0xff {
                        out.push(0x4c);
                        out.push(len as u8);
                    } else if len <= 0xffff {
                        out.push(0x4d);
                        out.extend_from_slice(&(len as u16).to_le_bytes());
                    } else {
                        out.push(0x4e);
                        out.extend_from_slice(&(len as u32).to_le_bytes());
                    }
                    out.extend_from_slice(data);
                }
            }
        }
        out
    }

    /// Inverse of [`serialize`](Self::serialize). Fails with
    /// [`ScriptError::TruncatedPush`] on a push whose declared length runs
    /// past the end of the buffer, and [`ScriptError::UnknownOpcode`] on an
    /// opcode byte with no assigned meaning.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, ScriptError> {
        let mut items = Vec::new();
        let mut pos = 0usize;

        while pos < bytes.len() {
            let byte = bytes[pos];
            if byte < 76 {
                let len = byte as usize;
                pos += 1;
                let payload = take(bytes, pos, len)?;
                items.push(ScriptItem::Push(payload.to_vec()));
                pos += len;
            } else if byte == 0x4c {
                pos += 1;
                let len = take(bytes, pos, 1)?[0] as usize;
                pos += 1;
                let payload = take(bytes, pos, len)?;
                items.push(ScriptItem::Push(payload.to_vec()));
                pos += len;
            } else if byte == 0x4d {
                pos += 1;
                let len_bytes = take(bytes, pos, 2)?;
                let len = u16::from_le_bytes([len_bytes[0], len_bytes[1]]) as usize;
                pos += 2;
                let payload = take(bytes, pos, len)?;
                items.push(ScriptItem::Push(payload.to_vec()));
                pos += len;
            } else if byte == 0x4e {
                pos += 1;
                let len_bytes = take(bytes, pos, 4)?;
                let len = u32::from_le_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]])
                    as usize;
                pos += 4;
                let payload = take(bytes, pos, len)?;
                items.push(ScriptItem::Push(payload.to_vec()));
                pos += len;
            } else {
                let op = Opcode::from_byte(byte).ok_or(ScriptError::UnknownOpcode(byte))?;
                items.push(ScriptItem::Op(op));
                pos += 1;
            }
        }

        Ok(Script { items })
    }
}

fn take(bytes: &[u8], pos: usize, len: usize) -> Result<&[u8], ScriptError> {
    bytes
        .get(pos..pos + len)
        .ok_or(ScriptError::TruncatedPush(pos))
}
