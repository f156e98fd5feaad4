//! Opcode enumeration (§4.B, §4.C).
//!
//! Opcode bytes below `0x4c` (76) are not distinct instructions — they are
//! inline push-length prefixes ("push this many following bytes") and are
//! represented as [`crate::script::ScriptItem::Push`] items, never as
//! `Opcode`. `Opcode::from_byte` therefore only accepts bytes ≥ `0x4c`.

/// A single-byte script instruction.
///
/// `OP_0`/`OP_FALSE` and `OP_1`/`OP_TRUE` are aliases sharing one byte value
/// each (§9): the enum has one variant per byte and callers pick whichever
/// name reads best at the call site via the `_FALSE`/`_TRUE` constructors
/// on [`crate::script::Script`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Opcode {
    PushData1,
    PushData2,
    PushData4,
    OpNegate1,
    Op1,
    Op2,
    Op3,
    Op4,
    Op5,
    Op6,
    Op7,
    Op8,
    Op9,
    Op10,
    Op11,
    Op12,
    Op13,
    Op14,
    Op15,
    Op16,
    Nop,
    If,
    NotIf,
    Else,
    EndIf,
    Verify,
    Return,
    Dup,
    TwoDup,
    ThreeDup,
    Over,
    Drop,
    TwoDrop,
    Swap,
    Rot,
    Equal,
    EqualVerify,
    OneAdd,
    OneSub,
    Add,
    Sub,
    Sha256,
    Hash160,
    Hash256,
    CheckSig,
    CheckSigVerify,
    CheckMultiSig,
    CheckLockTimeVerify,
    CheckSequenceVerify,
    Nop1,
    Nop4,
    Nop5,
    Nop6,
    Nop7,
    Nop8,
    Nop9,
    Nop10,
}

impl Opcode {
    /// The literal byte value Bitcoin assigns to this opcode.
    pub const fn to_byte(self) -> u8 {
        match self {
            Opcode::PushData1 => 0x4c,
            Opcode::PushData2 => 0x4d,
            Opcode::PushData4 => 0x4e,
            Opcode::OpNegate1 => 0x4f,
            Opcode::Op1 => 0x51,
            Opcode::Op2 => 0x52,
            Opcode::Op3 => 0x53,
            Opcode::Op4 => 0x54,
            Opcode::Op5 => 0x55,
            Opcode::Op6 => 0x56,
            Opcode::Op7 => 0x57,
            Opcode::Op8 => 0x58,
            Opcode::Op9 => 0x59,
            Opcode::Op10 => 0x5a,
            Opcode::Op11 => 0x5b,
            Opcode::Op12 => 0x5c,
            Opcode::Op13 => 0x5d,
            Opcode::Op14 => 0x5e,
            Opcode::Op15 => 0x5f,
            Opcode::Op16 => 0x60,
            Opcode::Nop => 0x61,
            Opcode::If => 0x63,
            Opcode::NotIf => 0x64,
            Opcode::Else => 0x67,
            Opcode::EndIf => 0x68,
            Opcode::Verify => 0x69,
            Opcode::Return => 0x6a,
            Opcode::Dup => 0x76,
            Opcode::TwoDup => 0x6e,
            Opcode::ThreeDup => 0x6f,
            Opcode::Over => 0x78,
            Opcode::Drop => 0x75,
            Opcode::TwoDrop => 0x6d,
            Opcode::Swap => 0x7c,
            Opcode::Rot => 0x7b,
            Opcode::Equal => 0x87,
            Opcode::EqualVerify => 0x88,
            Opcode::OneAdd => 0x8b,
            Opcode::OneSub => 0x8c,
            Opcode::Add => 0x93,
            Opcode::Sub => 0x94,
            Opcode::Sha256 => 0xa8,
            Opcode::Hash160 => 0xa9,
            Opcode::Hash256 => 0xaa,
            Opcode::CheckSig => 0xac,
            Opcode::CheckSigVerify => 0xad,
            Opcode::CheckMultiSig => 0xae,
            Opcode::CheckLockTimeVerify => 0xb1,
            Opcode::CheckSequenceVerify => 0xb2,
            Opcode::Nop1 => 0xb0,
            Opcode::Nop4 => 0xb3,
            Opcode::Nop5 => 0xb4,
            Opcode::Nop6 => 0xb5,
            Opcode::Nop7 => 0xb6,
            Opcode::Nop8 => 0xb7,
            Opcode::Nop9 => 0xb8,
            Opcode::Nop10 => 0xb9,
        }
    }

    /// Map a byte to its opcode. Returns `None` for bytes below `0x4c`
    /// (push-length prefixes, not opcodes) and for bytes with no assigned
    /// meaning in this enumeration.
    pub const fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0x4c => Opcode::PushData1,
            0x4d => Opcode::PushData2,
            0x4e => Opcode::PushData4,
            0x4f => Opcode::OpNegate1,
            0x51 => Opcode::Op1,
            0x52 => Opcode::Op2,
            0x53 => Opcode::Op3,
            0x54 => Opcode::Op4,
            0x55 => Opcode::Op5,
            0x56 => Opcode::Op6,
            0x57 => Opcode::Op7,
            0x58 => Opcode::Op8,
            0x59 => Opcode::Op9,
            0x5a => Opcode::Op10,
            0x5b => Opcode::Op11,
            0x5c => Opcode::Op12,
            0x5d => Opcode::Op13,
            0x5e => Opcode::Op14,
            0x5f => Opcode::Op15,
            0x60 => Opcode::Op16,
            0x61 => Opcode::Nop,
            0x63 => Opcode::If,
            0x64 => Opcode::NotIf,
            0x67 => Opcode::Else,
            0x68 => Opcode::EndIf,
            0x69 => Opcode::Verify,
            0x6a => Opcode::Return,
            0x76 => Opcode::Dup,
            0x6e => Opcode::TwoDup,
            0x6f => Opcode::ThreeDup,
            0x78 => Opcode::Over,
            0x75 => Opcode::Drop,
            0x6d => Opcode::TwoDrop,
            0x7c => Opcode::Swap,
            0x7b => Opcode::Rot,
            0x87 => Opcode::Equal,
            0x88 => Opcode::EqualVerify,
            0x8b => Opcode::OneAdd,
            0x8c => Opcode::OneSub,
            0x93 => Opcode::Add,
            0x94 => Opcode::Sub,
            0xa8 => Opcode::Sha256,
            0xa9 => Opcode::Hash160,
            0xaa => Opcode::Hash256,
            0xac => Opcode::CheckSig,
            0xad => Opcode::CheckSigVerify,
            0xae => Opcode::CheckMultiSig,
            0xb0 => Opcode::Nop1,
            0xb1 => Opcode::CheckLockTimeVerify,
            0xb2 => Opcode::CheckSequenceVerify,
            0xb3 => Opcode::Nop4,
            0xb4 => Opcode::Nop5,
            0xb5 => Opcode::Nop6,
            0xb6 => Opcode::Nop7,
            0xb7 => Opcode::Nop8,
            0xb8 => Opcode::Nop9,
            0xb9 => Opcode::Nop10,
            _ => return None,
        })
    }

    /// `OP_1` through `OP_16` encode the small integer N via
    /// `0x50 + N`. Returns `None` for opcodes outside that range.
    pub const fn as_small_int(self) -> Option<u8> {
        let byte = self.to_byte();
        if byte >= Opcode::Op1.to_byte() && byte <= Opcode::Op16.to_byte() {
            Some(byte - 0x50)
        } else {
            None
        }
    }

    /// The `OP_<n>` opcode for `1 ..= 16`, used by the multisig templates
    /// (§4.D) to encode M and N.
    pub const fn small_int(n: u8) -> Option<Self> {
        Opcode::from_byte(0x50 + n)
    }
}
