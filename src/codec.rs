//! Shared instruction encoding contract between the assembler and the
//! interpreter. One instruction is a 32-bit word, `(B_raw << 3) | A`, stored
//! little-endian: a 3-bit opcode tag `A` in bits 0-2 and an operand field `B`
//! in the remaining 29 bits whose width and signedness depend on the opcode.

use std::fmt;

/// Bytes per encoded instruction word.
pub const WORD_BYTES: usize = 4;

/// Width of the opcode tag field.
const TAG_BITS: u32 = 3;
const TAG_MASK: u32 = 0b111;

/// LOAD_CONST carries a signed 8-bit immediate.
pub const IMM_MIN: i64 = -128;
pub const IMM_MAX: i64 = 127;
/// WRITE_MEM carries an unsigned 24-bit address.
pub const ADDR_MAX: i64 = 0xFF_FFFF;

/// The four assigned opcode tags. Tags 4-7 are unassigned.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Opcode {
    WriteMem = 0,
    LoadConst = 1,
    UnarySgn = 2,
    ReadMem = 3,
}

impl Opcode {
    pub fn from_tag(tag: u8) -> Option<Opcode> {
        Some(match tag {
            0 => Opcode::WriteMem,
            1 => Opcode::LoadConst,
            2 => Opcode::UnarySgn,
            3 => Opcode::ReadMem,
            _ => return None,
        })
    }

    /// Mnemonics are matched without case sensitivity.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
        Some(match mnemonic.to_ascii_uppercase().as_str() {
            "WRITE_MEM" => Opcode::WriteMem,
            "LOAD_CONST" => Opcode::LoadConst,
            "UNARY_SGN" => Opcode::UnarySgn,
            "READ_MEM" => Opcode::ReadMem,
            _ => return None,
        })
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::WriteMem => "WRITE_MEM",
            Opcode::LoadConst => "LOAD_CONST",
            Opcode::UnarySgn => "UNARY_SGN",
            Opcode::ReadMem => "READ_MEM",
        }
    }

    /// Operands the mnemonic requires in assembly source.
    pub fn operand_count(self) -> usize {
        match self {
            Opcode::WriteMem | Opcode::LoadConst => 1,
            Opcode::UnarySgn | Opcode::ReadMem => 0,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A single instruction with its operand already narrowed to the legal range.
///
/// `LoadConst` holds its immediate as `i8` and `WriteMem` its address as a
/// 24-bit-checked `u32`, so a constructed instruction always encodes to a
/// valid word.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Instr {
    /// Store the accumulator into the addressed cell.
    WriteMem { addr: u32 },
    /// Load a signed immediate into the accumulator.
    LoadConst { value: i8 },
    /// Replace the accumulator with the sign of the cell it addresses.
    UnarySgn,
    /// Replace the accumulator with the cell it addresses.
    ReadMem,
}

impl Instr {
    pub fn opcode(self) -> Opcode {
        match self {
            Instr::WriteMem { .. } => Opcode::WriteMem,
            Instr::LoadConst { .. } => Opcode::LoadConst,
            Instr::UnarySgn => Opcode::UnarySgn,
            Instr::ReadMem => Opcode::ReadMem,
        }
    }

    /// Pack into a 32-bit word. The signed immediate contributes its raw
    /// 8-bit two's-complement pattern to the operand field.
    pub fn encode(self) -> u32 {
        let raw = match self {
            Instr::WriteMem { addr } => addr,
            Instr::LoadConst { value } => value as u8 as u32,
            Instr::UnarySgn | Instr::ReadMem => 0,
        };
        debug_assert!(raw <= ADDR_MAX as u32);
        (raw << TAG_BITS) | self.opcode() as u32
    }

    /// Decode a word. Structurally this cannot fail; `None` marks the four
    /// unassigned tags, whose severity is the caller's decision.
    pub fn decode(word: u32) -> Option<Instr> {
        let (tag, raw) = unpack(word);
        Some(match Opcode::from_tag(tag)? {
            Opcode::WriteMem => Instr::WriteMem {
                addr: raw & ADDR_MAX as u32,
            },
            Opcode::LoadConst => Instr::LoadConst {
                value: (raw & 0xFF) as u8 as i8,
            },
            Opcode::UnarySgn => Instr::UnarySgn,
            Opcode::ReadMem => Instr::ReadMem,
        })
    }

    pub fn to_le_bytes(self) -> [u8; WORD_BYTES] {
        self.encode().to_le_bytes()
    }
}

/// Split a word into its 3-bit tag and 29-bit raw operand field.
pub fn unpack(word: u32) -> (u8, u32) {
    ((word & TAG_MASK) as u8, word >> TAG_BITS)
}
