//! Execution of a binary program image against the machine state: 1024
//! zero-initialized cells plus one accumulator. READ_MEM and UNARY_SGN take
//! their cell address from the accumulator; WRITE_MEM carries it as an
//! operand. A trailing fragment shorter than one word ends the run quietly.

use std::str::FromStr;

use miette::{Report, Result};

use crate::codec::{unpack, Instr, Opcode, WORD_BYTES};
use crate::error;

/// The machine addresses exactly this many memory cells.
pub const MEMORY_SIZE: usize = 1024;

/// Complete machine state during a run.
pub struct RunState {
    mem: Box<[i32; MEMORY_SIZE]>,
    /// Data register and implicit address register in one.
    acc: i32,
}

/// How the execution loop came to a stop. Fatal conditions are reported as
/// errors instead and never produce a halt.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Halt {
    /// The image was exhausted on a word boundary.
    Normal,
    /// Fewer than 4 bytes remained at byte offset `at`; the fragment is
    /// treated as end-of-program, not as corruption.
    Truncated { at: usize },
}

impl RunState {
    pub fn new() -> RunState {
        RunState {
            mem: Box::new([0; MEMORY_SIZE]),
            acc: 0,
        }
    }

    pub fn acc(&self) -> i32 {
        self.acc
    }

    /// Execute `image` from byte offset 0 to the end, one 4-byte word at a
    /// time.
    pub fn run(&mut self, image: &[u8]) -> Result<Halt> {
        let mut offset = 0;
        while let Some(bytes) = image.get(offset..offset + WORD_BYTES) {
            let word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            self.step(word, offset)?;
            offset += WORD_BYTES;
        }
        if offset == image.len() {
            Ok(Halt::Normal)
        } else {
            Ok(Halt::Truncated { at: offset })
        }
    }

    fn step(&mut self, word: u32, offset: usize) -> Result<()> {
        let Some(instr) = Instr::decode(word) else {
            let (tag, _) = unpack(word);
            return Err(error::run_unknown_opcode(tag, offset));
        };
        match instr {
            Instr::LoadConst { value } => self.acc = value as i32,
            Instr::ReadMem => {
                let cell = self.cell(self.acc as i64, Opcode::ReadMem, offset)?;
                self.acc = self.mem[cell];
            }
            Instr::WriteMem { addr } => {
                let cell = self.cell(addr as i64, Opcode::WriteMem, offset)?;
                self.mem[cell] = self.acc;
            }
            Instr::UnarySgn => {
                let cell = self.cell(self.acc as i64, Opcode::UnarySgn, offset)?;
                self.acc = self.mem[cell].signum();
            }
        }
        Ok(())
    }

    /// Bounds-check a cell address, fatal on violation.
    fn cell(&self, addr: i64, op: Opcode, offset: usize) -> Result<usize> {
        if (0..MEMORY_SIZE as i64).contains(&addr) {
            Ok(addr as usize)
        } else {
            Err(error::run_out_of_bounds(op, addr, offset))
        }
    }

    /// The memory window covered by a validated dump range.
    pub fn view(&self, range: MemRange) -> &[i32] {
        &self.mem[range.start..=range.end]
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

/// Inclusive dump range, parsed from a `<start>:<end>` argument. A parsed
/// value is always within memory bounds with `start <= end`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MemRange {
    pub start: usize,
    pub end: usize,
}

impl FromStr for MemRange {
    type Err = Report;

    fn from_str(s: &str) -> Result<MemRange> {
        let Some((start, end)) = s.split_once(':') else {
            return Err(error::run_bad_range(s));
        };
        let (Ok(start), Ok(end)) = (start.parse::<usize>(), end.parse::<usize>()) else {
            return Err(error::run_bad_range(s));
        };
        if start > end || end >= MEMORY_SIZE {
            return Err(error::run_range_bounds(start, end));
        }
        Ok(MemRange { start, end })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::asm::{assemble, emit_image};

    fn run_source(src: &str) -> (RunState, Halt) {
        let image = emit_image(&assemble(src).unwrap());
        let mut state = RunState::new();
        let halt = state.run(&image).unwrap();
        (state, halt)
    }

    #[test]
    fn store_load_round_trip() {
        // LOAD_CONST v; WRITE_MEM a; LOAD_CONST a; READ_MEM leaves v in the
        // accumulator, for addresses also expressible as immediates.
        for (addr, value) in [(0, -128), (1, 127), (100, -7), (127, 0)] {
            let src = format!(
                "LOAD_CONST {value}\nWRITE_MEM {addr}\nLOAD_CONST {addr}\nREAD_MEM\n"
            );
            let (state, halt) = run_source(&src);
            assert_eq!(halt, Halt::Normal);
            assert_eq!(state.acc(), value, "cell {addr}");
        }
    }

    #[test]
    fn sign_law() {
        #[rustfmt::skip]
        let cases = [
            // (stored value, expected sign)
            (-128, -1),
            (-1,   -1),
            (0,     0),
            (1,     1),
            (127,   1),
        ];
        for (stored, expected) in cases {
            let src = format!("LOAD_CONST {stored}\nWRITE_MEM 3\nLOAD_CONST 3\nUNARY_SGN\n");
            let (state, _) = run_source(&src);
            assert_eq!(state.acc(), expected, "sgn({stored})");
        }
    }

    #[test]
    fn scenario_program() {
        let (state, halt) =
            run_source("LOAD_CONST -7\nWRITE_MEM 10\nLOAD_CONST 10\nUNARY_SGN\nWRITE_MEM 11\n");
        assert_eq!(halt, Halt::Normal);
        let range: MemRange = "10:11".parse().unwrap();
        assert_eq!(state.view(range), &[-7, -1]);
    }

    #[test]
    fn write_out_of_bounds_is_fatal() {
        // 2000 assembles fine (24-bit operand) but exceeds memory at run time
        let image = emit_image(&assemble("WRITE_MEM 2000\n").unwrap());
        let mut state = RunState::new();
        assert!(state.run(&image).is_err());
    }

    #[test]
    fn accumulator_address_out_of_bounds_is_fatal() {
        for op in ["READ_MEM", "UNARY_SGN"] {
            let src = format!("LOAD_CONST -1\n{op}\n");
            let image = emit_image(&assemble(&src).unwrap());
            let mut state = RunState::new();
            assert!(state.run(&image).is_err(), "{op}");
        }
    }

    #[test]
    fn unknown_opcode_is_fatal() {
        for tag in 4u32..8 {
            let mut state = RunState::new();
            assert!(state.run(&tag.to_le_bytes()).is_err(), "tag {tag}");
        }
    }

    #[test]
    fn truncated_image_halts_quietly() {
        let mut image = emit_image(&assemble("LOAD_CONST 9\nWRITE_MEM 0\n").unwrap());
        image.extend_from_slice(&[0x01, 0x02]);
        let mut state = RunState::new();
        assert_eq!(state.run(&image).unwrap(), Halt::Truncated { at: 8 });
        // The complete prefix still executed
        assert_eq!(state.view("0:0".parse().unwrap()), &[9]);
    }

    #[test]
    fn empty_image_halts_normally() {
        let mut state = RunState::new();
        assert_eq!(state.run(&[]).unwrap(), Halt::Normal);
        assert_eq!(state.acc(), 0);
    }

    #[test]
    fn mem_range_parsing() {
        assert_eq!(
            "0:1023".parse::<MemRange>().unwrap(),
            MemRange { start: 0, end: 1023 }
        );
        assert_eq!(
            "5:5".parse::<MemRange>().unwrap(),
            MemRange { start: 5, end: 5 }
        );
        for bad in ["", "10", "5:2", "0:1024", "-1:5", "1:2:3", "a:b", " 1:2"] {
            assert!(bad.parse::<MemRange>().is_err(), "{bad:?}");
        }
    }
}
