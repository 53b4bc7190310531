//! Structured records for the two artifacts besides the binary image: the
//! assembler's decode log and the interpreter's memory snapshot. Serialized
//! as pretty-printed JSON; the field names and ordering are the stable part.

use serde::Serialize;

use crate::codec::{Instr, WORD_BYTES};
use crate::runtime::MemRange;

/// One emitted instruction as recorded in the decode log. `B` is displayed
/// signed for LOAD_CONST and as the unsigned address for WRITE_MEM; the
/// no-operand instructions record 0.
#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct LogEntry {
    pub instruction: &'static str,
    #[serde(rename = "A")]
    pub a: u8,
    #[serde(rename = "B")]
    pub b: i64,
    pub bytes: [u8; WORD_BYTES],
}

impl From<Instr> for LogEntry {
    fn from(instr: Instr) -> LogEntry {
        let op = instr.opcode();
        let b = match instr {
            Instr::LoadConst { value } => value as i64,
            Instr::WriteMem { addr } => addr as i64,
            Instr::UnarySgn | Instr::ReadMem => 0,
        };
        LogEntry {
            instruction: op.mnemonic(),
            a: op as u8,
            b,
            bytes: instr.to_le_bytes(),
        }
    }
}

/// One memory cell in the post-run snapshot.
#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct DumpEntry {
    pub address: usize,
    pub value: i32,
}

/// The full snapshot artifact, covering one inclusive address range in
/// ascending order.
#[derive(Serialize, PartialEq, Eq, Debug)]
pub struct Snapshot {
    pub memory_dump: Vec<DumpEntry>,
}

/// Build the decode log for an assembled program, in emission order.
pub fn decode_log(program: &[Instr]) -> Vec<LogEntry> {
    program.iter().copied().map(LogEntry::from).collect()
}

/// Pair a dump window with its addresses. `cells` must be the view for
/// `range`.
pub fn snapshot(cells: &[i32], range: MemRange) -> Snapshot {
    debug_assert_eq!(cells.len(), range.end - range.start + 1);
    let memory_dump = cells
        .iter()
        .enumerate()
        .map(|(i, &value)| DumpEntry {
            address: range.start + i,
            value,
        })
        .collect();
    Snapshot { memory_dump }
}
