// Instruction encoding shared by both pipeline stages
mod codec;
pub use codec::{unpack, Instr, Opcode, ADDR_MAX, IMM_MAX, IMM_MIN, WORD_BYTES};

// Assembling
mod asm;
pub use asm::{assemble, emit_image, COMMENT_MARKER};

// Running
mod runtime;
pub use runtime::{Halt, MemRange, RunState, MEMORY_SIZE};

// Log and snapshot artifacts
mod report;
pub use report::{decode_log, snapshot, DumpEntry, LogEntry, Snapshot};

mod error;
