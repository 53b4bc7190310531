use std::num::ParseIntError;
use std::ops::Range;

use miette::{miette, LabeledSpan, Report, Severity};

use crate::codec::{Opcode, ADDR_MAX, IMM_MAX, IMM_MIN};
use crate::runtime::MEMORY_SIZE;

// Assembler errors

pub fn asm_unknown_instr(span: Range<usize>, line: usize, src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::unknown_instr",
        help = "valid instructions are LOAD_CONST, READ_MEM, WRITE_MEM and UNARY_SGN.",
        labels = vec![LabeledSpan::at(span, "unknown instruction")],
        "Unknown instruction on line {line}",
    )
    .with_source_code(src.to_string())
}

pub fn asm_operand_count(
    span: Range<usize>,
    line: usize,
    op: Opcode,
    found: usize,
    src: &str,
) -> Report {
    let expected = op.operand_count();
    miette!(
        severity = Severity::Error,
        code = "asm::operand_count",
        help = "operands are whitespace-separated decimal integers.",
        labels = vec![LabeledSpan::at(span, "wrong operand count")],
        "{op} takes {expected} operand(s) but {found} were given on line {line}",
    )
    .with_source_code(src.to_string())
}

pub fn asm_bad_lit(span: Range<usize>, line: usize, e: ParseIntError, src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::bad_lit",
        help = "operands must be decimal integers, optionally signed.",
        labels = vec![LabeledSpan::at(span, "not an integer")],
        "Invalid operand literal on line {line}: {e}",
    )
    .with_source_code(src.to_string())
}

pub fn asm_operand_range(
    span: Range<usize>,
    line: usize,
    op: Opcode,
    value: i64,
    src: &str,
) -> Report {
    let help = match op {
        Opcode::LoadConst => format!("LOAD_CONST accepts values from {IMM_MIN} to {IMM_MAX}."),
        _ => format!("WRITE_MEM accepts addresses from 0 to {ADDR_MAX}."),
    };
    miette!(
        severity = Severity::Error,
        code = "asm::operand_range",
        help = help,
        labels = vec![LabeledSpan::at(span, "out of range")],
        "Operand {value} for {op} is out of range on line {line}",
    )
    .with_source_code(src.to_string())
}

// Interpreter errors

pub fn run_unknown_opcode(tag: u8, offset: usize) -> Report {
    miette!(
        severity = Severity::Error,
        code = "run::unknown_opcode",
        help = "only opcode tags 0 through 3 are assigned; the image may be corrupt.",
        "Unknown opcode tag {tag} at image byte {offset}",
    )
}

pub fn run_out_of_bounds(op: Opcode, addr: i64, offset: usize) -> Report {
    let max = MEMORY_SIZE - 1;
    miette!(
        severity = Severity::Error,
        code = "run::out_of_bounds",
        help = format!("valid cell addresses are 0 to {max}."),
        "{op} at image byte {offset} addressed cell {addr}, outside memory",
    )
}

pub fn run_bad_range(arg: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "run::bad_range",
        help = "format the dump range as `<start>:<end>`, e.g. `0:15`.",
        "Malformed memory range `{arg}`",
    )
}

pub fn run_range_bounds(start: usize, end: usize) -> Report {
    let max = MEMORY_SIZE - 1;
    miette!(
        severity = Severity::Error,
        code = "run::range_bounds",
        help = format!("the range is inclusive and must satisfy 0 <= start <= end <= {max}."),
        "Memory range {start}:{end} is out of bounds",
    )
}
