//! Line-oriented assembler. Each source line holds at most one instruction:
//! an optional `#` comment suffix is stripped, blank results are skipped, and
//! the rest is a case-insensitive mnemonic followed by whitespace-separated
//! decimal operands. The first bad line aborts the whole assembly.

use miette::Result;

use crate::codec::{Instr, Opcode, ADDR_MAX, IMM_MAX, IMM_MIN, WORD_BYTES};
use crate::error;

/// Everything from this character to the end of the line is ignored.
pub const COMMENT_MARKER: char = '#';

/// Assemble a whole source file into an ordered program.
///
/// Comment-only and blank lines contribute nothing. Errors carry the 1-based
/// line number and a span over the offending text.
pub fn assemble(src: &str) -> Result<Vec<Instr>> {
    let mut program = Vec::new();
    let mut offs = 0;
    for (idx, line) in src.lines().enumerate() {
        if let Some(instr) = assemble_line(line, idx + 1, offs, src)? {
            program.push(instr);
        }
        offs += line.len() + 1;
    }
    Ok(program)
}

/// Concatenate a program into its binary image, 4 little-endian bytes per
/// instruction, no header or padding.
pub fn emit_image(program: &[Instr]) -> Vec<u8> {
    let mut image = Vec::with_capacity(program.len() * WORD_BYTES);
    for instr in program {
        image.extend_from_slice(&instr.to_le_bytes());
    }
    image
}

fn assemble_line(line: &str, line_no: usize, line_offs: usize, src: &str) -> Result<Option<Instr>> {
    let code = match line.find(COMMENT_MARKER) {
        Some(idx) => &line[..idx],
        None => line,
    };
    let stmt = code.trim();
    if stmt.is_empty() {
        return Ok(None);
    }

    let mut tokens = stmt.split_whitespace();
    // Cannot be empty after the blank check above
    let mnemonic = tokens.next().unwrap_or_default();
    let operands: Vec<&str> = tokens.collect();

    let stmt_span = span_of(line_offs, line, stmt);
    let Some(op) = Opcode::from_mnemonic(mnemonic) else {
        return Err(error::asm_unknown_instr(stmt_span, line_no, src));
    };
    if operands.len() != op.operand_count() {
        return Err(error::asm_operand_count(
            stmt_span,
            line_no,
            op,
            operands.len(),
            src,
        ));
    }

    let instr = match op {
        Opcode::LoadConst => {
            let value = parse_operand(operands[0], line_no, line_offs, line, src)?;
            if !(IMM_MIN..=IMM_MAX).contains(&value) {
                let span = span_of(line_offs, line, operands[0]);
                return Err(error::asm_operand_range(span, line_no, op, value, src));
            }
            Instr::LoadConst { value: value as i8 }
        }
        Opcode::WriteMem => {
            let addr = parse_operand(operands[0], line_no, line_offs, line, src)?;
            if !(0..=ADDR_MAX).contains(&addr) {
                let span = span_of(line_offs, line, operands[0]);
                return Err(error::asm_operand_range(span, line_no, op, addr, src));
            }
            Instr::WriteMem { addr: addr as u32 }
        }
        Opcode::UnarySgn => Instr::UnarySgn,
        Opcode::ReadMem => Instr::ReadMem,
    };
    Ok(Some(instr))
}

fn parse_operand(
    token: &str,
    line_no: usize,
    line_offs: usize,
    line: &str,
    src: &str,
) -> Result<i64> {
    token.parse::<i64>().map_err(|e| {
        let span = span_of(line_offs, line, token);
        error::asm_bad_lit(span, line_no, e, src)
    })
}

/// Source span of `token`, which must be a subslice of `line`.
fn span_of(line_offs: usize, line: &str, token: &str) -> std::ops::Range<usize> {
    let start = line_offs + (token.as_ptr() as usize - line.as_ptr() as usize);
    start..start + token.len()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn assembles_scenario_program() {
        let src = "LOAD_CONST -7\nWRITE_MEM 10\nLOAD_CONST 10\nUNARY_SGN\nWRITE_MEM 11\n";
        let program = assemble(src).unwrap();
        assert_eq!(
            program,
            vec![
                Instr::LoadConst { value: -7 },
                Instr::WriteMem { addr: 10 },
                Instr::LoadConst { value: 10 },
                Instr::UnarySgn,
                Instr::WriteMem { addr: 11 },
            ]
        );
        assert_eq!(emit_image(&program).len(), 20);
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        let src = "# a comment\n\n   \nload_const 5 # trailing comment\n# another\n";
        let program = assemble(src).unwrap();
        assert_eq!(program, vec![Instr::LoadConst { value: 5 }]);
    }

    #[test]
    fn mnemonics_are_case_insensitive() {
        let program = assemble("read_mem\nRead_Mem\nREAD_MEM\n").unwrap();
        assert_eq!(program, vec![Instr::ReadMem; 3]);
    }

    #[test]
    fn rejects_unknown_instruction() {
        let err = assemble("LOAD_CONST 1\nHCF\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn rejects_wrong_operand_count() {
        assert!(assemble("LOAD_CONST\n").is_err());
        assert!(assemble("LOAD_CONST 1 2\n").is_err());
        assert!(assemble("READ_MEM 4\n").is_err());
        assert!(assemble("UNARY_SGN 4\n").is_err());
        assert!(assemble("WRITE_MEM\n").is_err());
    }

    #[test]
    fn rejects_out_of_range_immediate() {
        assert!(assemble("LOAD_CONST 200\n").is_err());
        assert!(assemble("LOAD_CONST -129\n").is_err());
        assert!(assemble("LOAD_CONST 127\n").is_ok());
        assert!(assemble("LOAD_CONST -128\n").is_ok());
    }

    #[test]
    fn rejects_out_of_range_address() {
        assert!(assemble("WRITE_MEM -1\n").is_err());
        assert!(assemble("WRITE_MEM 16777216\n").is_err());
        assert!(assemble("WRITE_MEM 16777215\n").is_ok());
        assert!(assemble("WRITE_MEM 0\n").is_ok());
    }

    #[test]
    fn rejects_malformed_literal() {
        let err = assemble("WRITE_MEM ten\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
        assert!(assemble("LOAD_CONST 0x10\n").is_err());
    }

    #[test]
    fn signed_literals_accepted() {
        let program = assemble("LOAD_CONST +5\nLOAD_CONST -5\n").unwrap();
        assert_eq!(
            program,
            vec![
                Instr::LoadConst { value: 5 },
                Instr::LoadConst { value: -5 }
            ]
        );
    }
}
