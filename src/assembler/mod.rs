//! Textual assembler: turns source lines into `(bytecode, entry_point)`.
//!
//! Two directives (`DATA`, `LABEL`) plus generic `MNEMONIC op0, op1, op2`
//! instruction lines. `#`-prefixed comments and blank lines are skipped
//! before lexing. Everything else goes through [`lexer::lex_line`] ->
//! [`parser::parse_line`] -> [`encoder::Encoder`].

pub mod encoder;
pub mod lexer;
pub mod parser;
pub mod registers;

use crate::error::AssemblerError;
use encoder::Encoder;

/// Assembles a complete source file into `(bytecode, entry_point)`.
pub fn assemble(source: &str) -> Result<(Vec<u8>, u64), AssemblerError> {
    let mut items = Vec::new();

    for (i, raw_line) in source.lines().enumerate() {
        let line_no = i + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let tokens = lexer::lex_line(trimmed, line_no)?;
        let code = parser::parse_line(&tokens, line_no)?;
        items.push((code, line_no));
    }

    Encoder::new().assemble(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::decode;
    use crate::opcode::Op;

    #[test]
    fn skips_comments_and_blank_lines() {
        let source = "\n# a comment\n  \nNOP\n";
        let (bytes, entry) = assemble(source).unwrap();
        assert_eq!(bytes.len(), 26);
        assert_eq!(entry, 0);
        let (op, ..) = decode(&bytes, 0).unwrap();
        assert_eq!(op, Op::Nop);
    }

    #[test]
    fn assembles_a_small_program_with_a_backward_jump() {
        let source = r#"
            LABEL @loop
            ADD %R0, %R0, 1
            JMP @loop
        "#;
        let (bytes, entry) = assemble(source).unwrap();
        // LABEL -> NOP at [0,26); ADD at [26,52); JMP at [52,78).
        assert_eq!(bytes.len(), 78);
        assert_eq!(entry, 26); // first real instruction, not the LABEL's NOP
        let (jmp_op, _, jmp_operands) = decode(&bytes[52..78], 52).unwrap();
        assert_eq!(jmp_op, Op::Jmp);
        assert_eq!(jmp_operands[0], 0); // jumps back to the LABEL's address
    }

    #[test]
    fn propagates_parse_errors_with_their_source_line() {
        let source = "NOP\nADD %R0, %R1\n";
        let err = assemble(source).unwrap_err();
        assert_eq!(
            err,
            AssemblerError::Parse {
                line: 2,
                message: "ADD expects 3 operand(s), found 2".into()
            }
        );
    }

    #[test]
    fn data_directive_is_addressable_from_load() {
        let source = r#"
            DATA @greeting "hi"
            LOAD %R0, @greeting, 0
        "#;
        let (bytes, _) = assemble(source).unwrap();
        // DATA emits 2 raw bytes at [0,2); LOAD follows at [2,28).
        let (op, _, operands) = decode(&bytes[2..28], 2).unwrap();
        assert_eq!(op, Op::Load);
        assert_eq!(operands[1], 0);
    }
}
