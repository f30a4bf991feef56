//! Turns a lexed source line into one [`Code`] element: an instruction, a
//! `DATA` block, or a `LABEL` binding.

use crate::assembler::lexer::Token;
use crate::assembler::registers;
use crate::error::AssemblerError;
use crate::opcode::Op;

/// One source-level operand, before the index-dependent tagging rule is
/// applied at lowering time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A `%IDENT` register reference, already resolved to its id.
    Register(u64),
    /// A decimal integer literal, reinterpreted as two's-complement `u64`.
    Constant(u64),
    /// An `@IDENT` label reference, resolved to an address in pass 2.
    Label(String),
}

/// One parsed, not-yet-lowered unit of source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Code {
    /// A single instruction and its operands.
    Instruction { op: Op, operands: Vec<Operand> },
    /// `DATA @name "bytes"`: raw bytes bound to a label.
    Data { name: String, bytes: Vec<u8> },
    /// `LABEL @name`: a NOP-padded label binding.
    Label { name: String },
}

/// Parses one line's tokens (as produced by [`crate::assembler::lexer::lex_line`]).
pub fn parse_line(tokens: &[Token], line: usize) -> Result<Code, AssemblerError> {
    let Some((first, rest)) = tokens.split_first() else {
        return Err(parse_err(line, "empty line reached the parser"));
    };

    let Token::Ident(name) = first else {
        return Err(parse_err(line, "expected an instruction or directive name"));
    };
    let name = name.to_uppercase();

    match name.as_str() {
        "DATA" => parse_data(rest, line),
        "LABEL" => parse_label(rest, line),
        _ => parse_instruction(&name, rest, line),
    }
}

fn parse_data(rest: &[Token], line: usize) -> Result<Code, AssemblerError> {
    match rest {
        [Token::LabelRef(name), Token::Str(bytes)] => Ok(Code::Data {
            name: name.clone(),
            bytes: bytes.clone().into_bytes(),
        }),
        _ => Err(parse_err(line, "DATA expects '@name \"bytes\"'")),
    }
}

fn parse_label(rest: &[Token], line: usize) -> Result<Code, AssemblerError> {
    match rest {
        [Token::LabelRef(name)] => Ok(Code::Label { name: name.clone() }),
        _ => Err(parse_err(line, "LABEL expects '@name'")),
    }
}

fn parse_instruction(name: &str, rest: &[Token], line: usize) -> Result<Code, AssemblerError> {
    let op: Op = name
        .parse()
        .map_err(|_| parse_err(line, format!("unknown mnemonic '{name}'")))?;

    let operands = split_operands(rest, line)?;
    if operands.len() != op.arity() {
        return Err(parse_err(
            line,
            format!(
                "{name} expects {} operand(s), found {}",
                op.arity(),
                operands.len()
            ),
        ));
    }

    Ok(Code::Instruction { op, operands })
}

fn split_operands(rest: &[Token], line: usize) -> Result<Vec<Operand>, AssemblerError> {
    if rest.is_empty() {
        return Ok(Vec::new());
    }

    let mut operands = Vec::new();
    for (i, group) in rest.split(|t| *t == Token::Comma).enumerate() {
        match group {
            [Token::Register(name)] => {
                let id = registers::resolve(name)
                    .ok_or_else(|| parse_err(line, format!("unknown register '%{name}'")))?;
                operands.push(Operand::Register(id));
            }
            [Token::Integer(value)] => operands.push(Operand::Constant(*value as u64)),
            [Token::LabelRef(name)] => operands.push(Operand::Label(name.clone())),
            [] => {
                return Err(parse_err(
                    line,
                    format!("empty operand at position {i}"),
                ))
            }
            _ => {
                return Err(parse_err(
                    line,
                    format!("malformed operand at position {i}"),
                ))
            }
        }
    }
    Ok(operands)
}

fn parse_err(line: usize, message: impl Into<String>) -> AssemblerError {
    AssemblerError::Parse {
        line,
        message: message.into(),
    }
}
