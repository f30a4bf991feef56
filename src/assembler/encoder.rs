//! Two-pass label resolution and bytecode emission.

use std::collections::HashMap;

use crate::assembler::parser::{Code, Operand};
use crate::consts::INSTRUCTION_LEN;
use crate::error::AssemblerError;
use crate::instruction::{encode, OperandType, OperandTypes};
use crate::opcode::Op;

/// The reserved label naming the program's entry point, if bound.
const ENTRYPOINT: &str = "ENTRYPOINT";

/// Lays out and resolves labels, then emits bytecode. One `Encoder` per
/// assembled program.
pub struct Encoder {
    labels: HashMap<String, u64>,
    entry_from_first_instruction: Option<u64>,
}

impl Encoder {
    pub fn new() -> Self {
        Self {
            labels: HashMap::new(),
            entry_from_first_instruction: None,
        }
    }

    /// Pass 1: walks every item, recording `DATA`/`LABEL` addresses and the
    /// first instruction's PC (used as a fallback entry point).
    fn layout(&mut self, items: &[(Code, usize)]) {
        let mut pc = 0u64;
        for (item, _) in items {
            match item {
                Code::Instruction { .. } => {
                    if self.entry_from_first_instruction.is_none() {
                        self.entry_from_first_instruction = Some(pc);
                    }
                    pc += INSTRUCTION_LEN as u64;
                }
                Code::Data { name, bytes } => {
                    self.labels.insert(name.clone(), pc);
                    pc += bytes.len() as u64;
                }
                Code::Label { name } => {
                    self.labels.insert(name.clone(), pc);
                    pc += INSTRUCTION_LEN as u64;
                }
            }
        }
    }

    /// Pass 2: re-emits every item with labels resolved.
    fn emit(&self, items: &[(Code, usize)]) -> Result<Vec<u8>, AssemblerError> {
        let mut out = Vec::new();
        for (item, line) in items {
            match item {
                Code::Instruction { op, operands } => {
                    let (types, raw) = self.lower_operands(*op, operands, *line)?;
                    out.extend_from_slice(&encode(*op, types, raw));
                }
                Code::Data { bytes, .. } => out.extend_from_slice(bytes),
                Code::Label { .. } => {
                    let nop = encode(Op::Nop, OperandTypes([OperandType::None; 3]), [0, 0, 0]);
                    out.extend_from_slice(&nop);
                }
            }
        }
        Ok(out)
    }

    /// Applies the destination-aware tagging rule: for opcodes that write
    /// their result to `R[op0]` (the arithmetic/logic family, LOAD*, MOV*,
    /// POP, SYSCALL's errno register), a register reference at operand index
    /// 0 encodes as `Constant` holding the raw register id, since the VM
    /// uses that operand as a register index, not a value. Every other
    /// operand — including index 0 for JMP/branches/STORE*/PUSH/CALL, where
    /// it names a value or a jump target rather than a destination — encodes
    /// a register reference as `Register`, so the VM dereferences it.
    /// Constants and resolved label addresses always encode as `Constant`,
    /// regardless of position.
    fn lower_operands(
        &self,
        op: Op,
        operands: &[Operand],
        line: usize,
    ) -> Result<(OperandTypes, [u64; 3]), AssemblerError> {
        let mut types = [OperandType::None; 3];
        let mut raw = [0u64; 3];

        for (i, operand) in operands.iter().enumerate() {
            let (t, v) = match operand {
                Operand::Register(id) if i == 0 && writes_destination(op) => {
                    (OperandType::Constant, *id)
                }
                Operand::Register(id) => (OperandType::Register, *id),
                Operand::Constant(value) => (OperandType::Constant, *value),
                Operand::Label(name) => {
                    let address = self.labels.get(name).ok_or_else(|| {
                        AssemblerError::Lower {
                            line,
                            message: format!("unresolved label '@{name}'"),
                        }
                    })?;
                    (OperandType::Constant, *address)
                }
            };
            types[i] = t;
            raw[i] = v;
        }

        Ok((OperandTypes(types), raw))
    }

    /// Runs both passes, returning `(bytecode, entry_point)`.
    pub fn assemble(mut self, items: Vec<(Code, usize)>) -> Result<(Vec<u8>, u64), AssemblerError> {
        self.layout(&items);
        let bytes = self.emit(&items)?;
        let entry = self
            .labels
            .get(ENTRYPOINT)
            .copied()
            .or(self.entry_from_first_instruction)
            .unwrap_or(0);
        Ok((bytes, entry))
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Opcodes whose operand 0 names the register they write their result to,
/// rather than a value or a jump target.
fn writes_destination(op: Op) -> bool {
    use Op::*;
    matches!(
        op,
        Add | Sub | Mul | Div | Mod | And | Or | Xor | Not | Shl | Shr | Cmp | Load | Loadh
            | Loadb | Mov | Movh | Movb | Pop | Syscall
    )
}
