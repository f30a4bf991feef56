//! Arithmetic, bitwise, and compare instructions.

use super::{Resolved, Vm};
use crate::error::Fault;

impl Vm {
    pub(super) fn exec_add(&mut self, r: &Resolved) -> Result<(), Fault> {
        self.set_register(r.operands[0] as usize, r.operands[1].wrapping_add(r.operands[2]))
    }

    pub(super) fn exec_sub(&mut self, r: &Resolved) -> Result<(), Fault> {
        self.set_register(r.operands[0] as usize, r.operands[1].wrapping_sub(r.operands[2]))
    }

    pub(super) fn exec_mul(&mut self, r: &Resolved) -> Result<(), Fault> {
        self.set_register(r.operands[0] as usize, r.operands[1].wrapping_mul(r.operands[2]))
    }

    pub(super) fn exec_div(&mut self, r: &Resolved, pc: u64) -> Result<(), Fault> {
        if r.operands[2] == 0 {
            return Err(Fault::DivisionByZero(pc));
        }
        self.set_register(r.operands[0] as usize, r.operands[1].wrapping_div(r.operands[2]))
    }

    pub(super) fn exec_mod(&mut self, r: &Resolved, pc: u64) -> Result<(), Fault> {
        if r.operands[2] == 0 {
            return Err(Fault::DivisionByZero(pc));
        }
        self.set_register(r.operands[0] as usize, r.operands[1].wrapping_rem(r.operands[2]))
    }

    pub(super) fn exec_and(&mut self, r: &Resolved) -> Result<(), Fault> {
        self.set_register(r.operands[0] as usize, r.operands[1] & r.operands[2])
    }

    pub(super) fn exec_or(&mut self, r: &Resolved) -> Result<(), Fault> {
        self.set_register(r.operands[0] as usize, r.operands[1] | r.operands[2])
    }

    pub(super) fn exec_xor(&mut self, r: &Resolved) -> Result<(), Fault> {
        self.set_register(r.operands[0] as usize, r.operands[1] ^ r.operands[2])
    }

    pub(super) fn exec_not(&mut self, r: &Resolved) -> Result<(), Fault> {
        self.set_register(r.operands[0] as usize, !r.operands[1])
    }

    pub(super) fn exec_shl(&mut self, r: &Resolved) -> Result<(), Fault> {
        let shift = (r.operands[2] % 64) as u32;
        self.set_register(r.operands[0] as usize, r.operands[1] << shift)
    }

    pub(super) fn exec_shr(&mut self, r: &Resolved) -> Result<(), Fault> {
        let shift = (r.operands[2] % 64) as u32;
        self.set_register(r.operands[0] as usize, r.operands[1] >> shift)
    }

    /// Genuinely signed comparison: `-1` if `op1 < op2`, `1` if `op1 > op2`,
    /// `0` if equal. Not an unsigned subtraction compared against zero.
    pub(super) fn exec_cmp(&mut self, r: &Resolved) -> Result<(), Fault> {
        let a = r.operands[1] as i64;
        let b = r.operands[2] as i64;
        let result = match a.cmp(&b) {
            std::cmp::Ordering::Less => u64::MAX,
            std::cmp::Ordering::Equal => 0,
            std::cmp::Ordering::Greater => 1,
        };
        self.set_register(r.operands[0] as usize, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::REG_PC;
    use crate::instruction::{encode, OperandType, OperandTypes};
    use crate::opcode::Op;

    fn run_one(op: Op, dest_is_reg: bool, a: u64, b: u64) -> Vm {
        // operand 0 always Constant (raw reg id); operands 1/2 Constant values
        let types = OperandTypes([OperandType::Constant, OperandType::Constant, OperandType::Constant]);
        let code = encode(op, types, [0, a, b]);
        let mut vm = Vm::new();
        vm.boot(code.to_vec(), 0);
        let _ = dest_is_reg;
        vm.step().unwrap();
        vm
    }

    #[test]
    fn add_wraps_on_overflow() {
        let vm = run_one(Op::Add, true, u64::MAX, 1);
        assert_eq!(vm.register(0), 0);
        assert_eq!(vm.register(REG_PC), crate::consts::INSTRUCTION_LEN as u64);
    }

    #[test]
    fn cmp_is_signed() {
        let vm = run_one(Op::Cmp, true, (-1i64) as u64, 1);
        assert_eq!(vm.register(0), u64::MAX);

        let vm = run_one(Op::Cmp, true, 5, 5);
        assert_eq!(vm.register(0), 0);

        let vm = run_one(Op::Cmp, true, 5, 1);
        assert_eq!(vm.register(0), 1);
    }

    #[test]
    fn div_by_zero_is_fatal() {
        let types = OperandTypes([OperandType::Constant, OperandType::Constant, OperandType::Constant]);
        let code = encode(Op::Div, types, [0, 10, 0]);
        let mut vm = Vm::new();
        vm.boot(code.to_vec(), 0);
        assert_eq!(vm.step().unwrap_err(), Fault::DivisionByZero(0));
    }

    #[test]
    fn shl_shr_wrap_shift_amount_modulo_64() {
        let types = OperandTypes([OperandType::Constant, OperandType::Constant, OperandType::Constant]);
        let code = encode(Op::Shl, types, [0, 1, 64]);
        let mut vm = Vm::new();
        vm.boot(code.to_vec(), 0);
        vm.step().unwrap();
        assert_eq!(vm.register(0), 1);
    }
}
