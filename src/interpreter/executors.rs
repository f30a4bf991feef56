//! Opcode dispatch: routes a resolved instruction to its executor.

use super::{Resolved, Vm};
use crate::error::Fault;
use crate::opcode::Op;

pub(super) fn execute(vm: &mut Vm, op: Op, resolved: Resolved, pc: u64) -> Result<(), Fault> {
    let r = &resolved;
    match op {
        Op::Nop => Ok(()),

        Op::Add => vm.exec_add(r),
        Op::Sub => vm.exec_sub(r),
        Op::Mul => vm.exec_mul(r),
        Op::Div => vm.exec_div(r, pc),
        Op::Mod => vm.exec_mod(r, pc),

        Op::And => vm.exec_and(r),
        Op::Or => vm.exec_or(r),
        Op::Xor => vm.exec_xor(r),
        Op::Not => vm.exec_not(r),

        Op::Shl => vm.exec_shl(r),
        Op::Shr => vm.exec_shr(r),

        Op::Cmp => vm.exec_cmp(r),
        Op::Jmp => vm.exec_jmp(r),

        Op::Jg => vm.exec_jg(r),
        Op::Jl => vm.exec_jl(r),
        Op::Je => vm.exec_je(r),
        Op::Jne => vm.exec_jne(r),
        Op::Jge => vm.exec_jge(r),
        Op::Jle => vm.exec_jle(r),

        Op::Load => vm.exec_load(r),
        Op::Loadh => vm.exec_loadh(r),
        Op::Loadb => vm.exec_loadb(r),

        Op::Store => vm.exec_store(r),
        Op::Storeh => vm.exec_storeh(r),
        Op::Storeb => vm.exec_storeb(r),

        Op::Mov => vm.exec_mov(r),
        Op::Movh => vm.exec_movh(r),
        Op::Movb => vm.exec_movb(r),

        Op::Push => vm.exec_push(r),
        Op::Pop => vm.exec_pop(r),

        Op::Call => vm.exec_call(r),
        Op::Ret => vm.exec_ret(),

        Op::Syscall => vm.syscall(r.operands[0] as usize, r.operands[1]),
    }
}
