//! Control-flow and stack instructions: JMP/Jcc, PUSH/POP, CALL/RET.

use super::{Resolved, Vm};
use crate::consts::WORD_SIZE;
use crate::error::Fault;

impl Vm {
    pub(super) fn exec_jmp(&mut self, r: &Resolved) -> Result<(), Fault> {
        self.set_pc(r.operands[0]);
        Ok(())
    }

    fn branch_if(&mut self, r: &Resolved, taken: impl FnOnce(i64) -> bool) -> Result<(), Fault> {
        if taken(r.operands[0] as i64) {
            self.set_pc(r.operands[1]);
        }
        Ok(())
    }

    pub(super) fn exec_jg(&mut self, r: &Resolved) -> Result<(), Fault> {
        self.branch_if(r, |v| v > 0)
    }

    pub(super) fn exec_jl(&mut self, r: &Resolved) -> Result<(), Fault> {
        self.branch_if(r, |v| v < 0)
    }

    pub(super) fn exec_je(&mut self, r: &Resolved) -> Result<(), Fault> {
        self.branch_if(r, |v| v == 0)
    }

    pub(super) fn exec_jne(&mut self, r: &Resolved) -> Result<(), Fault> {
        self.branch_if(r, |v| v != 0)
    }

    pub(super) fn exec_jge(&mut self, r: &Resolved) -> Result<(), Fault> {
        self.branch_if(r, |v| v >= 0)
    }

    pub(super) fn exec_jle(&mut self, r: &Resolved) -> Result<(), Fault> {
        self.branch_if(r, |v| v <= 0)
    }

    pub(super) fn exec_push(&mut self, r: &Resolved) -> Result<(), Fault> {
        let sp = self.sp().wrapping_sub(WORD_SIZE as u64);
        self.memory.write_u64(sp, r.operands[0])?;
        self.set_sp(sp);
        Ok(())
    }

    pub(super) fn exec_pop(&mut self, r: &Resolved) -> Result<(), Fault> {
        let sp = self.sp();
        let value = self.memory.read_u64(sp)?;
        self.set_sp(sp.wrapping_add(WORD_SIZE as u64));
        self.set_register(r.operands[0] as usize, value)
    }

    pub(super) fn exec_call(&mut self, r: &Resolved) -> Result<(), Fault> {
        let sp = self.sp().wrapping_sub(WORD_SIZE as u64);
        self.memory.write_u64(sp, self.pc())?;
        self.set_sp(sp);
        self.set_pc(r.operands[0]);
        Ok(())
    }

    pub(super) fn exec_ret(&mut self) -> Result<(), Fault> {
        let sp = self.sp();
        let target = self.memory.read_u64(sp)?;
        self.set_sp(sp.wrapping_add(WORD_SIZE as u64));
        self.set_pc(target);
        Ok(())
    }
}
