//! Load/store/move instructions.

use super::{Resolved, Vm};
use crate::error::Fault;

impl Vm {
    pub(super) fn exec_load(&mut self, r: &Resolved) -> Result<(), Fault> {
        let value = self.memory.read_u64(r.operands[1] + r.operands[2])?;
        self.set_register(r.operands[0] as usize, value)
    }

    pub(super) fn exec_loadh(&mut self, r: &Resolved) -> Result<(), Fault> {
        let value = self.memory.read_u32(r.operands[1] + r.operands[2])?;
        self.set_register(r.operands[0] as usize, value)
    }

    pub(super) fn exec_loadb(&mut self, r: &Resolved) -> Result<(), Fault> {
        let value = self.memory.read_u8(r.operands[1] + r.operands[2])?;
        self.set_register(r.operands[0] as usize, value)
    }

    pub(super) fn exec_store(&mut self, r: &Resolved) -> Result<(), Fault> {
        self.memory
            .write_u64(r.operands[1] + r.operands[2], r.operands[0])
    }

    pub(super) fn exec_storeh(&mut self, r: &Resolved) -> Result<(), Fault> {
        self.memory
            .write_u32(r.operands[1] + r.operands[2], r.operands[0])
    }

    pub(super) fn exec_storeb(&mut self, r: &Resolved) -> Result<(), Fault> {
        self.memory
            .write_u8(r.operands[1] + r.operands[2], r.operands[0])
    }

    pub(super) fn exec_mov(&mut self, r: &Resolved) -> Result<(), Fault> {
        self.set_register(r.operands[0] as usize, r.operands[1])
    }

    pub(super) fn exec_movh(&mut self, r: &Resolved) -> Result<(), Fault> {
        self.set_register(r.operands[0] as usize, r.operands[1] as u32 as u64)
    }

    pub(super) fn exec_movb(&mut self, r: &Resolved) -> Result<(), Fault> {
        self.set_register(r.operands[0] as usize, r.operands[1] as u8 as u64)
    }
}
