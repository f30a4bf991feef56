//! The virtual machine: register file, boot sequence, and the
//! fetch-decode-execute loop.

mod alu;
mod executors;
mod flow;
mod memory_ops;

use tracing::{instrument, trace};

use crate::consts::{MAX_ADDRESS, REGISTER_COUNT, REG_PC, REG_SB, REG_SP, REG_SYS_BASE};
use crate::error::Fault;
use crate::instruction::{Instruction, OperandType};
use crate::memory::Memory;
use crate::syscall::{FileTable, SyscallTable};

/// A resolved instruction: operand values after register lookup, ready for
/// an executor to consume. `operands[0]`, when the instruction writes a
/// destination register, is the raw register index (see module docs on
/// operand-index-dependent encoding).
pub(crate) struct Resolved {
    pub(crate) operands: [u64; 3],
}

/// One guest virtual machine: its own register file, address space, and
/// open-file table. `Send`, not `Sync` — never shared between threads, only
/// moved.
pub struct Vm {
    registers: [u64; REGISTER_COUNT],
    pub(crate) memory: Memory,
    pub(crate) files: FileTable,
    syscalls: SyscallTable,
    exit: Option<u64>,
}

impl Vm {
    /// Builds a VM with the standard syscall table (real host I/O).
    pub fn new() -> Self {
        Self::with_syscalls(SyscallTable::standard())
    }

    /// Builds a VM with an injectable syscall table, for deterministic tests
    /// that stub host I/O.
    pub fn with_syscalls(syscalls: SyscallTable) -> Self {
        Self {
            registers: [0; REGISTER_COUNT],
            memory: Memory::new(),
            files: FileTable::new(),
            syscalls,
            exit: None,
        }
    }

    /// Loads `code` as the program block, sets `SP = SB = MAX_ADDRESS`, and
    /// sets `PC = entry_point`.
    pub fn boot(&mut self, code: Vec<u8>, entry_point: u64) {
        self.memory.set_program(code);
        self.registers[REG_SP] = MAX_ADDRESS;
        self.registers[REG_SB] = MAX_ADDRESS;
        self.registers[REG_PC] = entry_point;
        self.exit = None;
    }

    /// Reads register `index`. Panics-free: out-of-range indices are a
    /// decoder bug, caught by [`Fault::InvalidRegisterIndex`] before this is
    /// ever called with an untrusted index.
    pub fn register(&self, index: usize) -> u64 {
        self.registers[index]
    }

    fn set_register(&mut self, index: usize, value: u64) -> Result<(), Fault> {
        if index >= REGISTER_COUNT {
            return Err(Fault::InvalidRegisterIndex {
                index: index as u64,
            });
        }
        self.registers[index] = value;
        Ok(())
    }

    fn pc(&self) -> u64 {
        self.registers[REG_PC]
    }

    fn set_pc(&mut self, value: u64) {
        self.registers[REG_PC] = value;
    }

    fn sp(&self) -> u64 {
        self.registers[REG_SP]
    }

    fn set_sp(&mut self, value: u64) {
        self.registers[REG_SP] = value;
    }

    /// Reads syscall-ABI input register `SYS32 + i`.
    pub(crate) fn sys_in(&self, i: usize) -> u64 {
        self.registers[REG_SYS_BASE + i]
    }

    /// Writes the syscall-ABI output register, `SYS35`.
    pub(crate) fn sys_out(&mut self, value: u64) {
        self.registers[REG_SYS_BASE + 3] = value;
    }

    /// Marks the run as finished with `code`, checked by the run loop after
    /// the current instruction's executor returns.
    pub(crate) fn request_exit(&mut self, code: u64) {
        self.exit = Some(code);
    }

    /// Resolves `op`'s three raw operand values against its operand-type
    /// tags: `Register` looks up the named register (bounds-checked),
    /// `Constant` keeps the raw value, `None` is unused and resolves to 0.
    fn resolve(&self, instr: &Instruction) -> Result<Resolved, Fault> {
        let mut operands = [0u64; 3];
        for (i, slot) in operands.iter_mut().enumerate() {
            *slot = match instr.operand_types.0[i] {
                OperandType::Register => {
                    let index = instr.operands[i];
                    if index >= REGISTER_COUNT as u64 {
                        return Err(Fault::InvalidRegisterIndex { index });
                    }
                    self.registers[index as usize]
                }
                OperandType::Constant => instr.operands[i],
                OperandType::None => 0,
            };
        }
        Ok(Resolved { operands })
    }

    /// Runs one fetch-decode-execute step.
    #[instrument(level = "trace", skip(self), fields(pc = self.pc()))]
    fn step(&mut self) -> Result<(), Fault> {
        let pc = self.pc();
        let mut bytes = [0u8; Instruction::LEN];
        self.memory.read_at(pc, &mut bytes)?;

        let instr = Instruction::decode(&bytes, pc)?;
        self.set_pc(pc + Instruction::LEN as u64);

        let resolved = self.resolve(&instr)?;
        trace!(op = ?instr.op, operands = ?resolved.operands, "step");

        executors::execute(self, instr.op, resolved, pc)
    }

    /// Runs the fetch-decode-execute loop until EXIT or a fatal fault.
    /// Returns the guest exit code on clean termination.
    #[instrument(level = "trace", skip(self))]
    pub fn run(&mut self) -> Result<u64, Fault> {
        loop {
            self.step()?;
            if let Some(code) = self.exit {
                return Ok(code);
            }
        }
    }

    /// Dispatches syscall `number`, writing `errno` to register `dest`. An
    /// unregistered syscall number reports `EINVALIDFD` rather than faulting:
    /// the guest asked for something the host doesn't implement, which is a
    /// recoverable condition, not a memory violation.
    pub(crate) fn syscall(&mut self, dest: usize, number: u64) -> Result<(), Fault> {
        let Some(handler) = self.syscalls.get(number) else {
            return self.set_register(dest, crate::syscall::EINVALIDFD);
        };
        let errno = handler(self)?;
        self.set_register(dest, errno)
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}
