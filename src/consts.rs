//! VM-wide constants: register layout, memory sizes, and wire-format widths.

/// Number of general-purpose registers, `R0..R31`.
pub const GENERAL_REGISTER_COUNT: usize = 32;

/// Number of syscall-ABI registers, `SYS32..SYS63`.
pub const SYSCALL_REGISTER_COUNT: usize = 32;

/// Total register file size: 32 general-purpose + 32 syscall-ABI + PC + SP + SB.
pub const REGISTER_COUNT: usize = GENERAL_REGISTER_COUNT + SYSCALL_REGISTER_COUNT + 3;

/// Index of the first syscall-ABI register, `SYS32`.
pub const REG_SYS_BASE: usize = GENERAL_REGISTER_COUNT;

/// Program counter register.
pub const REG_PC: usize = 64;

/// Stack pointer register.
pub const REG_SP: usize = 65;

/// Stack base register.
pub const REG_SB: usize = 66;

/// Size, in bytes, of an encoded instruction record.
pub const INSTRUCTION_LEN: usize = 26;

/// Size, in bytes, of one machine word (used by LOAD/STORE/MOV/PUSH/POP).
pub const WORD_SIZE: usize = 8;

/// Size, in bytes, of a half word (used by LOADH/STOREH/MOVH).
pub const HALF_WORD_SIZE: usize = 4;

/// Size, in bytes, of a byte-sized access (used by LOADB/STOREB/MOVB).
pub const BYTE_SIZE: usize = 1;

/// Highest addressable byte in the 64-bit guest address space.
pub const MAX_ADDRESS: u64 = u64::MAX;

/// Size of the fixed stack region: 16 MiB.
pub const STACK_SIZE: u64 = 16 * 1024 * 1024;

/// First byte address of the stack region.
pub const STACK_START: u64 = MAX_ADDRESS - STACK_SIZE + 1;

/// File descriptor bound to the guest's standard input.
pub const STDIN_FD: u64 = 0;
/// File descriptor bound to the guest's standard output.
pub const STDOUT_FD: u64 = 1;
/// File descriptor bound to the guest's standard error.
pub const STDERR_FD: u64 = 2;
/// First file descriptor handed out by the `OPEN` syscall.
pub const FIRST_DYNAMIC_FD: u64 = 3;

/// Fixed 8-byte ASCII magic trailing an executable that embeds a program.
pub const EMBEDDED_MAGIC: [u8; 8] = *b"@%LVM2%\n";
