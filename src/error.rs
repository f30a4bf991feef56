//! Error types for every layer of the virtual machine.

use crate::consts::REGISTER_COUNT;
use thiserror::Error;

/// A fatal condition that aborts [`crate::interpreter::Vm::run`].
///
/// These are the only errors that can escape a running guest program; anything
/// recoverable (an invalid file descriptor, a failed host read) is instead
/// reported back to the guest as an `errno` in a register.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Access to an address that is mapped by neither the stack nor any block.
    #[error("segmentation fault at address {0:#x}")]
    SegmentationFault(u64),

    /// An opcode outside the known instruction set, or a `Reserved` operand
    /// type tag.
    #[error("invalid instruction at pc {pc:#x}: {reason}")]
    InvalidInstruction {
        /// Program counter of the offending instruction.
        pc: u64,
        /// Human-readable reason.
        reason: &'static str,
    },

    /// A `Register`-tagged operand named a register id outside `0..67`.
    #[error("invalid register index {index} (register file has {REGISTER_COUNT} entries)")]
    InvalidRegisterIndex {
        /// The out-of-range index.
        index: u64,
    },

    /// DIV/MOD with a zero divisor.
    #[error("division by zero at pc {0:#x}")]
    DivisionByZero(u64),
}

/// Errors raised by the [`crate::memory::Memory`] allocator.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    /// `free` was called with a `start` that does not match any block.
    #[error("no block starts at address {0:#x}")]
    InvalidAddress(u64),
}

/// Errors raised while decoding or validating a [`crate::container::Program`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContainerError {
    /// The byte slice is shorter than the fixed 18-byte prefix.
    #[error("container is {0} bytes, shorter than the 18-byte minimum")]
    TooShort(usize),

    /// `code_end` does not satisfy `18 <= code_end <= len`.
    #[error("code end offset {code_end} out of range for a {len}-byte container")]
    InvalidCodeEnd {
        /// The declared end offset.
        code_end: u64,
        /// The actual container length.
        len: usize,
    },

    /// The `encoding` byte named a value this build does not support.
    #[error("unsupported encoding tag {0}")]
    UnsupportedEncoding(u8),

    /// Inflating a GZIP-encoded payload failed.
    #[error("failed to inflate gzip-encoded code: {0}")]
    Gzip(String),
}

/// Errors raised while assembling source text into bytecode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssemblerError {
    /// A token could not be lexed (unterminated string, stray character).
    #[error("line {line}: {message}")]
    Lex {
        /// 1-based source line.
        line: usize,
        /// Human-readable description.
        message: String,
    },

    /// A line parsed into tokens but not into a valid `Code` element.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based source line.
        line: usize,
        /// Human-readable description.
        message: String,
    },

    /// A parsed element failed to lower to bytecode (unknown mnemonic,
    /// unknown register, unresolved label, ...).
    #[error("line {line}: {message}")]
    Lower {
        /// 1-based source line.
        line: usize,
        /// Human-readable description.
        message: String,
    },
}

/// Errors surfaced by the container/program loader.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The container itself was malformed.
    #[error(transparent)]
    Container(#[from] ContainerError),
    /// Reading the program file (or the host executable, for the embedded
    /// envelope) failed.
    #[error("failed to read program: {0}")]
    Io(#[from] std::io::Error),
}
