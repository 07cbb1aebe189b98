use crate::opcode::Mnemonic;
use std::io;
use thiserror::Error;

/// Everything that can go wrong while setting up or running the machine.
///
/// Unknown opcodes are deliberately absent: they decode to
/// [`Mnemonic::Unknown`] and execute as a no-op.
#[derive(Debug, Error)]
pub enum MachineError {
    /// access of `len` bytes starting at `addr` falls outside the address space
    #[error("{len} byte(s) at 0x{addr:04x} is outside memory")]
    OutOfRange { addr: usize, len: usize },
    /// CALL with all 16 stack slots in use
    #[error("stack overflow calling from 0x{pc:03x}")]
    StackOverflow { pc: u16 },
    /// RET with an empty stack
    #[error("return with empty stack at 0x{pc:03x}")]
    StackUnderflow { pc: u16 },
    /// two decode table entries accept the same word and the earlier one
    /// doesn't win by being more specific
    #[error("decode table entry {earlier} shadows or is shadowed by {later}")]
    AmbiguousOpcode { earlier: Mnemonic, later: Mnemonic },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("audio device failed: {0}")]
    Audio(String),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
