use crate::opcode::{Mnemonic, OpcodeDescriptor, MAX_ARGS, OPCODE_TABLE};
use std::fmt;

/// One instruction word, decoded. Built per cycle and thrown away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedInstruction {
    pub mnemonic: Mnemonic,
    pub opcode: u16,
    args: [u16; MAX_ARGS],
    arg_count: usize,
}

impl DecodedInstruction {
    pub fn unknown(opcode: u16) -> Self {
        DecodedInstruction {
            mnemonic: Mnemonic::Unknown,
            opcode,
            args: [0; MAX_ARGS],
            arg_count: 0,
        }
    }

    /// operands in descriptor order
    pub fn args(&self) -> &[u16] {
        &self.args[..self.arg_count]
    }
}

impl fmt::Display for DecodedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x} {}", self.opcode, self.mnemonic)?;
        for arg in self.args() {
            write!(f, " {:x}", arg)?;
        }
        Ok(())
    }
}

/// decode against the built-in instruction set
pub fn decode(word: u16) -> DecodedInstruction {
    decode_with(&OPCODE_TABLE, word)
}

/// First descriptor in `table` that accepts `word` wins. No match is not an
/// error; it comes back as [`Mnemonic::Unknown`] with no operands.
pub fn decode_with(table: &[OpcodeDescriptor], word: u16) -> DecodedInstruction {
    match table.iter().find(|d| d.matches(word)) {
        Some(d) => {
            let mut args = [0; MAX_ARGS];
            for (slot, spec) in args.iter_mut().zip(d.args) {
                *slot = spec.extract(word);
            }
            DecodedInstruction {
                mnemonic: d.mnemonic,
                opcode: word,
                args,
                arg_count: d.args.len().min(MAX_ARGS),
            }
        }
        None => DecodedInstruction::unknown(word),
    }
}
