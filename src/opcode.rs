//! # opcode table
//!
//! Every CHIP-8 instruction as a `(mask, code)` pair plus the rules for
//! pulling its operands out of the word. A word belongs to a descriptor when
//! `word & mask == code`; the table is scanned in order and the first hit
//! wins, so anything with a narrower mask must come before a broader entry
//! that would also accept it (CLS/RET before SYS).
use crate::error::MachineError;
use std::fmt;

/// Symbolic name of an instruction family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Cls,
    Ret,
    SysAddr,
    JpAddr,
    CallAddr,
    SeVxByte,
    SneVxByte,
    SeVxVy,
    LdVxByte,
    AddVxByte,
    LdVxVy,
    OrVxVy,
    AndVxVy,
    XorVxVy,
    AddVxVy,
    SubVxVy,
    ShrVxVy,
    SubnVxVy,
    ShlVxVy,
    SneVxVy,
    LdIAddr,
    JpV0Addr,
    RndVxByte,
    DrwVxVyNibble,
    SkpVx,
    SknpVx,
    LdVxDt,
    LdVxK,
    LdDtVx,
    LdStVx,
    AddIVx,
    LdFVx,
    LdBVx,
    /// LD [I], Vx
    StoreRegs,
    /// LD Vx, [I]
    LoadRegs,
    /// nothing in the table matched
    Unknown,
}

impl Mnemonic {
    pub fn name(&self) -> &'static str {
        match self {
            Mnemonic::Cls => "CLS",
            Mnemonic::Ret => "RET",
            Mnemonic::SysAddr => "SYS_ADDR",
            Mnemonic::JpAddr => "JP_ADDR",
            Mnemonic::CallAddr => "CALL_ADDR",
            Mnemonic::SeVxByte => "SE_VX_BYTE",
            Mnemonic::SneVxByte => "SNE_VX_BYTE",
            Mnemonic::SeVxVy => "SE_VX_VY",
            Mnemonic::LdVxByte => "LD_VX_BYTE",
            Mnemonic::AddVxByte => "ADD_VX_BYTE",
            Mnemonic::LdVxVy => "LD_VX_VY",
            Mnemonic::OrVxVy => "OR_VX_VY",
            Mnemonic::AndVxVy => "AND_VX_VY",
            Mnemonic::XorVxVy => "XOR_VX_VY",
            Mnemonic::AddVxVy => "ADD_VX_VY",
            Mnemonic::SubVxVy => "SUB_VX_VY",
            Mnemonic::ShrVxVy => "SHR_VX_VY",
            Mnemonic::SubnVxVy => "SUBN_VX_VY",
            Mnemonic::ShlVxVy => "SHL_VX_VY",
            Mnemonic::SneVxVy => "SNE_VX_VY",
            Mnemonic::LdIAddr => "LD_I_ADDR",
            Mnemonic::JpV0Addr => "JP_V0_ADDR",
            Mnemonic::RndVxByte => "RND_VX_BYTE",
            Mnemonic::DrwVxVyNibble => "DRW_VX_VY_NIBBLE",
            Mnemonic::SkpVx => "SKP_VX",
            Mnemonic::SknpVx => "SKNP_VX",
            Mnemonic::LdVxDt => "LD_VX_DT",
            Mnemonic::LdVxK => "LD_VX_K",
            Mnemonic::LdDtVx => "LD_DT_VX",
            Mnemonic::LdStVx => "LD_ST_VX",
            Mnemonic::AddIVx => "ADD_I_VX",
            Mnemonic::LdFVx => "LD_F_VX",
            Mnemonic::LdBVx => "LD_B_VX",
            Mnemonic::StoreRegs => "LD_[I]_VX",
            Mnemonic::LoadRegs => "LD_VX_[I]",
            Mnemonic::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How to pull one operand out of an instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgSpec {
    pub mask: u16,
    pub shift: u8,
}

impl ArgSpec {
    pub const fn extract(&self, word: u16) -> u16 {
        (word & self.mask) >> self.shift
    }
}

/// nnn
pub const ADDR: ArgSpec = ArgSpec { mask: 0x0fff, shift: 0 };
/// x
pub const VX: ArgSpec = ArgSpec { mask: 0x0f00, shift: 8 };
/// y
pub const VY: ArgSpec = ArgSpec { mask: 0x00f0, shift: 4 };
/// kk
pub const BYTE: ArgSpec = ArgSpec { mask: 0x00ff, shift: 0 };
/// n
pub const NIBBLE: ArgSpec = ArgSpec { mask: 0x000f, shift: 0 };

/// most operands any instruction carries (DRW x, y, n)
pub const MAX_ARGS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeDescriptor {
    pub mnemonic: Mnemonic,
    pub mask: u16,
    pub code: u16,
    pub args: &'static [ArgSpec],
}

impl OpcodeDescriptor {
    const fn new(mnemonic: Mnemonic, mask: u16, code: u16, args: &'static [ArgSpec]) -> Self {
        OpcodeDescriptor {
            mnemonic,
            mask,
            code,
            args,
        }
    }

    pub const fn matches(&self, word: u16) -> bool {
        word & self.mask == self.code
    }

    /// true if some word is accepted by both
    pub const fn overlaps(&self, other: &OpcodeDescriptor) -> bool {
        (self.code ^ other.code) & self.mask & other.mask == 0
    }

    /// true if every word we accept is also accepted by `other`, but not the
    /// other way round
    pub const fn is_narrower_than(&self, other: &OpcodeDescriptor) -> bool {
        self.overlaps(other) && self.mask & other.mask == other.mask && self.mask != other.mask
    }
}

const NONE: &[ArgSpec] = &[];
const A: &[ArgSpec] = &[ADDR];
const X: &[ArgSpec] = &[VX];
const XK: &[ArgSpec] = &[VX, BYTE];
const XY: &[ArgSpec] = &[VX, VY];
const XYN: &[ArgSpec] = &[VX, VY, NIBBLE];

use self::Mnemonic::*;

/// the full instruction set, in match order
#[rustfmt::skip]
pub static OPCODE_TABLE: [OpcodeDescriptor; 35] = [
    OpcodeDescriptor::new(Cls,           0xffff, 0x00e0, NONE),
    OpcodeDescriptor::new(Ret,           0xffff, 0x00ee, NONE),
    OpcodeDescriptor::new(SysAddr,       0xf000, 0x0000, A),
    OpcodeDescriptor::new(JpAddr,        0xf000, 0x1000, A),
    OpcodeDescriptor::new(CallAddr,      0xf000, 0x2000, A),
    OpcodeDescriptor::new(SeVxByte,      0xf000, 0x3000, XK),
    OpcodeDescriptor::new(SneVxByte,     0xf000, 0x4000, XK),
    OpcodeDescriptor::new(SeVxVy,        0xf00f, 0x5000, XY),
    OpcodeDescriptor::new(LdVxByte,      0xf000, 0x6000, XK),
    OpcodeDescriptor::new(AddVxByte,     0xf000, 0x7000, XK),
    OpcodeDescriptor::new(LdVxVy,        0xf00f, 0x8000, XY),
    OpcodeDescriptor::new(OrVxVy,        0xf00f, 0x8001, XY),
    OpcodeDescriptor::new(AndVxVy,       0xf00f, 0x8002, XY),
    OpcodeDescriptor::new(XorVxVy,       0xf00f, 0x8003, XY),
    OpcodeDescriptor::new(AddVxVy,       0xf00f, 0x8004, XY),
    OpcodeDescriptor::new(SubVxVy,       0xf00f, 0x8005, XY),
    OpcodeDescriptor::new(ShrVxVy,       0xf00f, 0x8006, XY),
    OpcodeDescriptor::new(SubnVxVy,      0xf00f, 0x8007, XY),
    OpcodeDescriptor::new(ShlVxVy,       0xf00f, 0x800e, XY),
    OpcodeDescriptor::new(SneVxVy,       0xf00f, 0x9000, XY),
    OpcodeDescriptor::new(LdIAddr,       0xf000, 0xa000, A),
    OpcodeDescriptor::new(JpV0Addr,      0xf000, 0xb000, A),
    OpcodeDescriptor::new(RndVxByte,     0xf000, 0xc000, XK),
    OpcodeDescriptor::new(DrwVxVyNibble, 0xf000, 0xd000, XYN),
    OpcodeDescriptor::new(SkpVx,         0xf0ff, 0xe09e, X),
    OpcodeDescriptor::new(SknpVx,        0xf0ff, 0xe0a1, X),
    OpcodeDescriptor::new(LdVxDt,        0xf0ff, 0xf007, X),
    OpcodeDescriptor::new(LdVxK,         0xf0ff, 0xf00a, X),
    OpcodeDescriptor::new(LdDtVx,        0xf0ff, 0xf015, X),
    OpcodeDescriptor::new(LdStVx,        0xf0ff, 0xf018, X),
    OpcodeDescriptor::new(AddIVx,        0xf0ff, 0xf01e, X),
    OpcodeDescriptor::new(LdFVx,         0xf0ff, 0xf029, X),
    OpcodeDescriptor::new(LdBVx,         0xf0ff, 0xf033, X),
    OpcodeDescriptor::new(StoreRegs,     0xf0ff, 0xf055, X),
    OpcodeDescriptor::new(LoadRegs,      0xf0ff, 0xf065, X),
];

/// Make sure first-match decoding over `table` is deterministic: whenever two
/// entries accept a common word, the earlier one must be strictly narrower.
pub fn check_table(table: &[OpcodeDescriptor]) -> Result<(), MachineError> {
    for (i, earlier) in table.iter().enumerate() {
        if earlier.args.len() > MAX_ARGS {
            return Err(MachineError::InvalidConfig(format!(
                "{} has {} operands",
                earlier.mnemonic,
                earlier.args.len()
            )));
        }
        for later in &table[i + 1..] {
            if earlier.overlaps(later) && !earlier.is_narrower_than(later) {
                return Err(MachineError::AmbiguousOpcode {
                    earlier: earlier.mnemonic,
                    later: later.mnemonic,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_unambiguous() -> Result<(), MachineError> {
        check_table(&OPCODE_TABLE)
    }

    #[test]
    fn test_every_mnemonic_once() {
        let seen: std::collections::HashSet<Mnemonic> =
            OPCODE_TABLE.iter().map(|d| d.mnemonic).collect();
        assert_eq!(seen.len(), 35);
        assert!(!seen.contains(&Mnemonic::Unknown));
    }

    #[test]
    fn test_codes_fit_masks() {
        for d in OPCODE_TABLE.iter() {
            assert_eq!(d.code & d.mask, d.code, "{}", d.mnemonic);
            // operands never overlap the match bits
            for a in d.args {
                assert_eq!(a.mask & d.mask, 0, "{}", d.mnemonic);
            }
        }
    }

    #[test]
    fn test_broad_entry_first_is_rejected() {
        let table = [OPCODE_TABLE[2], OPCODE_TABLE[0]]; // SYS before CLS
        match check_table(&table) {
            Err(MachineError::AmbiguousOpcode { earlier, later }) => {
                assert_eq!(earlier, Mnemonic::SysAddr);
                assert_eq!(later, Mnemonic::Cls);
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_arithmetic_family_needs_low_nibble() {
        // 8xy_ ops only disambiguate because the mask covers the low nibble
        let or = OPCODE_TABLE[11];
        let and = OPCODE_TABLE[12];
        assert!(!or.overlaps(&and));
        let sloppy = OpcodeDescriptor::new(OrVxVy, 0xf000, 0x8000, XY);
        assert!(check_table(&[sloppy, and]).is_err());
    }

    #[test]
    fn test_extract() {
        assert_eq!(VX.extract(0xd125), 0x1);
        assert_eq!(VY.extract(0xd125), 0x2);
        assert_eq!(NIBBLE.extract(0xd125), 0x5);
        assert_eq!(BYTE.extract(0x6a42), 0x42);
        assert_eq!(ADDR.extract(0x1234), 0x234);
    }

    #[test]
    fn test_names() {
        assert_eq!(Mnemonic::StoreRegs.to_string(), "LD_[I]_VX");
        assert_eq!(Mnemonic::DrwVxVyNibble.name(), "DRW_VX_VY_NIBBLE");
    }
}
