//! # executor
//!
//! Applies one decoded instruction to the machine. All register arithmetic
//! wraps at 8 bits. I and PC are never masked to 12 bits here; a ROM that
//! walks off the end of memory gets an `OutOfRange` from the memory map on
//! the next access.
//!
//! Unless an instruction moves PC itself (jumps, CALL, RET, or LD Vx, K
//! waiting for a key) PC advances by one word afterwards. Skips add a second
//! word on top of that.
use crate::decoder::DecodedInstruction;
use crate::display::Display;
use crate::error::MachineError;
use crate::input::Keypad;
use crate::memory::{MemoryMap, CHIP8_FONT_ADDR, CHIP8_FONT_GLYPH_BYTES};
use crate::opcode::Mnemonic;
use crate::random::RandomSource;
use crate::state::{MachineState, VF};
use log::{trace, warn};

/// one instruction is two bytes
pub const INSTRUCTION_BYTES: u16 = 2;

/// The devices an instruction can reach, handed over for the duration of a
/// single instruction.
pub struct Bus<'b> {
    pub memory: &'b mut dyn MemoryMap,
    pub display: &'b mut dyn Display,
    pub keypad: &'b mut dyn Keypad,
    pub random: &'b mut dyn RandomSource,
}

/// What happened to the program counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// on to the next word
    Next,
    /// skip the next word
    Skip,
    /// PC already set by the instruction
    Jumped,
    /// run this instruction again next cycle
    Stall,
}

pub fn execute(
    instruction: &DecodedInstruction,
    state: &mut MachineState,
    bus: &mut Bus,
) -> Result<(), MachineError> {
    trace!("{:03x}: {}", state.program_counter, instruction);

    let args = instruction.args();
    let arg = |n: usize| args.get(n).copied().unwrap_or(0);
    // register operands are nibbles so always in range
    let x = arg(0) as usize & 0xf;
    let y = arg(1) as usize & 0xf;
    let addr = arg(0);
    let byte = arg(1) as u8;

    let v = &mut state.registers;
    let flow = match instruction.mnemonic {
        Mnemonic::Cls => {
            bus.display.clear();
            Flow::Next
        }
        Mnemonic::Ret => {
            state.program_counter = state.pop()?;
            Flow::Jumped
        }
        // machine code routines on the 1802; nothing to run here
        Mnemonic::SysAddr => Flow::Next,
        Mnemonic::JpAddr => {
            state.program_counter = addr;
            Flow::Jumped
        }
        Mnemonic::CallAddr => {
            let return_addr = state.program_counter.wrapping_add(INSTRUCTION_BYTES);
            state.push(return_addr)?;
            state.program_counter = addr;
            Flow::Jumped
        }
        Mnemonic::SeVxByte => skip_if(v[x] == byte),
        Mnemonic::SneVxByte => skip_if(v[x] != byte),
        Mnemonic::SeVxVy => skip_if(v[x] == v[y]),
        Mnemonic::SneVxVy => skip_if(v[x] != v[y]),
        Mnemonic::LdVxByte => {
            v[x] = byte;
            Flow::Next
        }
        Mnemonic::AddVxByte => {
            // no carry flag for the immediate form
            v[x] = v[x].wrapping_add(byte);
            Flow::Next
        }
        Mnemonic::LdVxVy => {
            v[x] = v[y];
            Flow::Next
        }
        Mnemonic::OrVxVy => {
            v[x] |= v[y];
            Flow::Next
        }
        Mnemonic::AndVxVy => {
            v[x] &= v[y];
            Flow::Next
        }
        Mnemonic::XorVxVy => {
            v[x] ^= v[y];
            Flow::Next
        }
        Mnemonic::AddVxVy => {
            let (sum, carry) = v[x].overflowing_add(v[y]);
            v[VF] = carry as u8;
            v[x] = sum;
            Flow::Next
        }
        Mnemonic::SubVxVy => {
            let (minuend, subtrahend) = (v[x], v[y]);
            // strictly greater: equal operands leave VF clear
            v[VF] = (minuend > subtrahend) as u8;
            v[x] = minuend.wrapping_sub(subtrahend);
            Flow::Next
        }
        Mnemonic::SubnVxVy => {
            let (minuend, subtrahend) = (v[y], v[x]);
            v[VF] = (minuend > subtrahend) as u8;
            v[x] = minuend.wrapping_sub(subtrahend);
            Flow::Next
        }
        Mnemonic::ShrVxVy => {
            // shifts Vx in place; Vy is ignored
            let value = v[x];
            v[VF] = value & 0x01;
            v[x] = value >> 1;
            Flow::Next
        }
        Mnemonic::ShlVxVy => {
            let value = v[x];
            v[VF] = value >> 7;
            v[x] = value << 1;
            Flow::Next
        }
        Mnemonic::LdIAddr => {
            state.i = addr;
            Flow::Next
        }
        Mnemonic::JpV0Addr => {
            state.program_counter = addr.wrapping_add(v[0] as u16);
            Flow::Jumped
        }
        Mnemonic::RndVxByte => {
            v[x] = bus.random.next_byte() & byte;
            Flow::Next
        }
        Mnemonic::DrwVxVyNibble => {
            let rows = arg(2);
            let (left, top) = (v[x] as usize, v[y] as usize);
            v[VF] = 0;
            for row in 0..rows {
                let line = bus.memory.get_byte(state.i.wrapping_add(row))?;
                for col in 0..8 {
                    let bit = line & (0x80 >> col) != 0;
                    if bus.display.draw_pixel(left + col, top + row as usize, bit) {
                        state.registers[VF] = 1;
                    }
                }
            }
            Flow::Next
        }
        Mnemonic::SkpVx => skip_if(bus.keypad.is_pressed(v[x])),
        Mnemonic::SknpVx => skip_if(!bus.keypad.is_pressed(v[x])),
        Mnemonic::LdVxDt => {
            v[x] = state.delay_timer;
            Flow::Next
        }
        Mnemonic::LdVxK => match bus.keypad.take_pressed() {
            Some(key) => {
                v[x] = key;
                Flow::Next
            }
            None => Flow::Stall,
        },
        Mnemonic::LdDtVx => {
            state.delay_timer = v[x];
            Flow::Next
        }
        Mnemonic::LdStVx => {
            state.sound_timer = v[x];
            Flow::Next
        }
        Mnemonic::AddIVx => {
            // VF untouched on overflow
            state.i = state.i.wrapping_add(v[x] as u16);
            Flow::Next
        }
        Mnemonic::LdFVx => {
            state.i = CHIP8_FONT_ADDR + v[x] as u16 * CHIP8_FONT_GLYPH_BYTES;
            Flow::Next
        }
        Mnemonic::LdBVx => {
            let value = v[x];
            let i = state.i;
            bus.memory.set_byte(i, value / 100)?;
            bus.memory.set_byte(i.wrapping_add(1), value / 10 % 10)?;
            bus.memory.set_byte(i.wrapping_add(2), value % 10)?;
            Flow::Next
        }
        Mnemonic::StoreRegs => {
            // V0 through Vx inclusive, but I only moves on by x
            for r in 0..=x {
                bus.memory
                    .set_byte(state.i.wrapping_add(r as u16), state.registers[r])?;
            }
            state.i = state.i.wrapping_add(x as u16);
            Flow::Next
        }
        Mnemonic::LoadRegs => {
            for r in 0..=x {
                state.registers[r] = bus.memory.get_byte(state.i.wrapping_add(r as u16))?;
            }
            state.i = state.i.wrapping_add(x as u16);
            Flow::Next
        }
        Mnemonic::Unknown => {
            warn!(
                "unknown opcode {:04x} at {:03x}",
                instruction.opcode, state.program_counter
            );
            Flow::Next
        }
    };

    match flow {
        Flow::Next => advance(state, 1),
        Flow::Skip => advance(state, 2),
        Flow::Jumped | Flow::Stall => {}
    }
    Ok(())
}

fn skip_if(condition: bool) -> Flow {
    if condition {
        Flow::Skip
    } else {
        Flow::Next
    }
}

fn advance(state: &mut MachineState, words: u16) {
    state.program_counter = state
        .program_counter
        .wrapping_add(words * INSTRUCTION_BYTES);
}
