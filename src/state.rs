use crate::error::MachineError;
use crate::memory::CHIP8_PROGRAM_ADDR;

pub const REGISTER_COUNT: usize = 16;
pub const STACK_DEPTH: usize = 16;

/// VF doubles as the carry/borrow/collision flag
pub const VF: usize = 0xf;

/// CPU-side machine state. Only the executor changes registers, the stack,
/// I and PC; the timer drivers only count DT and ST down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineState {
    /// V0-VF
    pub registers: [u8; REGISTER_COUNT],
    /// index register; only 12 bits are meaningful but nothing masks it
    pub i: u16,
    pub program_counter: u16,
    pub delay_timer: u8,
    pub sound_timer: u8,
    stack: [u16; STACK_DEPTH],
    /// number of return addresses held, so `stack[depth - 1]` is the top
    depth: usize,
}

impl Default for MachineState {
    fn default() -> Self {
        Self::new()
    }
}

impl MachineState {
    pub fn new() -> Self {
        MachineState {
            registers: [0; REGISTER_COUNT],
            i: 0,
            program_counter: CHIP8_PROGRAM_ADDR,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_DEPTH],
            depth: 0,
        }
    }

    /// back to power-on state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn flag(&self) -> u8 {
        self.registers[VF]
    }

    pub fn set_flag(&mut self, on: bool) {
        self.registers[VF] = on as u8;
    }

    pub fn stack_depth(&self) -> usize {
        self.depth
    }

    /// the return addresses currently held, oldest first
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.depth]
    }

    pub fn push(&mut self, return_addr: u16) -> Result<(), MachineError> {
        if self.depth == STACK_DEPTH {
            return Err(MachineError::StackOverflow {
                pc: self.program_counter,
            });
        }
        self.stack[self.depth] = return_addr;
        self.depth += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, MachineError> {
        if self.depth == 0 {
            return Err(MachineError::StackUnderflow {
                pc: self.program_counter,
            });
        }
        self.depth -= 1;
        Ok(self.stack[self.depth])
    }

    /// one delay timer period elapsed
    pub fn tick_delay(&mut self) -> u8 {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.delay_timer
    }

    /// one sound timer period elapsed; returns what's left
    pub fn tick_sound(&mut self) -> u8 {
        self.sound_timer = self.sound_timer.saturating_sub(1);
        self.sound_timer
    }
}
