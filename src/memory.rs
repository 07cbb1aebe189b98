use crate::error::MachineError;
use log::debug;
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the machine's address space. Every access is bounds checked;
/// nothing aliases or wraps.
pub trait MemoryMap {
    /// write unknown len of data into memory at a particular address
    fn write_any(&mut self, reader: &mut dyn io::Read, addr: u16) -> Result<usize, MachineError> {
        let mut buf = Vec::new();
        let len = reader.read_to_end(&mut buf)?;
        self.write(buf.as_slice(), addr)?;
        Ok(len)
    }

    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16) -> Result<(), MachineError> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }

    fn get_byte(&self, addr: u16) -> Result<u8, MachineError> {
        Ok(self.get_ro_slice(addr, 1)?[0])
    }

    fn set_byte(&mut self, addr: u16, value: u8) -> Result<(), MachineError> {
        self.get_rw_slice(addr, 1)?[0] = value;
        Ok(())
    }

    /// get a big-endian two-byte word (instructions)
    fn get_word(&self, addr: u16) -> Result<u16, MachineError> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }

    fn set_word(&mut self, addr: u16, value: u16) -> Result<(), MachineError> {
        self.write(&value.to_be_bytes(), addr)
    }

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], MachineError>;

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], MachineError>;
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// where the hex digit glyphs live; LD F, Vx relies on this being zero
pub const CHIP8_FONT_ADDR: u16 = 0x0000;

/// bytes per hex digit glyph
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

/// CHIP-8 memory map, 4K configuration:
///   0x0000-0x004f  font (16 glyphs x 5 bytes)
///   0x0050-0x01ff  unused
///   0x0200-0x0fff  program
///
/// stack, registers and the framebuffer live outside addressable memory
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
    pub program_addr: u16,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], MachineError> {
        let a = addr as usize;
        self.bytes
            .get_mut(a..a + len)
            .ok_or(MachineError::OutOfRange { addr: a, len })
    }
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], MachineError> {
        let a = addr as usize;
        self.bytes
            .get(a..a + len)
            .ok_or(MachineError::OutOfRange { addr: a, len })
    }
}

impl Chip8MemoryMap {
    /// zeroed RAM with the font baked in
    pub fn new() -> Result<Self, MachineError> {
        let mut mm = Chip8MemoryMap {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice(),
            program_addr: CHIP8_PROGRAM_ADDR,
        };
        mm.write(&CHIP8_FONT, CHIP8_FONT_ADDR)?;
        Ok(mm)
    }

    /// load a CHIP-8 program at 0x200
    pub fn load_program(&mut self, reader: &mut dyn io::Read) -> Result<usize, MachineError> {
        let len = self.write_any(reader, self.program_addr)?;
        debug!("loaded {} byte program at 0x{:03x}", len, self.program_addr);
        Ok(len)
    }
}

const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
