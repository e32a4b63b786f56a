//! Main memory.
use crate::{
    constants::*,
    error::{Chip8Error, Chip8Result},
};

/// Flat 4KiB byte store.
///
/// The lower 512 bytes hold the font glyphs, programs are loaded
/// from `MEM_START` onwards. Reads and writes wrap around the end
/// of the address space.
pub struct Memory {
    ram: Box<[u8; MEM_SIZE]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            ram: Box::new([0; MEM_SIZE]),
        }
    }
}

impl Memory {
    pub fn new() -> Self {
        let mut memory = Self::default();
        memory.load_font();
        memory
    }

    #[inline(always)]
    pub fn read(&self, address: usize) -> u8 {
        self.ram[address & MEM_MASK]
    }

    #[inline(always)]
    pub fn write(&mut self, address: usize, value: u8) {
        self.ram[address & MEM_MASK] = value;
    }

    /// Two bytes at the given address, in memory order.
    #[inline(always)]
    pub fn read_instr(&self, address: usize) -> [u8; 2] {
        [self.read(address), self.read(address + 1)]
    }

    /// Erase all memory, including fonts.
    pub fn clear(&mut self) {
        self.ram.fill(0);
    }

    /// Copy the built-in font glyphs into the reserved region.
    pub fn load_font(&mut self) {
        let start = FONTSET_START as usize;
        self.ram[start..start + FONTSET_DATA_LENGTH].copy_from_slice(&FONTSET);
    }

    /// Copy the program into memory at `MEM_START`.
    ///
    /// Fails without touching memory when the program doesn't fit.
    pub fn load_program(&mut self, bytecode: &[u8]) -> Chip8Result<()> {
        if !check_program_size(bytecode) {
            return Err(Chip8Error::RomTooLarge {
                size: bytecode.len(),
                max: PROGRAM_MAX_SIZE,
            });
        }

        self.ram[MEM_START..MEM_START + bytecode.len()].copy_from_slice(bytecode);

        Ok(())
    }
}

#[inline]
pub fn check_program_size(bytecode: &[u8]) -> bool {
    bytecode.len() <= PROGRAM_MAX_SIZE
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_font_loaded() {
        let memory = Memory::new();
        // Glyph for 0
        assert_eq!(memory.read(0), 0xF0);
        assert_eq!(memory.read(4), 0xF0);
        // Glyph for F starts at 5 * 15
        assert_eq!(memory.read(75), 0xF0);
        assert_eq!(memory.read(79), 0x80);
        assert_eq!(memory.read(80), 0x00);
    }

    #[test]
    fn test_address_wrap() {
        let mut memory = Memory::new();
        memory.write(MEM_SIZE + 0x300, 0xAB);
        assert_eq!(memory.read(0x300), 0xAB);
        assert_eq!(memory.read_instr(0xFFF), [0x00, 0xF0]);
    }

    #[test]
    fn test_program_size() {
        let mut memory = Memory::new();

        assert!(memory.load_program(&[0x12; PROGRAM_MAX_SIZE]).is_ok());
        assert_eq!(memory.read(0xFFF), 0x12);

        match memory.load_program(&[0; PROGRAM_MAX_SIZE + 1]) {
            Err(Chip8Error::RomTooLarge { size, max }) => {
                assert_eq!(size, 3585);
                assert_eq!(max, 3584);
            }
            _ => panic!("expected oversized program to be rejected"),
        }
    }
}
