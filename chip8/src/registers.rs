//! Registers and call stack.
use crate::{
    constants::*,
    error::{Chip8Error, Chip8Result},
};

/// Register bank of the virtual CPU.
#[derive(Debug, Clone)]
pub struct Registers {
    /// General purpose registers for temporary values.
    ///
    /// Register 16 (VF) is used for either the carry flag or borrow switch depending on opcode.
    v: [u8; REGISTER_COUNT],
    /// Pointer register used for temporarily storing an address. Since addresses are 12 bits, only the
    /// lowest (rightmost) bits are used.
    address: Address,
    /// Program counter pointing to the current position in the bytecode.
    pc: usize,
    /// Stack of return pointers used for jumping when a routine call finishes.
    stack: [Address; STACK_SIZE],
    /// Stack pointer, the number of return addresses on the stack.
    sp: usize,
}

impl Default for Registers {
    fn default() -> Self {
        Self {
            v: [0; REGISTER_COUNT],
            address: 0,
            pc: 0,
            stack: [0; STACK_SIZE],
            sp: 0,
        }
    }
}

impl Registers {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline(always)]
    pub fn v(&self, index: u8) -> u8 {
        self.v[index as usize & 0xF]
    }

    #[inline(always)]
    pub fn set_v(&mut self, index: u8, value: u8) {
        self.v[index as usize & 0xF] = value;
    }

    /// Set the flag register VF.
    #[inline(always)]
    pub fn set_flag(&mut self, flag: bool) {
        self.v[FLAG_REGISTER] = flag as u8;
    }

    pub fn v_all(&self) -> &[u8; REGISTER_COUNT] {
        &self.v
    }

    #[inline(always)]
    pub fn address(&self) -> Address {
        self.address
    }

    #[inline(always)]
    pub fn set_address(&mut self, address: Address) {
        self.address = address & ADDRESS_MASK;
    }

    #[inline(always)]
    pub fn pc(&self) -> usize {
        self.pc
    }

    #[inline(always)]
    pub fn set_pc(&mut self, pc: usize) {
        self.pc = pc;
    }

    /// Move the program counter past the next instruction.
    #[inline(always)]
    pub fn skip(&mut self) {
        self.pc += 2;
    }

    /// Number of return addresses on the call stack.
    pub fn depth(&self) -> usize {
        self.sp
    }

    pub fn push(&mut self, address: Address) -> Chip8Result<()> {
        if self.sp >= STACK_SIZE {
            return Err(Chip8Error::StackOverflow);
        }
        self.stack[self.sp] = address;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Chip8Result<Address> {
        if self.sp == 0 {
            return Err(Chip8Error::StackUnderflow);
        }
        self.sp -= 1;
        Ok(self.stack[self.sp])
    }
}
