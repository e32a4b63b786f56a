//! CPU and memory state.
use crate::{
    constants::*, display::Display, keypad::Keypad, memory::Memory, registers::Registers,
    timers::Timers,
};

/// Core state for a chip8 interpreter.
///
/// Holds every component the instructions operate on, and is handed by
/// reference to the interpreter for each step.
pub struct Chip8Cpu {
    // ------------------------------------------------------------------------
    // Registers
    pub(crate) registers: Registers,
    pub(crate) timers: Timers,
    /// Indicates that the machine is waiting for a keypress,
    /// and which register will receive the key.
    pub(crate) key_wait: Option<u8>,

    // ------------------------------------------------------------------------
    // Memory
    /// Main memory storage space.
    pub(crate) ram: Memory,
    /// Screen buffer that is drawn too.
    pub(crate) display: Display,

    // ------------------------------------------------------------------------
    // Input
    pub(crate) keypad: Keypad,
}

impl Default for Chip8Cpu {
    fn default() -> Self {
        Self {
            registers: Registers::new(),
            timers: Timers::new(),
            key_wait: None,

            ram: Memory::new(),
            display: Display::new(),

            keypad: Keypad::new(),
        }
    }
}

impl Chip8Cpu {
    pub fn new() -> Self {
        Default::default()
    }

    /// Return every component to its power-on state, keeping the fonts.
    ///
    /// Key state belongs to the input device and is left untouched.
    pub(crate) fn reset(&mut self) {
        self.registers = Registers::new();
        self.timers = Timers::new();
        self.key_wait = None;
        self.ram.clear();
        self.ram.load_font();
        self.display.clear();
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn memory(&self) -> &Memory {
        &self.ram
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    /// Register awaiting a keypress, if the machine is blocked on `Fx0A`.
    pub fn key_wait(&self) -> Option<u8> {
        self.key_wait
    }

    /// Extract the instruction at the current program counter.
    #[inline(always)]
    pub fn instr(&self) -> [u8; 2] {
        self.ram.read_instr(self.registers.pc())
    }

    /// Whether the program counter points inside addressable memory,
    /// leaving room for a whole instruction.
    #[inline(always)]
    pub fn pc_in_bounds(&self) -> bool {
        self.registers.pc() + 1 < MEM_SIZE
    }
}
