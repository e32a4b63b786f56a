mod bytecode;
mod clock;
pub mod constants;
mod cpu;
mod devices;
mod display;
mod error;
mod interp;
mod keypad;
pub mod loader;
mod memory;
mod registers;
mod timers;
mod vm;

pub use self::{
    bytecode::Op,
    clock::{Clock, Hz},
    cpu::Chip8Cpu,
    devices::{Devices, InvalidKeyCode, KeyCode, NullDevices},
    display::{Chip8DisplayBuffer, Display},
    error::{Chip8Error, Chip8Result, ErrorKind},
    keypad::Keypad,
    memory::Memory,
    registers::Registers,
    timers::Timers,
    vm::{Chip8Conf, Chip8Vm, Flow, Quirks},
};

/// Version of this implementation.
pub const IMPL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    pub use super::{
        clock::Hz,
        devices::{Devices, KeyCode},
        error::{Chip8Error, Chip8Result},
        vm::{Chip8Conf, Chip8Vm, Flow, Quirks},
    };
}
