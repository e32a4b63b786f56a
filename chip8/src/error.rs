//! Result and errors.
use std::{
    fmt::{self, Display, Formatter},
    io,
    path::PathBuf,
};

use crate::constants::Address;

pub type Chip8Result<T> = std::result::Result<T, Chip8Error>;

#[derive(Debug)]
pub enum Chip8Error {
    /// Subroutine call nested deeper than the call stack allows.
    StackOverflow,
    /// Return from subroutine while the call stack is empty.
    StackUnderflow,
    /// Instruction did not match any known operation.
    InvalidOpcode { opcode: u16, address: Address },
    /// Program counter was moved outside of addressable memory.
    AddressOutOfRange { address: usize },
    /// ROM file does not exist.
    RomNotFound(PathBuf),
    /// Attempt to load a bytecode program that can't fit in memory.
    RomTooLarge { size: usize, max: usize },
    /// ROM file exists but could not be read.
    Io(io::Error),
}

/// Fieldless classification of [`Chip8Error`], for hosts deciding
/// whether to reset, report or abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    StackOverflow,
    StackUnderflow,
    InvalidOpcode,
    AddressOutOfRange,
    RomNotFound,
    RomTooLarge,
    Io,
}

impl Chip8Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StackOverflow => ErrorKind::StackOverflow,
            Self::StackUnderflow => ErrorKind::StackUnderflow,
            Self::InvalidOpcode { .. } => ErrorKind::InvalidOpcode,
            Self::AddressOutOfRange { .. } => ErrorKind::AddressOutOfRange,
            Self::RomNotFound(_) => ErrorKind::RomNotFound,
            Self::RomTooLarge { .. } => ErrorKind::RomTooLarge,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Errors raised while the interpreter loop was running.
    ///
    /// Load errors are reported before the first fetch and are not fatal
    /// to an already running machine.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::StackOverflow
                | ErrorKind::StackUnderflow
                | ErrorKind::InvalidOpcode
                | ErrorKind::AddressOutOfRange
        )
    }
}

impl Display for Chip8Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::StackOverflow => write!(f, "call stack overflow"),
            Self::StackUnderflow => write!(f, "call stack underflow"),
            Self::InvalidOpcode { opcode, address } => {
                write!(f, "invalid opcode {opcode:04X} at 0x{address:03X}")
            }
            Self::AddressOutOfRange { address } => {
                write!(f, "program counter out of range: 0x{address:04X}")
            }
            Self::RomNotFound(path) => write!(f, "rom not found: {}", path.display()),
            Self::RomTooLarge { size, max } => {
                write!(f, "program too large for VM memory: {size} bytes, max {max}")
            }
            Self::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Chip8Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Chip8Error {
    fn from(err: io::Error) -> Self {
        Chip8Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fatal_kinds() {
        assert!(Chip8Error::StackOverflow.is_fatal());
        assert!(Chip8Error::StackUnderflow.is_fatal());
        assert!(Chip8Error::InvalidOpcode {
            opcode: 0xFFFF,
            address: 0x200
        }
        .is_fatal());
        assert!(!Chip8Error::RomTooLarge { size: 4000, max: 3584 }.is_fatal());
        assert!(!Chip8Error::RomNotFound(PathBuf::from("missing.rom")).is_fatal());
    }

    #[test]
    fn test_display() {
        let err = Chip8Error::InvalidOpcode {
            opcode: 0x5AB1,
            address: 0x204,
        };
        assert_eq!(err.to_string(), "invalid opcode 5AB1 at 0x204");
        assert_eq!(err.kind(), ErrorKind::InvalidOpcode);
    }
}
