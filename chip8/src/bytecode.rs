//! Instruction decoding.
//!
//! Each instruction is two bytes, big-endian, with the opcode identity in
//! the first 4-bit nibble. Decoding splits the bytes into the nibbles
//! `op, x, y, n` and the immediates `nn` and `nnn`, then maps the pattern
//! onto an [`Op`].
use std::fmt::{self, Formatter};

use crate::constants::Address;

/// Combine two bytes into the 16-bit opcode.
#[inline(always)]
pub fn opcode(bytes: [u8; 2]) -> u16 {
    ((bytes[0] as u16) << 8) | (bytes[1] as u16)
}

/// Decoded operation with its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// 00E0 (CLS)
    ///
    /// Clear the screen.
    ClearScreen,
    /// 00EE (RET)
    ///
    /// Return from the sub-routine.
    Return,
    /// 1nnn (JP addr)
    ///
    /// Jump to the address in `nnn`.
    Jump { address: Address },
    /// 2nnn (CALL addr)
    ///
    /// Call the sub-routine at address `nnn`.
    Call { address: Address },
    /// 3xnn (SE Vx, byte)
    SkipEqByte { vx: u8, nn: u8 },
    /// 4xnn (SNE Vx, byte)
    SkipNotEqByte { vx: u8, nn: u8 },
    /// 5xy0 (SE Vx, Vy)
    SkipEq { vx: u8, vy: u8 },
    /// 6xnn (LD Vx, byte)
    LoadByte { vx: u8, nn: u8 },
    /// 7xnn (ADD Vx, byte)
    ///
    /// Carry flag is not set.
    AddByte { vx: u8, nn: u8 },

    // ------------------------------------------------------------------------
    // Math
    /// 8xy0 (LD Vx, Vy)
    Load { vx: u8, vy: u8 },
    /// 8xy1 (OR Vx, Vy)
    Or { vx: u8, vy: u8 },
    /// 8xy2 (AND Vx, Vy)
    And { vx: u8, vy: u8 },
    /// 8xy3 (XOR Vx, Vy)
    Xor { vx: u8, vy: u8 },
    /// 8xy4 (ADD Vx, Vy)
    ///
    /// VF is set to 1 on overflow, else 0.
    Add { vx: u8, vy: u8 },
    /// 8xy5 (SUB Vx, Vy)
    ///
    /// VF is set to 0 when there is a borrow, set to 1 when there isn't.
    Sub { vx: u8, vy: u8 },
    /// 8xy6 (SHR Vx {, Vy})
    ShiftRight { vx: u8, vy: u8 },
    /// 8xy7 (SUBN Vx, Vy)
    SubReverse { vx: u8, vy: u8 },
    /// 8xyE (SHL Vx {, Vy})
    ShiftLeft { vx: u8, vy: u8 },

    /// 9xy0 (SNE Vx, Vy)
    SkipNotEq { vx: u8, vy: u8 },
    /// Annn (LD I, addr)
    LoadAddress { address: Address },
    /// Bnnn (JP V0, addr)
    JumpOffset { address: Address },
    /// Cxnn (RND Vx, byte)
    Random { vx: u8, nn: u8 },
    /// Dxyn (DRW Vx, Vy, nibble)
    Draw { vx: u8, vy: u8, n: u8 },

    // ------------------------------------------------------------------------
    // Keyboard
    /// Ex9E (SKP Vx)
    SkipPressed { vx: u8 },
    /// ExA1 (SKNP Vx)
    SkipNotPressed { vx: u8 },

    // ------------------------------------------------------------------------
    // Miscellaneous
    /// Fx07 (LD Vx, DT)
    LoadDelay { vx: u8 },
    /// Fx0A (LD Vx, K)
    WaitKey { vx: u8 },
    /// Fx15 (LD DT, Vx)
    SetDelay { vx: u8 },
    /// Fx18 (LD ST, Vx)
    SetSound { vx: u8 },
    /// Fx1E (ADD I, Vx)
    AddAddress { vx: u8 },
    /// Fx29 (LD F, Vx)
    LoadFont { vx: u8 },
    /// Fx33 (LD B, Vx)
    StoreBcd { vx: u8 },
    /// Fx55 (LD [I], Vx)
    StoreRegisters { vx: u8 },
    /// Fx65 (LD Vx, [I])
    LoadRegisters { vx: u8 },
}

impl Op {
    /// Decode the instruction bytes.
    ///
    /// Returns `None` when the pattern matches no known operation.
    pub fn decode(bytes: [u8; 2]) -> Option<Op> {
        let [a, b] = bytes;
        let op = a >> 4; // 0xF000
        let vx = a & 0xF; // 0x0F00
        let vy = b >> 4; // 0x00F0
        let n = b & 0xF; // 0x000F
        let nn = b; // 0x00FF
        let nnn = (((a as u16) & 0xF) << 8) | b as u16; // 0x0FFF

        let decoded = match op {
            // Miscellaneous instructions identified by nnn
            0x0 => match nnn {
                0x0E0 => Op::ClearScreen,
                0x0EE => Op::Return,
                _ => return None,
            },
            0x1 => Op::Jump { address: nnn },
            0x2 => Op::Call { address: nnn },
            0x3 => Op::SkipEqByte { vx, nn },
            0x4 => Op::SkipNotEqByte { vx, nn },
            0x5 if n == 0 => Op::SkipEq { vx, vy },
            0x6 => Op::LoadByte { vx, nn },
            0x7 => Op::AddByte { vx, nn },
            // Arithmetic instructions indentified by n
            0x8 => match n {
                0x0 => Op::Load { vx, vy },
                0x1 => Op::Or { vx, vy },
                0x2 => Op::And { vx, vy },
                0x3 => Op::Xor { vx, vy },
                0x4 => Op::Add { vx, vy },
                0x5 => Op::Sub { vx, vy },
                0x6 => Op::ShiftRight { vx, vy },
                0x7 => Op::SubReverse { vx, vy },
                0xE => Op::ShiftLeft { vx, vy },
                _ => return None,
            },
            0x9 if n == 0 => Op::SkipNotEq { vx, vy },
            0xA => Op::LoadAddress { address: nnn },
            0xB => Op::JumpOffset { address: nnn },
            0xC => Op::Random { vx, nn },
            0xD => Op::Draw { vx, vy, n },
            0xE => match nn {
                0x9E => Op::SkipPressed { vx },
                0xA1 => Op::SkipNotPressed { vx },
                _ => return None,
            },
            0xF => match nn {
                0x07 => Op::LoadDelay { vx },
                0x0A => Op::WaitKey { vx },
                0x15 => Op::SetDelay { vx },
                0x18 => Op::SetSound { vx },
                0x1E => Op::AddAddress { vx },
                0x29 => Op::LoadFont { vx },
                0x33 => Op::StoreBcd { vx },
                0x55 => Op::StoreRegisters { vx },
                0x65 => Op::LoadRegisters { vx },
                _ => return None,
            },
            _ => return None,
        };

        Some(decoded)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Op::ClearScreen => write!(f, "CLS"),
            Op::Return => write!(f, "RET"),
            Op::Jump { address } => write!(f, "JP 0x{address:03X}"),
            Op::Call { address } => write!(f, "CALL 0x{address:03X}"),
            Op::SkipEqByte { vx, nn } => write!(f, "SE v{vx:X}, {nn}"),
            Op::SkipNotEqByte { vx, nn } => write!(f, "SNE v{vx:X}, {nn}"),
            Op::SkipEq { vx, vy } => write!(f, "SE v{vx:X}, v{vy:X}"),
            Op::LoadByte { vx, nn } => write!(f, "LD v{vx:X}, {nn}"),
            Op::AddByte { vx, nn } => write!(f, "ADD v{vx:X}, {nn}"),
            // ------
            Op::Load { vx, vy } => write!(f, "LD v{vx:X}, v{vy:X}"),
            Op::Or { vx, vy } => write!(f, "OR v{vx:X}, v{vy:X}"),
            Op::And { vx, vy } => write!(f, "AND v{vx:X}, v{vy:X}"),
            Op::Xor { vx, vy } => write!(f, "XOR v{vx:X}, v{vy:X}"),
            Op::Add { vx, vy } => write!(f, "ADD v{vx:X}, v{vy:X}"),
            Op::Sub { vx, vy } => write!(f, "SUB v{vx:X}, v{vy:X}"),
            Op::ShiftRight { vx, .. } => write!(f, "SHR v{vx:X}"),
            Op::SubReverse { vx, vy } => write!(f, "SUBN v{vx:X}, v{vy:X}"),
            Op::ShiftLeft { vx, .. } => write!(f, "SHL v{vx:X}"),
            // ------
            Op::SkipNotEq { vx, vy } => write!(f, "SNE v{vx:X}, v{vy:X}"),
            Op::LoadAddress { address } => write!(f, "LD I, 0x{address:03X}"),
            Op::JumpOffset { address } => write!(f, "JP v0, 0x{address:03X}"),
            Op::Random { vx, nn } => write!(f, "RND v{vx:X}, {nn}"),
            Op::Draw { vx, vy, n } => write!(f, "DRW v{vx:X}, v{vy:X}, {n}"),
            // ------
            Op::SkipPressed { vx } => write!(f, "SKP v{vx:X}"),
            Op::SkipNotPressed { vx } => write!(f, "SKNP v{vx:X}"),
            // ------
            Op::LoadDelay { vx } => write!(f, "LD v{vx:X}, DT"),
            Op::WaitKey { vx } => write!(f, "LD v{vx:X}, K"),
            Op::SetDelay { vx } => write!(f, "LD DT, v{vx:X}"),
            Op::SetSound { vx } => write!(f, "LD ST, v{vx:X}"),
            Op::AddAddress { vx } => write!(f, "ADD I, v{vx:X}"),
            Op::LoadFont { vx } => write!(f, "LD F, v{vx:X}"),
            Op::StoreBcd { vx } => write!(f, "LD B, v{vx:X}"),
            Op::StoreRegisters { vx } => write!(f, "LD [I], v{vx:X}"),
            Op::LoadRegisters { vx } => write!(f, "LD v{vx:X}, [I]"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_opcode_big_endian() {
        assert_eq!(opcode([0x6A, 0x0A]), 0x6A0A);
        assert_eq!(opcode([0x00, 0xEE]), 0x00EE);
    }

    #[test]
    fn test_decode_operands() {
        assert_eq!(
            Op::decode([0xD1, 0x25]),
            Some(Op::Draw { vx: 1, vy: 2, n: 5 })
        );
        assert_eq!(
            Op::decode([0xA2, 0xF0]),
            Some(Op::LoadAddress { address: 0x2F0 })
        );
        assert_eq!(
            Op::decode([0x7A, 0x05]),
            Some(Op::AddByte { vx: 0xA, nn: 0x05 })
        );
        assert_eq!(
            Op::decode([0x8C, 0xDE]),
            Some(Op::ShiftLeft { vx: 0xC, vy: 0xD })
        );
        assert_eq!(Op::decode([0xF3, 0x0A]), Some(Op::WaitKey { vx: 3 }));
    }

    #[test]
    fn test_decode_invalid() {
        // 0NNN machine code routines are not supported
        assert_eq!(Op::decode([0x01, 0x23]), None);
        assert_eq!(Op::decode([0x00, 0x00]), None);
        // Low nibble must be zero
        assert_eq!(Op::decode([0x51, 0x21]), None);
        assert_eq!(Op::decode([0x91, 0x2F]), None);
        assert_eq!(Op::decode([0x81, 0x28]), None);
        assert_eq!(Op::decode([0xE1, 0x9F]), None);
        assert_eq!(Op::decode([0xF1, 0x99]), None);
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(Op::ClearScreen.to_string(), "CLS");
        assert_eq!(
            Op::decode([0x6A, 0x0A]).unwrap().to_string(),
            "LD vA, 10"
        );
        assert_eq!(
            Op::decode([0xD0, 0x15]).unwrap().to_string(),
            "DRW v0, v1, 5"
        );
    }
}
