//! Bytecode interpreter.
use log::{debug, error};
use rand::prelude::*;

use crate::{
    bytecode::{opcode, Op},
    constants::*,
    cpu::Chip8Cpu,
    error::{Chip8Error, Chip8Result},
    vm::{Flow, Quirks},
};

/// Fetch, decode and execute a single instruction.
///
/// While the machine is blocked on `Fx0A` nothing is fetched, and the
/// keypad is checked for a new keypress instead.
pub(crate) fn step(
    cpu: &mut Chip8Cpu,
    rng: &mut dyn RngCore,
    quirks: &Quirks,
) -> Chip8Result<Flow> {
    if let Some(vx) = cpu.key_wait {
        return Ok(resume_key_wait(cpu, vx));
    }

    let pc = cpu.registers.pc();
    if !cpu.pc_in_bounds() {
        error!("program counter left memory: 0x{pc:04X}");
        return Err(Chip8Error::AddressOutOfRange { address: pc });
    }

    let bytes = cpu.instr();
    let op = match Op::decode(bytes) {
        Some(op) => op,
        None => {
            let err = Chip8Error::InvalidOpcode {
                opcode: opcode(bytes),
                address: pc as Address,
            };
            error!("{err}");
            return Err(err);
        }
    };

    op_trace(pc, &op);

    // Jumps, calls and skips overwrite this default advance.
    cpu.registers.set_pc(pc + 2);

    execute(cpu, op, rng, quirks)
}

fn resume_key_wait(cpu: &mut Chip8Cpu, vx: u8) -> Flow {
    match cpu.keypad.take_pressed() {
        Some(key_id) => {
            debug!("key wait resolved: v{vx:X} = k{key_id:x}");
            cpu.registers.set_v(vx, key_id);
            cpu.key_wait = None;
            Flow::Ok
        }
        None => Flow::KeyWait,
    }
}

/// Execute a decoded operation against the machine state.
///
/// The program counter must already point past the instruction.
pub(crate) fn execute(
    cpu: &mut Chip8Cpu,
    op: Op,
    rng: &mut dyn RngCore,
    quirks: &Quirks,
) -> Chip8Result<Flow> {
    let regs = &mut cpu.registers;
    let mut control_flow = Flow::Ok;

    match op {
        // 00E0 (CLS)
        Op::ClearScreen => {
            cpu.display.clear();
            control_flow = Flow::Draw;
        }
        // 00EE (RET)
        //
        // Set the program counter to the address at the top of the stack.
        Op::Return => {
            let address = regs.pop()?;
            regs.set_pc(address as usize);
            control_flow = Flow::Jump;
        }
        // 1NNN (JP addr)
        Op::Jump { address } => {
            regs.set_pc(address as usize);
            control_flow = Flow::Jump;
        }
        // 2NNN (CALL addr)
        //
        // The return address is the instruction after the call.
        Op::Call { address } => {
            let ret = regs.pc() as Address;
            regs.push(ret)?;
            regs.set_pc(address as usize);
            control_flow = Flow::Jump;
        }
        // 3XNN (SE Vx, byte)
        Op::SkipEqByte { vx, nn } => {
            if regs.v(vx) == nn {
                regs.skip();
            }
        }
        // 4XNN (SNE Vx, byte)
        Op::SkipNotEqByte { vx, nn } => {
            if regs.v(vx) != nn {
                regs.skip();
            }
        }
        // 5XY0 (SE Vx, Vy)
        Op::SkipEq { vx, vy } => {
            if regs.v(vx) == regs.v(vy) {
                regs.skip();
            }
        }
        // 6XNN (LD Vx, byte)
        Op::LoadByte { vx, nn } => regs.set_v(vx, nn),
        // 7XNN (ADD Vx, byte)
        //
        // Carry flag is not set.
        Op::AddByte { vx, nn } => {
            let x = regs.v(vx);
            regs.set_v(vx, x.wrapping_add(nn));
        }
        // Arithmetic instructions
        Op::Load { .. }
        | Op::Or { .. }
        | Op::And { .. }
        | Op::Xor { .. }
        | Op::Add { .. }
        | Op::Sub { .. }
        | Op::ShiftRight { .. }
        | Op::SubReverse { .. }
        | Op::ShiftLeft { .. } => control_flow = exec_math(cpu, op, quirks),
        // 9XY0 (SNE Vx, Vy)
        Op::SkipNotEq { vx, vy } => {
            if regs.v(vx) != regs.v(vy) {
                regs.skip();
            }
        }
        // ANNN (LD I, addr)
        Op::LoadAddress { address } => regs.set_address(address),
        // BNNN (JP V0, addr)
        //
        // Unlike the address register, the target is not wrapped.
        Op::JumpOffset { address } => {
            let target = address as usize + regs.v(0) as usize;
            if target >= MEM_SIZE {
                error!("jump out of range: 0x{target:04X}");
                return Err(Chip8Error::AddressOutOfRange { address: target });
            }
            regs.set_pc(target);
            control_flow = Flow::Jump;
        }
        // CXNN (RND Vx, byte)
        //
        // Set register VX to the result of bitwise AND between a random number and NN.
        Op::Random { vx, nn } => {
            regs.set_v(vx, nn & rng.gen::<u8>());
        }
        // DXYN (DRW Vx, Vy, nibble)
        //
        // Draw sprite to the display buffer, at coordinate as per registers VX and VY.
        // Sprite is N rows high, stored in memory pointed to by address register I.
        //
        // If the drawing operation erases existing pixels in the display buffer, register VF is set to
        // 1, and set to 0 if no display bits are unset. This is used for collision detection.
        Op::Draw { vx, vy, n } => {
            let (x, y) = (regs.v(vx) as usize, regs.v(vy) as usize);
            let base = regs.address() as usize;
            let height = n as usize;

            let mut sprite = [0; SPRITE_MAX_HEIGHT];
            for (r, row) in sprite.iter_mut().take(height).enumerate() {
                *row = cpu.ram.read(base + r);
            }

            let is_erased = cpu.display.draw_sprite(x, y, &sprite[..height]);
            cpu.registers.set_flag(is_erased);
            control_flow = Flow::Draw;
        }
        _ => control_flow = exec_misc(cpu, op, quirks),
    }

    Ok(control_flow)
}

/// Execute an arithmetic instruction
///
/// Flag is written after the result, so when Vx is VF the flag wins.
#[inline]
fn exec_math(cpu: &mut Chip8Cpu, op: Op, quirks: &Quirks) -> Flow {
    let regs = &mut cpu.registers;

    match op {
        // 8XY0 (LD Vx, Vy)
        Op::Load { vx, vy } => regs.set_v(vx, regs.v(vy)),
        // 8XY1 (OR Vx, Vy)
        Op::Or { vx, vy } => regs.set_v(vx, regs.v(vx) | regs.v(vy)),
        // 8XY2 (AND Vx, Vy)
        Op::And { vx, vy } => regs.set_v(vx, regs.v(vx) & regs.v(vy)),
        // 8XY3 (XOR Vx, Vy)
        Op::Xor { vx, vy } => regs.set_v(vx, regs.v(vx) ^ regs.v(vy)),
        // 8XY4 (ADD Vx, Vy)
        //
        // If overflow, set VF to 1, else 0.
        Op::Add { vx, vy } => {
            let (result, overflow) = regs.v(vx).overflowing_add(regs.v(vy));
            regs.set_v(vx, result);
            regs.set_flag(overflow);
        }
        // 8XY5 (SUB Vx, Vy)
        //
        // VF is set to 0 when there is a borrow, set to 1 when there isn't.
        Op::Sub { vx, vy } => {
            let (x, y) = (regs.v(vx), regs.v(vy));
            regs.set_v(vx, x.wrapping_sub(y));
            regs.set_flag(x >= y);
        }
        // 8XY6 (SHR Vx)
        //
        // VF receives the least-significant bit shifted out.
        Op::ShiftRight { vx, vy } => {
            let src = if quirks.shift_uses_vy {
                regs.v(vy)
            } else {
                regs.v(vx)
            };
            regs.set_v(vx, src >> 1);
            regs.set_flag(src & 1 == 1);
        }
        // 8XY7 (SUBN Vx, Vy)
        //
        // Subtracts VX from VY, and stores the result in VX.
        Op::SubReverse { vx, vy } => {
            let (x, y) = (regs.v(vx), regs.v(vy));
            regs.set_v(vx, y.wrapping_sub(x));
            regs.set_flag(y >= x);
        }
        // 8XYE (SHL Vx)
        //
        // VF receives the most-significant bit shifted out.
        Op::ShiftLeft { vx, vy } => {
            let src = if quirks.shift_uses_vy {
                regs.v(vy)
            } else {
                regs.v(vx)
            };
            regs.set_v(vx, src << 1);
            regs.set_flag(src >> 7 == 1);
        }
        _ => unreachable!("not an arithmetic operation: {op}"),
    }

    Flow::Ok
}

/// Execute a keyboard, timer or memory instruction
#[inline]
fn exec_misc(cpu: &mut Chip8Cpu, op: Op, quirks: &Quirks) -> Flow {
    let mut control_flow = Flow::Ok;

    match op {
        // ----------------------------------------------------------------
        // Ex9E (SKP Vx)
        Op::SkipPressed { vx } => {
            if cpu.keypad.is_pressed(cpu.registers.v(vx)) {
                cpu.registers.skip();
            }
        }
        // ExA1 (SKNP Vx)
        Op::SkipNotPressed { vx } => {
            if !cpu.keypad.is_pressed(cpu.registers.v(vx)) {
                cpu.registers.skip();
            }
        }
        // ----------------------------------------------------------------
        // Fx07 (LD Vx, DT)
        Op::LoadDelay { vx } => {
            let delay = cpu.timers.delay();
            cpu.registers.set_v(vx, delay);
        }
        // Fx0A (LD Vx, K)
        //
        // Wait for a key press, store the value of the key in Vx.
        // Execution stalls until a key goes down. Keys already held
        // when the wait starts don't count.
        Op::WaitKey { vx } => {
            debug!("waiting for key into v{vx:X}");
            cpu.keypad.clear_edges();
            cpu.key_wait = Some(vx);
            control_flow = Flow::KeyWait;
        }
        // Fx15 (LD DT, Vx)
        Op::SetDelay { vx } => {
            cpu.timers.set_delay(cpu.registers.v(vx));
        }
        // Fx18 (LD ST, Vx)
        Op::SetSound { vx } => {
            if cpu.timers.set_sound(cpu.registers.v(vx)).is_some() {
                control_flow = Flow::Sound;
            }
        }
        // Fx1E (ADD I, Vx)
        //
        // Wraps within 12 bits.
        Op::AddAddress { vx } => {
            let addr = cpu.registers.address();
            let x = cpu.registers.v(vx) as Address;
            cpu.registers.set_address(addr.wrapping_add(x));
        }
        // Fx29 (LD F, Vx)
        //
        // Set I = location of sprite for digit Vx.
        Op::LoadFont { vx } => {
            let digit = (cpu.registers.v(vx) & 0xF) as Address;
            cpu.registers
                .set_address(FONTSET_START + digit * FONTSET_HEIGHT as Address);
        }
        // Fx33 (LD B, Vx)
        //
        // Store the binary-coded decimal representation of Vx
        // in the memory locations I, I+1, and I+2.
        #[rustfmt::skip]
        Op::StoreBcd { vx } => {
            let addr = cpu.registers.address() as usize;
            let x = cpu.registers.v(vx);
            cpu.ram.write(addr,     x / 100 % 10);
            cpu.ram.write(addr + 1, x / 10  % 10);
            cpu.ram.write(addr + 2, x       % 10);
        }
        // Fx55 (LD [I], Vx)
        //
        // Store registers V0 through Vx in memory starting at location I.
        Op::StoreRegisters { vx } => {
            let addr = cpu.registers.address() as usize;
            for v in 0..=vx {
                cpu.ram.write(addr + v as usize, cpu.registers.v(v));
            }
            increment_address(cpu, vx, quirks);
        }
        // Fx65 (LD Vx, [I])
        //
        // Read registers V0 through Vx from memory starting at location I.
        Op::LoadRegisters { vx } => {
            let addr = cpu.registers.address() as usize;
            for v in 0..=vx {
                cpu.registers.set_v(v, cpu.ram.read(addr + v as usize));
            }
            increment_address(cpu, vx, quirks);
        }
        _ => unreachable!("not a miscellaneous operation: {op}"),
    }

    control_flow
}

/// Legacy interpreters advanced I past the last register transferred by
/// `Fx55` and `Fx65`.
#[inline]
fn increment_address(cpu: &mut Chip8Cpu, vx: u8, quirks: &Quirks) {
    if quirks.load_store_increments_i {
        let addr = cpu.registers.address();
        cpu.registers
            .set_address(addr.wrapping_add(vx as Address + 1));
    }
}

#[cfg(feature = "op_trace")]
#[inline]
fn op_trace(pc: usize, op: &Op) {
    log::trace!("{:04X}: {}", pc, op);
}

#[cfg(not(feature = "op_trace"))]
#[inline]
fn op_trace(_: usize, _: &Op) {}
