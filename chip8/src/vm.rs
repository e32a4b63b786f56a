//! Virtual machine.
use std::{
    fmt::{self, Write},
    path::Path,
    time::Duration,
};

use log::{debug, info};
use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::{
    bytecode::Op,
    clock::{Clock, Hz},
    constants::*,
    cpu::Chip8Cpu,
    devices::{Devices, KeyCode},
    display::Chip8DisplayBuffer,
    error::{Chip8Error, Chip8Result},
    interp, loader,
    memory::check_program_size,
};

pub struct Chip8Vm {
    cpu: Chip8Cpu,
    /// Instruction clock.
    clock: Clock,
    /// Delay and sound timer clock, fixed at 60Hz.
    timer: Clock,
    /// Source of random bytes for `Cxnn`.
    rng: Box<dyn RngCore + Send>,
    /// Buzzer transitions not yet forwarded to the audio device.
    buzz_events: Vec<bool>,
    conf: Chip8Conf,
}

impl Chip8Vm {
    pub fn new(conf: Chip8Conf) -> Self {
        let rng = match conf.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(conf, rng)
    }

    /// Create a VM drawing random numbers from the given generator.
    pub fn with_rng(conf: Chip8Conf, rng: impl RngCore + Send + 'static) -> Self {
        let frequency = conf
            .clock_frequency
            .unwrap_or(Hz(DEFAULT_CLOCK_FREQUENCY));

        Chip8Vm {
            cpu: Chip8Cpu::new(),
            clock: Clock::from_hz(frequency),
            timer: Clock::default(),
            rng: Box::new(rng),
            buzz_events: Vec::new(),
            conf,
        }
    }

    /// Configuration that was used to instantiate the VM.
    pub fn config(&self) -> &Chip8Conf {
        &self.conf
    }

    /// Read a ROM file and load it into memory.
    pub fn load_rom(&mut self, filepath: impl AsRef<Path>) -> Chip8Result<()> {
        let bytecode = loader::read_rom(filepath)?;
        self.load_bytecode(&bytecode)
    }

    pub fn load_bytecode(&mut self, bytecode: &[u8]) -> Chip8Result<()> {
        if !check_program_size(bytecode) {
            return Err(Chip8Error::RomTooLarge {
                size: bytecode.len(),
                max: PROGRAM_MAX_SIZE,
            });
        }

        // Start with clean memory to avoid leaking previous program.
        self.cpu.reset();

        // Load program into virtual RAM
        self.cpu.ram.load_program(bytecode)?;

        // Reset the program counter to prepare for execution.
        self.cpu.registers.set_pc(MEM_START);

        self.reset();

        info!("loaded program: {} bytes", bytecode.len());

        Ok(())
    }

    pub fn display_buffer(&self) -> Chip8DisplayBuffer<'_> {
        self.cpu.display.snapshot()
    }

    /// Read access to the machine state.
    pub fn cpu(&self) -> &Chip8Cpu {
        &self.cpu
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Flow {
    Ok,
    /// Program counter has jumped to a new address.
    ///
    /// This is useful for the caller to avoid being
    /// blocked on infinite or long running loops.
    ///
    /// This is returned when the interpreter encounters:
    ///
    /// - 1nnn (`JP addr`)
    /// - 2nnn (`CALL addr`)
    /// - 00EE (`RET`)
    /// - Bnnn (`JP V0, addr`)
    Jump,
    /// Display buffer was modified.
    Draw,
    /// Buzzer was switched on or off.
    Sound,
    /// Wait for a keypress.
    ///
    /// This is triggered by the opcode `Fx0A` (`LD Vx, K`), which stops
    /// execution until a key is pressed, and loads the key value into `Vx`.
    KeyWait,
}

/// VM Configuration Parameters.
#[derive(Debug, Default, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Chip8Conf {
    /// Instructions executed per second by [`Chip8Vm::update`].
    ///
    /// A frequency of zero leaves stepping entirely to the caller.
    pub clock_frequency: Option<Hz>,
    pub quirks: Quirks,
    /// Seed for the random number generator, for reproducible runs.
    pub seed: Option<u64>,
}

/// Behaviours that differ between historical interpreters.
///
/// The defaults follow the common modern convention.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Quirks {
    /// `8xy6` and `8xyE` shift `Vy` and store the result in `Vx`,
    /// instead of shifting `Vx` in place.
    pub shift_uses_vy: bool,
    /// `Fx55` and `Fx65` leave `I` pointing after the last register.
    pub load_store_increments_i: bool,
}

/// Interpreter
impl Chip8Vm {
    /// Sets the keyboard key input state.
    ///
    /// A key going down resumes a VM that is waiting for input.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        self.cpu.keypad.set_key(key.as_u8(), pressed);
    }

    /// Clear the keyboard input state, setting all keys to up.
    pub fn clear_keys(&mut self) {
        self.cpu.keypad.clear()
    }

    /// Whether the machine is stalled on `Fx0A`.
    pub fn is_waiting_for_key(&self) -> bool {
        self.cpu.key_wait.is_some()
    }

    /// Clear internal state in preparation for a fresh startup.
    fn reset(&mut self) {
        self.clock.reset();
        self.timer.reset();
        self.buzz_events.clear();
    }

    /// Execute a single instruction.
    pub fn step(&mut self) -> Chip8Result<Flow> {
        let flow = interp::step(&mut self.cpu, self.rng.as_mut(), &self.conf.quirks)?;

        if flow == Flow::Sound {
            let state = self.cpu.timers.buzzer();
            debug!("buzzer {}", if state { "on" } else { "off" });
        }

        Ok(flow)
    }

    /// Execute the given number of instructions, without counting down timers.
    pub fn run_steps(&mut self, step_count: usize) -> Chip8Result<Flow> {
        let mut flow = Flow::Ok;

        for _ in 0..step_count {
            flow = self.step()?;
        }

        Ok(flow)
    }

    /// Count down the delay and sound timers by one 60Hz cycle.
    ///
    /// Returns the new buzzer state when the sound timer reached zero.
    pub fn tick_timers(&mut self) -> Option<bool> {
        let change = self.cpu.timers.tick();

        if let Some(state) = change {
            debug!("buzzer {}", if state { "on" } else { "off" });
        }

        change
    }

    /// Advance the machine by the given amount of wall time.
    ///
    /// The instruction clock and the 60Hz timer clock accumulate time
    /// independently. The timer ticks that are due are spread evenly
    /// between the instruction steps that are due.
    ///
    /// Buzzer transitions of this batch are kept in [`Chip8Vm::buzz_events`]
    /// until the next call.
    pub fn update(&mut self, elapsed: Duration) -> Chip8Result<Flow> {
        self.buzz_events.clear();

        let steps = self.clock.advance(elapsed) as u64;
        let ticks = self.timer.advance(elapsed) as u64;

        let mut flow = Flow::Ok;
        let mut ticked = 0;

        for i in 0..steps {
            while ticked * steps < i * ticks {
                self.update_timers();
                ticked += 1;
            }
            flow = self.step()?;
            if flow == Flow::Sound {
                self.buzz_events.push(self.cpu.timers.buzzer());
            }
        }

        while ticked < ticks {
            self.update_timers();
            ticked += 1;
        }

        Ok(flow)
    }

    fn update_timers(&mut self) {
        if let Some(state) = self.tick_timers() {
            self.buzz_events.push(state);
        }
    }

    /// Buzzer transitions from the last [`Chip8Vm::update`], in order.
    pub fn buzz_events(&self) -> &[bool] {
        &self.buzz_events
    }

    /// Run one presentation frame against the given devices.
    ///
    /// Input is polled first, then the machine is advanced by `elapsed`,
    /// buzzer transitions are forwarded in order, and finally the display
    /// is presented once the frame's instructions have all completed.
    pub fn run_frame(
        &mut self,
        devices: &mut impl Devices,
        elapsed: Duration,
    ) -> Chip8Result<Flow> {
        devices.poll_keys(&mut self.cpu.keypad);

        let result = self.update(elapsed);

        for state in self.buzz_events.drain(..) {
            devices.buzz(state);
        }
        devices.draw(self.cpu.display.snapshot());

        result
    }
}

/// Troubleshooting
impl Chip8Vm {
    /// Returns the program memory as a human readable listing.
    pub fn dump_ram(&self, count: usize) -> Result<String, fmt::Error> {
        let mut buf = String::new();

        for addr in (MEM_START..MEM_START + count).step_by(2) {
            let bytes = self.cpu.ram.read_instr(addr);
            write!(buf, "{:04X}: {:02X}{:02X}", addr, bytes[0], bytes[1])?;
            match Op::decode(bytes) {
                Some(op) => writeln!(buf, " {op}")?,
                None => writeln!(buf)?,
            }
        }

        Ok(buf)
    }

    pub fn dump_display(&self) -> Result<String, fmt::Error> {
        self.cpu.display.dump()
    }

    pub fn dump_keys(&self) -> Result<String, fmt::Error> {
        let mut buf = String::new();

        if self.cpu.keypad.any_key() {
            write!(buf, "keys: ")?;
            for i in 0..KEY_COUNT {
                if self.cpu.keypad.is_pressed(i) {
                    write!(buf, "k{i:x}")?;
                }
            }
        }

        Ok(buf)
    }
}
