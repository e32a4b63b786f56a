//! Entrypoint for CLI
mod config;
mod error;
mod headless;

use std::{env, time::Instant};

use chip8::{constants::*, loader, prelude::*, Clock, IMPL_VERSION};
use log::{debug, error, info};

use self::{config::RunConfig, error::AppError, headless::HeadlessDevices};

/// Frames to run when the config doesn't say, ten seconds at 60Hz.
const DEFAULT_FRAMES: u64 = 600;

static USAGE: &str = r#"
usage: chip8 CMD FILE [CONFIG]

commands:
    run     Run the target ROM file without a window,
            and print the final screen
    dis     Disassemble the target ROM into readable assembly

examples:
    chip8 run breakout.rom
    chip8 run breakout.rom breakout.yaml
    chip8 dis breakout.rom
"#;

fn run_rom(filepath: String, config_path: Option<String>) -> Result<(), AppError> {
    println!("Running Bytecode Interpreter");

    let config = match config_path {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };
    let frames = config.frames.unwrap_or(DEFAULT_FRAMES);

    let mut vm = Chip8Vm::new(config.vm);
    vm.load_rom(&filepath)?;

    let mut devices = HeadlessDevices::new(config.keys);
    let mut clock = Clock::default();
    clock.reset();

    let start = Instant::now();
    let mut result = Ok(());

    while devices.frame() < frames {
        clock.wait();
        let elapsed = clock.lap();

        if let Err(err) = vm.run_frame(&mut devices, elapsed) {
            error!("frame {}: {err}", devices.frame());
            result = Err(err);
            break;
        }
    }

    let end = Instant::now();
    info!(
        "{} frames, {} presented, in {}ms",
        devices.frame(),
        devices.draw_count(),
        end.duration_since(start).as_nanos() as f64 / 1000000.0
    );
    if vm.is_waiting_for_key() {
        info!("stopped while waiting for a keypress");
    }
    if devices.buzzer() {
        info!("stopped with the buzzer on");
    }
    debug!("keys\n{}", vm.dump_keys()?);

    print_screen(devices.screen());

    result?;

    Ok(())
}

/// Print the last presented frame.
fn print_screen(screen: &[bool; DISPLAY_BUFFER_SIZE]) {
    for row in screen.chunks(DISPLAY_WIDTH) {
        let line: String = row.iter().map(|on| if *on { '#' } else { '.' }).collect();
        println!("{line}");
    }
}

fn run_disassembler(filepath: String) -> Result<(), AppError> {
    let bytecode = loader::read_rom(&filepath)?;

    let mut vm = Chip8Vm::new(Chip8Conf::default());
    vm.load_bytecode(&bytecode)?;

    print!("{}", vm.dump_ram(bytecode.len())?);

    Ok(())
}

fn main() -> Result<(), AppError> {
    if let Err(err) = simple_logger::SimpleLogger::new().env().init() {
        eprintln!("failed to initialise logger: {err}");
    }

    match parse_args() {
        Some(Cmd::Run { filepath, config }) => run_rom(filepath, config)?,
        Some(Cmd::Dis { filepath }) => run_disassembler(filepath)?,
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    }

    Ok(())
}

fn parse_args() -> Option<Cmd> {
    let mut args = env::args().skip(1);
    match args.next()?.as_str() {
        "run" => Some(Cmd::Run {
            filepath: args.next()?,
            config: args.next(),
        }),
        "dis" => Some(Cmd::Dis {
            filepath: args.next()?,
        }),
        _ => None,
    }
}

fn print_usage() {
    println!("Chip8 v{IMPL_VERSION}");
    println!("{USAGE}");
}

enum Cmd {
    /// Run file
    Run {
        filepath: String,
        config: Option<String>,
    },
    /// Disassemble
    Dis { filepath: String },
}
