//! Runner configuration file.
use std::{fs, path::Path};

use chip8::{Chip8Conf, KeyCode};
use log::info;
use serde::Deserialize;

use crate::error::AppError;

/// Settings for a headless run, loaded from YAML.
///
/// ```yaml
/// vm:
///   clock_frequency: 700
///   seed: 42
///   quirks:
///     shift_uses_vy: true
/// frames: 600
/// keys:
///   - { frame: 30, key: 5, pressed: true }
///   - { frame: 32, key: 5, pressed: false }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub vm: Chip8Conf,
    /// Number of 60Hz frames to run before stopping.
    pub frames: Option<u64>,
    /// Scripted keypad input, replayed in place of a keyboard.
    pub keys: Vec<KeyEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct KeyEvent {
    pub frame: u64,
    pub key: KeyCode,
    pub pressed: bool,
}

impl RunConfig {
    pub fn from_file(filepath: impl AsRef<Path>) -> Result<Self, AppError> {
        let filepath = filepath.as_ref();
        info!("loading config {}", filepath.display());

        let file = fs::File::open(filepath)?;
        Self::from_reader(file)
    }

    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, AppError> {
        let mut config: RunConfig = serde_yaml::from_reader(reader)?;
        config.keys.sort_by_key(|event| event.frame);
        Ok(config)
    }
}
