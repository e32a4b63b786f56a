//! ROM file loading.
use std::{fs, io, path::Path};

use log::info;

use crate::{
    constants::PROGRAM_MAX_SIZE,
    error::{Chip8Error, Chip8Result},
};

/// Read the raw bytes of a ROM file.
///
/// Fails before anything is loaded into the machine when the file is
/// missing, unreadable, or too large to fit in program memory.
pub fn read_rom(filepath: impl AsRef<Path>) -> Chip8Result<Vec<u8>> {
    let filepath = filepath.as_ref();
    info!("load rom: {}", filepath.display());

    let bytecode = fs::read(filepath).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => Chip8Error::RomNotFound(filepath.to_path_buf()),
        _ => Chip8Error::Io(err),
    })?;

    if bytecode.len() > PROGRAM_MAX_SIZE {
        return Err(Chip8Error::RomTooLarge {
            size: bytecode.len(),
            max: PROGRAM_MAX_SIZE,
        });
    }

    Ok(bytecode)
}

#[cfg(test)]
mod test {
    use std::{env, process};

    use super::*;
    use crate::error::ErrorKind;

    fn temp_rom(name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = env::temp_dir().join(format!("chip8-{}-{name}", process::id()));
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_missing_rom() {
        let err = read_rom("does/not/exist.ch8").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RomNotFound);
    }

    #[test]
    fn test_rom_too_large() {
        let path = temp_rom("large.ch8", &[0; PROGRAM_MAX_SIZE + 2]);
        let err = read_rom(&path).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert_eq!(err.kind(), ErrorKind::RomTooLarge);
    }

    #[test]
    fn test_read_rom() {
        let path = temp_rom("small.ch8", &[0x00, 0xE0, 0x12, 0x00]);
        let bytecode = read_rom(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(bytecode, vec![0x00, 0xE0, 0x12, 0x00]);
    }
}
