//! ROM image loading.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// BASIC ROM size, mapped at $A000.
pub const BASIC_ROM_SIZE: usize = 8192;

/// Character ROM size, mapped at $D000.
pub const CHAR_ROM_SIZE: usize = 4096;

/// Kernal ROM size, mapped at $E000.
pub const KERNAL_ROM_SIZE: usize = 8192;

#[derive(Debug, Error)]
pub enum RomError {
    #[error("cannot read ROM {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("ROM {} is {actual} bytes, expected at least {expected}", path.display())]
    TooShort {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },
}

/// Read a ROM image, keeping the first `size` bytes.
///
/// Longer files are accepted and truncated; shorter ones are an error.
pub fn load_rom(path: &Path, size: usize) -> Result<Vec<u8>, RomError> {
    let mut data = fs::read(path).map_err(|source| RomError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if data.len() < size {
        return Err(RomError::TooShort {
            path: path.to_path_buf(),
            expected: size,
            actual: data.len(),
        });
    }
    data.truncate(size);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("emu-c64-{}-{name}", std::process::id()));
        fs::write(&path, contents).expect("write scratch ROM");
        path
    }

    #[test]
    fn long_image_is_truncated() {
        let path = scratch("long.rom", &[0xAA; 5000]);
        let rom = load_rom(&path, CHAR_ROM_SIZE).expect("load ROM");
        assert_eq!(rom.len(), CHAR_ROM_SIZE);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn short_image_is_rejected() {
        let path = scratch("short.rom", &[0x00; 100]);
        let err = load_rom(&path, BASIC_ROM_SIZE).expect_err("too short");
        assert!(matches!(
            err,
            RomError::TooShort {
                expected: 8192,
                actual: 100,
                ..
            }
        ));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_rom(Path::new("/nonexistent/kernal.rom"), KERNAL_ROM_SIZE)
            .expect_err("missing file");
        assert_eq!(err.to_string(), "cannot read ROM /nonexistent/kernal.rom");
    }
}
