//! C64 configuration: model selection, ROM images and clock pacing.

use std::path::Path;
use std::time::Duration;

use emu_core::MasterClock;

use crate::rom::{BASIC_ROM_SIZE, CHAR_ROM_SIZE, KERNAL_ROM_SIZE, RomError, load_rom};

/// C64 model variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum C64Model {
    /// PAL C64 (985,248 Hz CPU).
    #[default]
    C64Pal,
    /// NTSC C64 (1,022,727 Hz CPU).
    C64Ntsc,
}

impl C64Model {
    /// CPU clock for this model.
    #[must_use]
    pub const fn clock(self) -> MasterClock {
        match self {
            Self::C64Pal => MasterClock::C64_PAL,
            Self::C64Ntsc => MasterClock::C64_NTSC,
        }
    }
}

/// Configuration for constructing a C64 instance.
#[derive(Debug, Clone)]
pub struct C64Config {
    /// Model variant.
    pub model: C64Model,
    /// Kernal ROM (8,192 bytes).
    pub kernal_rom: Vec<u8>,
    /// BASIC ROM (8,192 bytes).
    pub basic_rom: Vec<u8>,
    /// Character ROM (4,096 bytes).
    pub char_rom: Vec<u8>,
}

impl C64Config {
    /// Load all three ROM images from disk.
    pub fn from_files(
        model: C64Model,
        basic: &Path,
        char: &Path,
        kernal: &Path,
    ) -> Result<Self, RomError> {
        Ok(Self {
            model,
            basic_rom: load_rom(basic, BASIC_ROM_SIZE)?,
            char_rom: load_rom(char, CHAR_ROM_SIZE)?,
            kernal_rom: load_rom(kernal, KERNAL_ROM_SIZE)?,
        })
    }
}

/// How the system clock hands out cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    /// Target CPU frequency.
    pub clock: MasterClock,
    /// Cycles are released in bursts of this length before pacing.
    pub slice: Duration,
    /// Sleep to keep the average rate at `clock`. Off runs flat out.
    pub throttle: bool,
}

impl ClockConfig {
    #[must_use]
    pub fn for_model(model: C64Model) -> Self {
        Self {
            clock: model.clock(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn unthrottled(mut self) -> Self {
        self.throttle = false;
        self
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            clock: MasterClock::C64_PAL,
            slice: Duration::from_millis(1),
            throttle: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ntsc_model_uses_ntsc_clock() {
        let config = ClockConfig::for_model(C64Model::C64Ntsc);
        assert_eq!(config.clock.frequency_hz, 1_022_727);
        assert!(config.throttle);
        assert!(!config.unthrottled().throttle);
    }
}
