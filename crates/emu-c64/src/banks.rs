//! Processor-port bank switching.
//!
//! The latch at $01 decides which ROMs are copied over RAM:
//!
//! | Bit | Name   | Set                    | Clear                   |
//! |-----|--------|------------------------|-------------------------|
//! | 0   | LORAM  | BASIC at $A000-$BFFF   | RAM                     |
//! | 1   | HIRAM  | Kernal at $E000-$FFFF  | RAM                     |
//! | 2   | CHAREN | I/O at $D000-$DFFF     | Char ROM at $D000-$DFFF |
//!
//! Mapping is done by copying ROM images into the flat memory when the
//! latch is updated, not on every access. I/O is not emulated.

use bitflags::bitflags;
use emu_core::Memory;
use log::debug;

use crate::C64Config;

/// Processor port data direction register.
pub const PORT_DDR: u16 = 0x0000;

/// Processor port latch.
pub const PORT_LATCH: u16 = 0x0001;

pub const BASIC_BASE: u16 = 0xA000;
pub const CHAR_BASE: u16 = 0xD000;
pub const KERNAL_BASE: u16 = 0xE000;

bitflags! {
    /// Bank-switching bits of the processor port latch.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Latch: u8 {
        const LORAM = 0b0000_0001;
        const HIRAM = 0b0000_0010;
        const CHAREN = 0b0000_0100;
    }
}

/// Power-on port state: all lines output, every latch bit set.
pub fn initialize(memory: &mut Memory, config: &C64Config) -> Latch {
    memory.poke(PORT_DDR, 0xFF);
    memory.poke(PORT_LATCH, 0x07);
    update(memory, config)
}

/// Map the ROMs selected by the latch at $01.
pub fn update(memory: &mut Memory, config: &C64Config) -> Latch {
    let latch = Latch::from_bits_truncate(memory.peek(PORT_LATCH));

    if latch.contains(Latch::LORAM) {
        memory.load(BASIC_BASE, &config.basic_rom);
    }
    if latch.contains(Latch::HIRAM) {
        memory.load(KERNAL_BASE, &config.kernal_rom);
    }
    if latch.contains(Latch::CHAREN) {
        debug!("CHAREN set: I/O should be mapped at ${CHAR_BASE:04X}");
    } else {
        memory.load(CHAR_BASE, &config.char_rom);
    }

    debug!("banks updated, latch {:#04x} ({latch:?})", latch.bits());
    latch
}
