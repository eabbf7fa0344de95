//! Memory bus interface and the flat 64K address space.

/// Size of the 16-bit address space.
pub const ADDRESS_SPACE: usize = 0x1_0000;

/// Memory bus interface.
///
/// The CPU reaches memory only through this trait. Every 16-bit address is
/// valid, so reads and writes cannot fail.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);
}

/// Flat 64K RAM.
///
/// Allocated once by the embedding machine and handed to the CPU. ROM images
/// are plain byte copies into this buffer; the CPU has no idea which parts are
/// ROM.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    bytes: Box<[u8; ADDRESS_SPACE]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory").field("len", &ADDRESS_SPACE).finish()
    }
}

impl Memory {
    /// Create zero-filled memory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: Box::new([0; ADDRESS_SPACE]),
        }
    }

    /// Copy `data` into memory starting at `address`, wrapping at $FFFF.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        for (i, &byte) in data.iter().enumerate() {
            self.bytes[usize::from(address.wrapping_add(i as u16))] = byte;
        }
    }

    /// Read without side effects.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.bytes[usize::from(address)]
    }

    /// Read a little-endian word without side effects.
    #[must_use]
    pub fn peek_word(&self, address: u16) -> u16 {
        u16::from_le_bytes([self.peek(address), self.peek(address.wrapping_add(1))])
    }

    /// Write without side effects.
    pub fn poke(&mut self, address: u16, value: u8) {
        self.bytes[usize::from(address)] = value;
    }

    /// The whole address space as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..]
    }
}

impl Bus for Memory {
    fn read(&mut self, address: u16) -> u8 {
        self.peek(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        self.poke(address, value);
    }
}
