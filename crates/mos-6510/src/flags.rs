//! 6510 processor status register (P).
//!
//! The status register is a plain bitmask. Nothing is forced on or off:
//! bit 5 and the break bit hold whatever was last written, and PHP pushes
//! the register unchanged.

/// Carry flag - set if operation resulted in carry/borrow.
pub const C: u8 = 0x01;

/// Zero flag - set if result is zero.
pub const Z: u8 = 0x02;

/// Interrupt disable.
pub const I: u8 = 0x04;

/// Decimal mode. Stored and restored, but arithmetic is always binary.
pub const D: u8 = 0x08;

/// Break flag - set by BRK before the status is pushed.
pub const B: u8 = 0x10;

/// Unused bit.
pub const U: u8 = 0x20;

/// Overflow flag.
pub const V: u8 = 0x40;

/// Negative flag - set if result has bit 7 set.
pub const N: u8 = 0x80;

/// Processor status register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status(pub u8);

impl Status {
    /// Cleared status register.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Raw register value.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Check if a flag is set.
    #[must_use]
    pub const fn is_set(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    /// Set a flag.
    pub fn set(&mut self, flag: u8) {
        self.0 |= flag;
    }

    /// Clear a flag.
    pub fn clear(&mut self, flag: u8) {
        self.0 &= !flag;
    }

    /// Set or clear a flag based on condition.
    pub fn set_if(&mut self, flag: u8, condition: bool) {
        if condition {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }

    /// Update N and Z flags based on a value.
    pub fn update_nz(&mut self, value: u8) {
        self.set_if(N, value & 0x80 != 0);
        self.set_if(Z, value == 0);
    }
}

/// Overflow check used by ADC and SBC.
///
/// True when bit 7 differs between the accumulator before and after the
/// operation. The operand's sign is not considered, so this flags any sign
/// change of A, including ones that are not two's-complement overflow.
#[must_use]
pub const fn check_for_overflow(old: u8, new: u8) -> bool {
    (old ^ new) & 0x80 != 0
}
