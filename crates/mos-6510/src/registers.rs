//! 6510 CPU registers.

use crate::Status;

/// Base address of the stack page.
pub const STACK_OFFSET: u16 = 0x0100;

/// 6510 CPU register set.
///
/// - A: 8-bit accumulator
/// - X, Y: 8-bit index registers
/// - S: 8-bit stack pointer into $0100-$01FF, wrapping within the page
/// - PC: 16-bit program counter, also addressable as PCH/PCL
/// - P: 8-bit processor status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    /// Accumulator.
    pub a: u8,
    /// X index register.
    pub x: u8,
    /// Y index register.
    pub y: u8,
    /// Stack pointer (points to next free location).
    pub s: u8,
    /// Program counter.
    pub pc: u16,
    /// Processor status flags.
    pub p: Status,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    /// Registers in power-on state: S = $FF, everything else zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            s: 0xFF,
            pc: 0,
            p: Status::new(),
        }
    }

    /// High byte of the program counter.
    #[must_use]
    pub const fn pch(&self) -> u8 {
        (self.pc >> 8) as u8
    }

    /// Low byte of the program counter.
    #[must_use]
    pub const fn pcl(&self) -> u8 {
        self.pc as u8
    }

    /// Replace the high byte of PC, keeping the low byte.
    pub fn set_pch(&mut self, value: u8) {
        self.pc = (u16::from(value) << 8) | (self.pc & 0x00FF);
    }

    /// Replace the low byte of PC, keeping the high byte.
    pub fn set_pcl(&mut self, value: u8) {
        self.pc = (self.pc & 0xFF00) | u16::from(value);
    }

    /// Push a value onto the stack, return the address written.
    pub fn push(&mut self) -> u16 {
        let addr = self.stack_addr();
        self.s = self.s.wrapping_sub(1);
        addr
    }

    /// Pop a value from the stack, return the address to read.
    pub fn pop(&mut self) -> u16 {
        self.s = self.s.wrapping_add(1);
        self.stack_addr()
    }

    /// Get the current stack address without modifying S.
    #[must_use]
    pub const fn stack_addr(&self) -> u16 {
        STACK_OFFSET | (self.s as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcl_write_keeps_pch() {
        let mut regs = Registers::new();
        regs.pc = 0xABCD;
        regs.set_pcl(0x12);
        assert_eq!(regs.pc, 0xAB12);
        assert_eq!(regs.pch(), 0xAB);
    }

    #[test]
    fn pch_write_keeps_pcl() {
        let mut regs = Registers::new();
        regs.pc = 0xABCD;
        regs.set_pch(0x12);
        assert_eq!(regs.pc, 0x12CD);
        assert_eq!(regs.pcl(), 0xCD);
    }

    #[test]
    fn stack_wraps_within_page_one() {
        let mut regs = Registers::new();
        regs.s = 0x00;
        assert_eq!(regs.push(), 0x0100);
        assert_eq!(regs.s, 0xFF);
        assert_eq!(regs.pop(), 0x0100);
        assert_eq!(regs.s, 0x00);
    }
}
