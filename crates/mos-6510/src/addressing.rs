//! 6510 addressing modes.
//!
//! A resolver reads the operand bytes at PC (advancing PC) and turns them
//! into an effective address:
//!
//! - Implied / Accumulator: no address, the instruction works on a register
//! - Immediate: #$nn, the address of the operand byte itself
//! - Zero Page: $nn
//! - Zero Page,X / Zero Page,Y: $nn,X (wraps in page zero)
//! - Absolute: $nnnn
//! - Absolute,X / Absolute,Y: $nnnn,X (wraps at $FFFF)
//! - Indirect: ($nnnn), JMP only
//! - Indexed Indirect: ($nn,X)
//! - Indirect Indexed: ($nn),Y
//! - Relative: branch target, PC after the operand plus a signed offset
//!
//! Pointers are read with the 6502 page-boundary bug: when the low byte sits
//! at offset $FF, the high byte comes from offset $00 of the same page.

use emu_core::CycleGate;

use crate::Mos6510;

/// How an instruction locates its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndexedIndirect,
    IndirectIndexed,
    Relative,
}

impl AddressingMode {
    /// Operand bytes following the opcode.
    #[must_use]
    pub const fn operand_len(self) -> u16 {
        match self {
            Self::Implied | Self::Accumulator => 0,
            Self::Immediate
            | Self::ZeroPage
            | Self::ZeroPageX
            | Self::ZeroPageY
            | Self::IndexedIndirect
            | Self::IndirectIndexed
            | Self::Relative => 1,
            Self::Absolute | Self::AbsoluteX | Self::AbsoluteY | Self::Indirect => 2,
        }
    }
}

/// Bus direction of the access that follows resolution.
///
/// Indexed reads only spend the fix-up cycle when the index carries into
/// the high byte; writes and read-modify-writes always spend it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Address of `pointer` with the 6502 page wrap: the high byte of a word at
/// $xxFF is read from $xx00.
#[must_use]
pub const fn page_wrapped_next(pointer: u16) -> u16 {
    (pointer & 0xFF00) | (pointer.wrapping_add(1) & 0x00FF)
}

impl<G: CycleGate> Mos6510<G> {
    /// Resolve the effective address for `mode`, consuming operand bytes.
    ///
    /// Returns `None` for implied and accumulator modes.
    pub fn resolve(&mut self, mode: AddressingMode, access: Access) -> Option<u16> {
        let address = match mode {
            AddressingMode::Implied | AddressingMode::Accumulator => return None,
            AddressingMode::Immediate => {
                let addr = self.regs.pc;
                self.regs.pc = self.regs.pc.wrapping_add(1);
                addr
            }
            AddressingMode::ZeroPage => u16::from(self.fetch()),
            AddressingMode::ZeroPageX => self.zero_page_indexed(self.regs.x),
            AddressingMode::ZeroPageY => self.zero_page_indexed(self.regs.y),
            AddressingMode::Absolute => self.fetch_word(),
            AddressingMode::AbsoluteX => {
                let base = self.fetch_word();
                self.indexed(base, self.regs.x, access)
            }
            AddressingMode::AbsoluteY => {
                let base = self.fetch_word();
                self.indexed(base, self.regs.y, access)
            }
            AddressingMode::Indirect => {
                let pointer = self.fetch_word();
                self.read_pointer(pointer)
            }
            AddressingMode::IndexedIndirect => {
                let base = self.fetch();
                // Add cycle
                self.idle();
                self.read_zero_page_word(base.wrapping_add(self.regs.x))
            }
            AddressingMode::IndirectIndexed => {
                let pointer = self.fetch();
                let base = self.read_zero_page_word(pointer);
                self.indexed(base, self.regs.y, access)
            }
            AddressingMode::Relative => {
                let offset = self.fetch() as i8;
                self.regs.pc.wrapping_add_signed(i16::from(offset))
            }
        };
        Some(address)
    }

    /// Read a little-endian pointer from page zero. The high byte wraps to
    /// $00 when the low byte is at $FF.
    pub(crate) fn read_zero_page_word(&mut self, pointer: u8) -> u16 {
        self.read_pointer(u16::from(pointer))
    }

    /// Read a little-endian pointer whose high byte never leaves the page of
    /// the low byte.
    pub(crate) fn read_pointer(&mut self, pointer: u16) -> u16 {
        let low = self.read(pointer);
        let high = self.read(page_wrapped_next(pointer));
        u16::from_le_bytes([low, high])
    }

    fn zero_page_indexed(&mut self, index: u8) -> u16 {
        let base = self.fetch();
        // Add cycle
        self.idle();
        u16::from(base.wrapping_add(index))
    }

    fn indexed(&mut self, base: u16, index: u8, access: Access) -> u16 {
        let addr = base.wrapping_add(u16::from(index));
        let page_crossed = (base & 0xFF00) != (addr & 0xFF00);
        if page_crossed || access == Access::Write {
            // High-byte fix-up cycle
            self.idle();
        }
        addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_wrap_stays_in_page() {
        assert_eq!(page_wrapped_next(0x00FF), 0x0000);
        assert_eq!(page_wrapped_next(0x10FF), 0x1000);
        assert_eq!(page_wrapped_next(0x1034), 0x1035);
    }

    #[test]
    fn zero_page_x_wraps() {
        let mut cpu = Mos6510::ungated();
        cpu.memory_mut().load(0x0200, &[0xF0]);
        cpu.regs.pc = 0x0200;
        cpu.regs.x = 0x20;

        let addr = cpu.resolve(AddressingMode::ZeroPageX, Access::Read);

        assert_eq!(addr, Some(0x0010));
        assert_eq!(cpu.regs.pc, 0x0201);
    }

    #[test]
    fn absolute_y_wraps_address_space() {
        let mut cpu = Mos6510::ungated();
        cpu.memory_mut().load(0x0200, &[0xFF, 0xFF]);
        cpu.regs.pc = 0x0200;
        cpu.regs.y = 0x02;

        assert_eq!(cpu.resolve(AddressingMode::AbsoluteY, Access::Read), Some(0x0001));
    }

    #[test]
    fn indexed_indirect_pointer_at_ff_wraps_within_zero_page() {
        let mut cpu = Mos6510::ungated();
        cpu.memory_mut().load(0x0200, &[0xFE]);
        cpu.memory_mut().poke(0x00FF, 0x34);
        cpu.memory_mut().poke(0x0000, 0x12);
        cpu.memory_mut().poke(0x0100, 0x99);
        cpu.regs.pc = 0x0200;
        cpu.regs.x = 0x01;

        let addr = cpu.resolve(AddressingMode::IndexedIndirect, Access::Read);

        assert_eq!(addr, Some(0x1234));
    }

    #[test]
    fn indirect_indexed_adds_y_to_pointer() {
        let mut cpu = Mos6510::ungated();
        cpu.memory_mut().load(0x0200, &[0x40]);
        cpu.memory_mut().load(0x0040, &[0xF0, 0x12]);
        cpu.regs.pc = 0x0200;
        cpu.regs.y = 0x20;

        assert_eq!(cpu.resolve(AddressingMode::IndirectIndexed, Access::Read), Some(0x1310));
    }

    #[test]
    fn relative_is_measured_from_next_instruction() {
        let mut cpu = Mos6510::ungated();
        cpu.memory_mut().load(0x0200, &[0xFE]);
        cpu.regs.pc = 0x0200;

        assert_eq!(cpu.resolve(AddressingMode::Relative, Access::Read), Some(0x01FF));
        assert_eq!(cpu.regs.pc, 0x0201);
    }

    #[test]
    fn implied_has_no_address() {
        let mut cpu = Mos6510::ungated();
        assert_eq!(cpu.resolve(AddressingMode::Implied, Access::Read), None);
        assert_eq!(cpu.resolve(AddressingMode::Accumulator, Access::Write), None);
        assert_eq!(cpu.regs.pc, 0x0000);
    }
}
