//! Opcode decode.
//!
//! One arm per documented opcode. Everything else is either a JAM (no
//! defined behaviour) or an undocumented opcode the engine refuses to run.

use emu_core::CycleGate;

use crate::addressing::AddressingMode::{
    self, Absolute, AbsoluteX, AbsoluteY, Accumulator, Immediate, Implied, IndexedIndirect,
    Indirect, IndirectIndexed, ZeroPage, ZeroPageX, ZeroPageY,
};
use crate::flags::{C, D, I, N, V, Z};
use crate::{CpuError, Mos6510};

/// The NMOS opcodes that lock up the processor.
const JAM_OPCODES: [u8; 12] = [
    0x02, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2,
];

/// Is `opcode` one of the JAM/KIL opcodes?
#[must_use]
pub fn is_jam(opcode: u8) -> bool {
    JAM_OPCODES.contains(&opcode)
}

/// Conventional mnemonic of an undocumented opcode.
#[must_use]
pub fn undocumented_mnemonic(opcode: u8) -> &'static str {
    match opcode {
        0x0B | 0x2B => "ANC",
        0x4B => "ALR",
        0x6B => "ARR",
        0x8B => "ANE",
        0xAB => "LXA",
        0xCB => "SBX",
        0xEB => "USBC",
        0x93 | 0x9F => "SHA",
        0x9B => "TAS",
        0x9C => "SHY",
        0x9E => "SHX",
        0xBB => "LAS",
        _ if opcode & 0x03 == 0x03 => {
            ["SLO", "RLA", "SRE", "RRA", "SAX", "LAX", "DCP", "ISC"][usize::from(opcode >> 5)]
        }
        _ => "NOP",
    }
}

/// Addressing mode of an undocumented opcode, from the NMOS decode matrix.
///
/// Only meaningful for opcodes without an arm in the decoder; JAMs report
/// `Implied`.
#[must_use]
pub fn undocumented_mode(opcode: u8) -> AddressingMode {
    match opcode {
        0x97 | 0xB7 => ZeroPageY,
        0x9E | 0x9F | 0xBF => AbsoluteY,
        0x80 | 0x82 | 0x89 | 0xC2 | 0xE2 => Immediate,
        _ if opcode & 0x03 == 0x03 => match (opcode >> 2) & 0x07 {
            0 => IndexedIndirect,
            1 => ZeroPage,
            2 => Immediate,
            3 => Absolute,
            4 => IndirectIndexed,
            5 => ZeroPageX,
            6 => AbsoluteY,
            _ => AbsoluteX,
        },
        _ => match (opcode >> 2) & 0x07 {
            1 => ZeroPage,
            3 => Absolute,
            5 => ZeroPageX,
            7 => AbsoluteX,
            _ => Implied,
        },
    }
}

impl<G: CycleGate> Mos6510<G> {
    /// Execute the instruction for `opcode`, already fetched from `pc`.
    pub(crate) fn execute(&mut self, opcode: u8, pc: u16) -> Result<(), CpuError> {
        match opcode {
            // ORA
            0x01 => self.read_with(IndexedIndirect, Self::ora),
            0x05 => self.read_with(ZeroPage, Self::ora),
            0x09 => self.read_with(Immediate, Self::ora),
            0x0D => self.read_with(Absolute, Self::ora),
            0x11 => self.read_with(IndirectIndexed, Self::ora),
            0x15 => self.read_with(ZeroPageX, Self::ora),
            0x19 => self.read_with(AbsoluteY, Self::ora),
            0x1D => self.read_with(AbsoluteX, Self::ora),

            // AND
            0x21 => self.read_with(IndexedIndirect, Self::and),
            0x25 => self.read_with(ZeroPage, Self::and),
            0x29 => self.read_with(Immediate, Self::and),
            0x2D => self.read_with(Absolute, Self::and),
            0x31 => self.read_with(IndirectIndexed, Self::and),
            0x35 => self.read_with(ZeroPageX, Self::and),
            0x39 => self.read_with(AbsoluteY, Self::and),
            0x3D => self.read_with(AbsoluteX, Self::and),

            // EOR
            0x41 => self.read_with(IndexedIndirect, Self::eor),
            0x45 => self.read_with(ZeroPage, Self::eor),
            0x49 => self.read_with(Immediate, Self::eor),
            0x4D => self.read_with(Absolute, Self::eor),
            0x51 => self.read_with(IndirectIndexed, Self::eor),
            0x55 => self.read_with(ZeroPageX, Self::eor),
            0x59 => self.read_with(AbsoluteY, Self::eor),
            0x5D => self.read_with(AbsoluteX, Self::eor),

            // ADC
            0x61 => self.read_with(IndexedIndirect, Self::adc),
            0x65 => self.read_with(ZeroPage, Self::adc),
            0x69 => self.read_with(Immediate, Self::adc),
            0x6D => self.read_with(Absolute, Self::adc),
            0x71 => self.read_with(IndirectIndexed, Self::adc),
            0x75 => self.read_with(ZeroPageX, Self::adc),
            0x79 => self.read_with(AbsoluteY, Self::adc),
            0x7D => self.read_with(AbsoluteX, Self::adc),

            // STA
            0x81 => self.write_with(IndexedIndirect, |cpu| cpu.regs.a),
            0x85 => self.write_with(ZeroPage, |cpu| cpu.regs.a),
            0x8D => self.write_with(Absolute, |cpu| cpu.regs.a),
            0x91 => self.write_with(IndirectIndexed, |cpu| cpu.regs.a),
            0x95 => self.write_with(ZeroPageX, |cpu| cpu.regs.a),
            0x99 => self.write_with(AbsoluteY, |cpu| cpu.regs.a),
            0x9D => self.write_with(AbsoluteX, |cpu| cpu.regs.a),

            // LDA
            0xA1 => self.read_with(IndexedIndirect, Self::lda),
            0xA5 => self.read_with(ZeroPage, Self::lda),
            0xA9 => self.read_with(Immediate, Self::lda),
            0xAD => self.read_with(Absolute, Self::lda),
            0xB1 => self.read_with(IndirectIndexed, Self::lda),
            0xB5 => self.read_with(ZeroPageX, Self::lda),
            0xB9 => self.read_with(AbsoluteY, Self::lda),
            0xBD => self.read_with(AbsoluteX, Self::lda),

            // CMP
            0xC1 => self.read_with(IndexedIndirect, Self::cmp),
            0xC5 => self.read_with(ZeroPage, Self::cmp),
            0xC9 => self.read_with(Immediate, Self::cmp),
            0xCD => self.read_with(Absolute, Self::cmp),
            0xD1 => self.read_with(IndirectIndexed, Self::cmp),
            0xD5 => self.read_with(ZeroPageX, Self::cmp),
            0xD9 => self.read_with(AbsoluteY, Self::cmp),
            0xDD => self.read_with(AbsoluteX, Self::cmp),

            // SBC
            0xE1 => self.read_with(IndexedIndirect, Self::sbc),
            0xE5 => self.read_with(ZeroPage, Self::sbc),
            0xE9 => self.read_with(Immediate, Self::sbc),
            0xED => self.read_with(Absolute, Self::sbc),
            0xF1 => self.read_with(IndirectIndexed, Self::sbc),
            0xF5 => self.read_with(ZeroPageX, Self::sbc),
            0xF9 => self.read_with(AbsoluteY, Self::sbc),
            0xFD => self.read_with(AbsoluteX, Self::sbc),

            // ASL / ROL / LSR / ROR
            0x06 => self.modify_with(ZeroPage, Self::asl),
            0x0A => self.modify_with(Accumulator, Self::asl),
            0x0E => self.modify_with(Absolute, Self::asl),
            0x16 => self.modify_with(ZeroPageX, Self::asl),
            0x1E => self.modify_with(AbsoluteX, Self::asl),
            0x26 => self.modify_with(ZeroPage, Self::rol),
            0x2A => self.modify_with(Accumulator, Self::rol),
            0x2E => self.modify_with(Absolute, Self::rol),
            0x36 => self.modify_with(ZeroPageX, Self::rol),
            0x3E => self.modify_with(AbsoluteX, Self::rol),
            0x46 => self.modify_with(ZeroPage, Self::lsr),
            0x4A => self.modify_with(Accumulator, Self::lsr),
            0x4E => self.modify_with(Absolute, Self::lsr),
            0x56 => self.modify_with(ZeroPageX, Self::lsr),
            0x5E => self.modify_with(AbsoluteX, Self::lsr),
            0x66 => self.modify_with(ZeroPage, Self::ror),
            0x6A => self.modify_with(Accumulator, Self::ror),
            0x6E => self.modify_with(Absolute, Self::ror),
            0x76 => self.modify_with(ZeroPageX, Self::ror),
            0x7E => self.modify_with(AbsoluteX, Self::ror),

            // DEC / INC
            0xC6 => self.modify_with(ZeroPage, Self::dec),
            0xCE => self.modify_with(Absolute, Self::dec),
            0xD6 => self.modify_with(ZeroPageX, Self::dec),
            0xDE => self.modify_with(AbsoluteX, Self::dec),
            0xE6 => self.modify_with(ZeroPage, Self::inc),
            0xEE => self.modify_with(Absolute, Self::inc),
            0xF6 => self.modify_with(ZeroPageX, Self::inc),
            0xFE => self.modify_with(AbsoluteX, Self::inc),

            // STX / LDX
            0x86 => self.write_with(ZeroPage, |cpu| cpu.regs.x),
            0x8E => self.write_with(Absolute, |cpu| cpu.regs.x),
            0x96 => self.write_with(ZeroPageY, |cpu| cpu.regs.x),
            0xA2 => self.read_with(Immediate, Self::ldx),
            0xA6 => self.read_with(ZeroPage, Self::ldx),
            0xAE => self.read_with(Absolute, Self::ldx),
            0xB6 => self.read_with(ZeroPageY, Self::ldx),
            0xBE => self.read_with(AbsoluteY, Self::ldx),

            // STY / LDY
            0x84 => self.write_with(ZeroPage, |cpu| cpu.regs.y),
            0x8C => self.write_with(Absolute, |cpu| cpu.regs.y),
            0x94 => self.write_with(ZeroPageX, |cpu| cpu.regs.y),
            0xA0 => self.read_with(Immediate, Self::ldy),
            0xA4 => self.read_with(ZeroPage, Self::ldy),
            0xAC => self.read_with(Absolute, Self::ldy),
            0xB4 => self.read_with(ZeroPageX, Self::ldy),
            0xBC => self.read_with(AbsoluteX, Self::ldy),

            // CPX / CPY / BIT
            0xE0 => self.read_with(Immediate, Self::cpx),
            0xE4 => self.read_with(ZeroPage, Self::cpx),
            0xEC => self.read_with(Absolute, Self::cpx),
            0xC0 => self.read_with(Immediate, Self::cpy),
            0xC4 => self.read_with(ZeroPage, Self::cpy),
            0xCC => self.read_with(Absolute, Self::cpy),
            0x24 => self.read_with(ZeroPage, Self::bit),
            0x2C => self.read_with(Absolute, Self::bit),

            // Branches
            0x10 => self.op_branch(!self.regs.p.is_set(N)),
            0x30 => self.op_branch(self.regs.p.is_set(N)),
            0x50 => self.op_branch(!self.regs.p.is_set(V)),
            0x70 => self.op_branch(self.regs.p.is_set(V)),
            0x90 => self.op_branch(!self.regs.p.is_set(C)),
            0xB0 => self.op_branch(self.regs.p.is_set(C)),
            0xD0 => self.op_branch(!self.regs.p.is_set(Z)),
            0xF0 => self.op_branch(self.regs.p.is_set(Z)),

            // Control flow
            0x00 => self.op_brk(),
            0x20 => self.op_jsr(),
            0x40 => self.op_rti(),
            0x60 => self.op_rts(),
            0x4C => self.op_jmp(Absolute),
            0x6C => self.op_jmp(Indirect),

            // Stack
            0x08 => self.op_php(),
            0x28 => self.op_plp(),
            0x48 => self.op_pha(),
            0x68 => self.op_pla(),

            // Flags
            0x18 => self.op_flag(C, false),
            0x38 => self.op_flag(C, true),
            0x58 => self.op_flag(I, false),
            0x78 => self.op_flag(I, true),
            0xB8 => self.op_flag(V, false),
            0xD8 => self.op_flag(D, false),
            0xF8 => self.op_flag(D, true),

            // Transfers, increments, NOP
            0x88 => self.implied(Self::dey),
            0xA8 => self.implied(Self::tay),
            0xC8 => self.implied(Self::iny),
            0xE8 => self.implied(Self::inx),
            0x98 => self.implied(Self::tya),
            0x8A => self.implied(Self::txa),
            0x9A => self.implied(Self::txs),
            0xAA => self.implied(Self::tax),
            0xBA => self.implied(Self::tsx),
            0xCA => self.implied(Self::dex),
            0xEA => self.implied(Self::nop),

            _ if is_jam(opcode) => return Err(CpuError::IllegalOpcode { opcode, pc }),
            _ => {
                // Step over the operand so decoding resumes at the next instruction
                let skip = undocumented_mode(opcode).operand_len();
                self.regs.pc = self.regs.pc.wrapping_add(skip);
                return Err(CpuError::NotImplemented {
                    opcode,
                    mnemonic: undocumented_mnemonic(opcode),
                    pc,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Opcodes with an arm in `execute`.
    fn documented() -> Vec<u8> {
        (0..=255u8)
            .filter(|&opcode| {
                let mut cpu = Mos6510::ungated();
                cpu.execute(opcode, 0).is_ok()
            })
            .collect()
    }

    #[test]
    fn documented_set_has_151_opcodes() {
        assert_eq!(documented().len(), 151);
    }

    #[test]
    fn jam_opcodes_are_illegal() {
        for opcode in JAM_OPCODES {
            let mut cpu = Mos6510::ungated();
            assert_eq!(
                cpu.execute(opcode, 0x0400),
                Err(CpuError::IllegalOpcode { opcode, pc: 0x0400 })
            );
        }
    }

    #[test]
    fn undocumented_operand_lengths() {
        for (opcode, len) in [
            (0xA7, 1), // LAX zp
            (0xAF, 2), // LAX abs
            (0xB3, 1), // LAX (zp),Y
            (0xB7, 1), // LAX zp,Y
            (0xBF, 2), // LAX abs,Y
            (0x0B, 1), // ANC #imm
            (0x9C, 2), // SHY abs,X
            (0x9E, 2), // SHX abs,Y
            (0x80, 1), // NOP #imm
            (0x04, 1), // NOP zp
            (0x0C, 2), // NOP abs
            (0x14, 1), // NOP zp,X
            (0x1C, 2), // NOP abs,X
            (0x1A, 0), // NOP
        ] {
            assert_eq!(
                undocumented_mode(opcode).operand_len(),
                len,
                "opcode {opcode:02X}"
            );
        }
    }

    #[test]
    fn not_implemented_skips_operand_bytes() {
        let mut cpu = Mos6510::ungated();
        cpu.regs.pc = 0x1001;
        assert!(cpu.execute(0x0F, 0x1000).is_err());
        assert_eq!(cpu.regs.pc, 0x1003);

        // JAM consumes nothing past the opcode
        cpu.regs.pc = 0x2001;
        assert!(cpu.execute(0x02, 0x2000).is_err());
        assert_eq!(cpu.regs.pc, 0x2001);
    }

    #[test]
    fn undocumented_opcodes_are_named() {
        assert_eq!(undocumented_mnemonic(0xA7), "LAX");
        assert_eq!(undocumented_mnemonic(0x07), "SLO");
        assert_eq!(undocumented_mnemonic(0xE3), "ISC");
        assert_eq!(undocumented_mnemonic(0x87), "SAX");
        assert_eq!(undocumented_mnemonic(0xEB), "USBC");
        assert_eq!(undocumented_mnemonic(0x1A), "NOP");
        assert_eq!(undocumented_mnemonic(0x80), "NOP");

        let mut cpu = Mos6510::ungated();
        assert_eq!(
            cpu.execute(0xCB, 0x1000),
            Err(CpuError::NotImplemented {
                opcode: 0xCB,
                mnemonic: "SBX",
                pc: 0x1000
            })
        );
    }
}
