//! Instruction semantics.
//!
//! Value handlers (`fn(&mut Self, u8)` and `fn(&mut Self, u8) -> u8`) are
//! pure register/flag operations; the access helpers wrap them with the
//! resolver and the gated bus reads and writes. Control-flow instructions
//! drive the bus themselves.

use emu_core::CycleGate;

use crate::addressing::{Access, AddressingMode};
use crate::flags::{B, C, I, N, V, Z, check_for_overflow};
use crate::{IRQ_VECTOR, Mos6510, Status};

impl<G: CycleGate> Mos6510<G> {
    // ========================================================================
    // Access helpers
    // ========================================================================

    /// Resolve `mode`, read the operand and hand it to `op`.
    pub(crate) fn read_with(&mut self, mode: AddressingMode, op: fn(&mut Self, u8)) {
        let value = match self.resolve(mode, Access::Read) {
            Some(addr) => self.read(addr),
            None => self.internal(|cpu| cpu.regs.a),
        };
        op(self, value);
    }

    /// Resolve `mode` and store the register picked by `value`.
    pub(crate) fn write_with(&mut self, mode: AddressingMode, value: fn(&Self) -> u8) {
        if let Some(addr) = self.resolve(mode, Access::Write) {
            let byte = value(self);
            self.write(addr, byte);
        }
    }

    /// Read-modify-write: fetch, compute, store, each in its own cycle.
    ///
    /// The accumulator form runs the computation in a single internal cycle.
    pub(crate) fn modify_with(&mut self, mode: AddressingMode, op: fn(&mut Self, u8) -> u8) {
        match self.resolve(mode, Access::Write) {
            Some(addr) => {
                let value = self.read(addr);
                let result = self.internal(|cpu| op(cpu, value));
                self.write(addr, result);
            }
            None => self.internal(|cpu| {
                let value = cpu.regs.a;
                cpu.regs.a = op(cpu, value);
            }),
        }
    }

    /// Register-only instruction: one internal cycle after the opcode fetch.
    pub(crate) fn implied(&mut self, op: fn(&mut Self)) {
        self.internal(op);
    }

    // ========================================================================
    // Load / logical / arithmetic
    // ========================================================================

    pub(crate) fn lda(&mut self, value: u8) {
        self.regs.a = value;
        self.regs.p.update_nz(value);
    }

    pub(crate) fn ldx(&mut self, value: u8) {
        self.regs.x = value;
        self.regs.p.update_nz(value);
    }

    pub(crate) fn ldy(&mut self, value: u8) {
        self.regs.y = value;
        self.regs.p.update_nz(value);
    }

    /// A = A | M
    pub fn ora(&mut self, value: u8) {
        self.regs.a |= value;
        self.regs.p.update_nz(self.regs.a);
    }

    /// A = A & M
    pub fn and(&mut self, value: u8) {
        self.regs.a &= value;
        self.regs.p.update_nz(self.regs.a);
    }

    /// A = A ^ M
    pub fn eor(&mut self, value: u8) {
        self.regs.a ^= value;
        self.regs.p.update_nz(self.regs.a);
    }

    /// A = A + M, binary only. The incoming carry is not added; C reports
    /// the unsigned carry out.
    pub fn adc(&mut self, value: u8) {
        let old = self.regs.a;
        let sum = u16::from(old) + u16::from(value);
        let result = sum as u8;

        self.regs.p.set_if(C, sum > 0xFF);
        self.regs.p.set_if(V, check_for_overflow(old, result));
        self.regs.a = result;
        self.regs.p.update_nz(result);
    }

    /// A = A - M, binary only, no borrow-in. C is set when the subtraction
    /// borrowed.
    pub fn sbc(&mut self, value: u8) {
        let old = self.regs.a;
        let result = old.wrapping_sub(value);

        self.regs.p.set_if(C, old < value);
        self.regs.p.set_if(V, check_for_overflow(old, result));
        self.regs.a = result;
        self.regs.p.update_nz(result);
    }

    /// Shared compare: C on borrow, Z and N taken from the register.
    fn compare(&mut self, register: u8, value: u8) {
        self.regs.p.set_if(C, register < value);
        self.regs.p.set_if(Z, register == 0);
        self.regs.p.set_if(N, register & 0x80 != 0);
    }

    pub(crate) fn cmp(&mut self, value: u8) {
        self.compare(self.regs.a, value);
    }

    pub(crate) fn cpx(&mut self, value: u8) {
        self.compare(self.regs.x, value);
    }

    pub(crate) fn cpy(&mut self, value: u8) {
        self.compare(self.regs.y, value);
    }

    /// A & M without storing; N and V straight from M.
    pub(crate) fn bit(&mut self, value: u8) {
        self.regs.p.set_if(Z, self.regs.a & value == 0);
        self.regs.p.set_if(N, value & 0x80 != 0);
        self.regs.p.set_if(V, value & 0x40 != 0);
    }

    // ========================================================================
    // Shifts and increments
    // ========================================================================

    pub(crate) fn asl(&mut self, value: u8) -> u8 {
        self.regs.p.set_if(C, value & 0x80 != 0);
        let result = value << 1;
        self.regs.p.update_nz(result);
        result
    }

    pub(crate) fn rol(&mut self, value: u8) -> u8 {
        let carry = u8::from(self.regs.p.is_set(C));
        self.regs.p.set_if(C, value & 0x80 != 0);
        let result = (value << 1) | carry;
        self.regs.p.update_nz(result);
        result
    }

    // Right shifts leave N clear, even when ROR rotates a carry into bit 7.
    pub(crate) fn lsr(&mut self, value: u8) -> u8 {
        self.regs.p.set_if(C, value & 0x01 != 0);
        let result = value >> 1;
        self.regs.p.set_if(Z, result == 0);
        self.regs.p.clear(N);
        result
    }

    pub(crate) fn ror(&mut self, value: u8) -> u8 {
        let carry = if self.regs.p.is_set(C) { 0x80 } else { 0 };
        self.regs.p.set_if(C, value & 0x01 != 0);
        let result = (value >> 1) | carry;
        self.regs.p.set_if(Z, result == 0);
        self.regs.p.clear(N);
        result
    }

    pub(crate) fn inc(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.regs.p.update_nz(result);
        result
    }

    pub(crate) fn dec(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.regs.p.update_nz(result);
        result
    }

    // ========================================================================
    // Register transfers and increments
    // ========================================================================

    pub(crate) fn tax(&mut self) {
        self.regs.x = self.regs.a;
        self.regs.p.update_nz(self.regs.x);
    }

    pub(crate) fn txa(&mut self) {
        self.regs.a = self.regs.x;
        self.regs.p.update_nz(self.regs.a);
    }

    pub(crate) fn tay(&mut self) {
        self.regs.y = self.regs.a;
        self.regs.p.update_nz(self.regs.y);
    }

    pub(crate) fn tya(&mut self) {
        self.regs.a = self.regs.y;
        self.regs.p.update_nz(self.regs.a);
    }

    pub(crate) fn tsx(&mut self) {
        self.regs.x = self.regs.s;
        self.regs.p.update_nz(self.regs.x);
    }

    pub(crate) fn txs(&mut self) {
        self.regs.s = self.regs.x;
    }

    pub(crate) fn inx(&mut self) {
        self.regs.x = self.regs.x.wrapping_add(1);
        self.regs.p.update_nz(self.regs.x);
    }

    pub(crate) fn iny(&mut self) {
        self.regs.y = self.regs.y.wrapping_add(1);
        self.regs.p.update_nz(self.regs.y);
    }

    pub(crate) fn dex(&mut self) {
        self.regs.x = self.regs.x.wrapping_sub(1);
        self.regs.p.update_nz(self.regs.x);
    }

    pub(crate) fn dey(&mut self) {
        self.regs.y = self.regs.y.wrapping_sub(1);
        self.regs.p.update_nz(self.regs.y);
    }

    pub(crate) fn nop(&mut self) {}

    /// CLC/SEC/CLI/SEI/CLD/SED/CLV: one bit, nothing else.
    pub(crate) fn op_flag(&mut self, flag: u8, set: bool) {
        self.internal(|cpu| cpu.regs.p.set_if(flag, set));
    }

    // ========================================================================
    // Stack
    // ========================================================================

    /// Push a byte: store at $0100+S, then decrement S.
    pub fn push_byte(&mut self, value: u8) {
        self.push(value);
    }

    /// Pull a byte: increment S, then load from $0100+S.
    pub fn pull_byte(&mut self) -> u8 {
        self.pull()
    }

    pub(crate) fn op_pha(&mut self) {
        self.idle();
        self.push(self.regs.a);
    }

    pub(crate) fn op_php(&mut self) {
        self.idle();
        self.push(self.regs.p.bits());
    }

    pub(crate) fn op_pla(&mut self) {
        self.idle();
        // Stack pointer increment
        self.idle();
        let value = self.pull();
        self.regs.a = value;
        self.regs.p.update_nz(value);
    }

    pub(crate) fn op_plp(&mut self) {
        self.idle();
        self.idle();
        self.regs.p = Status(self.pull());
    }

    // ========================================================================
    // Branches and control flow
    // ========================================================================

    /// Relative branch: one extra cycle when taken, one more when the target
    /// is on another page.
    pub(crate) fn op_branch(&mut self, taken: bool) {
        let Some(target) = self.resolve(AddressingMode::Relative, Access::Read) else {
            return;
        };
        if taken {
            self.idle();
            if (target ^ self.regs.pc) & 0xFF00 != 0 {
                self.idle();
            }
            self.regs.pc = target;
        }
    }

    /// JMP absolute or indirect.
    pub(crate) fn op_jmp(&mut self, mode: AddressingMode) {
        if let Some(target) = self.resolve(mode, Access::Read) {
            self.regs.pc = target;
        }
    }

    /// JSR: push the address of the last operand byte (return - 1), high
    /// byte first, then jump.
    pub(crate) fn op_jsr(&mut self) {
        let low = self.fetch();
        // Internal stack cycle
        self.idle();
        self.push(self.regs.pch());
        self.push(self.regs.pcl());
        let high = self.fetch();
        self.regs.pc = u16::from_le_bytes([low, high]);
    }

    /// RTS: pull PCL, PCH, then step past the JSR operand.
    pub(crate) fn op_rts(&mut self) {
        self.idle();
        self.idle();
        let low = self.pull();
        self.regs.set_pcl(low);
        let high = self.pull();
        self.regs.set_pch(high);
        self.internal(|cpu| cpu.regs.pc = cpu.regs.pc.wrapping_add(1));
    }

    /// BRK: set B and I, push PC+2 and P, load PC from the IRQ vector.
    pub(crate) fn op_brk(&mut self) {
        // Padding byte; PC now points two past the BRK opcode
        self.fetch();
        self.regs.p.set(B | I);
        self.push(self.regs.pch());
        self.push(self.regs.pcl());
        self.push(self.regs.p.bits());
        let low = self.read(IRQ_VECTOR);
        self.regs.set_pcl(low);
        let high = self.read(IRQ_VECTOR.wrapping_add(1));
        self.regs.set_pch(high);
    }

    /// RTI: pull P, then PCL, then PCH.
    pub(crate) fn op_rti(&mut self) {
        self.idle();
        self.idle();
        self.regs.p = Status(self.pull());
        let low = self.pull();
        self.regs.set_pcl(low);
        let high = self.pull();
        self.regs.set_pch(high);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adc_ignores_incoming_carry() {
        let mut cpu = Mos6510::ungated();
        cpu.regs.p.set(C);
        cpu.regs.a = 0x10;
        cpu.adc(0x20);
        assert_eq!(cpu.regs.a, 0x30);
        assert!(!cpu.regs.p.is_set(C));
    }

    #[test]
    fn adc_sets_carry_and_overflow() {
        let mut cpu = Mos6510::ungated();
        cpu.regs.a = 0xFF;
        cpu.adc(0x01);
        assert_eq!(cpu.regs.a, 0x00);
        assert!(cpu.regs.p.is_set(C));
        assert!(cpu.regs.p.is_set(Z));
        assert!(cpu.regs.p.is_set(V), "bit 7 went from 1 to 0");
    }

    #[test]
    fn sbc_sets_carry_on_borrow() {
        let mut cpu = Mos6510::ungated();
        cpu.regs.a = 0x05;
        cpu.sbc(0x06);
        assert_eq!(cpu.regs.a, 0xFF);
        assert!(cpu.regs.p.is_set(C));
        assert!(cpu.regs.p.is_set(N));
        assert!(cpu.regs.p.is_set(V));

        cpu.regs.a = 0x06;
        cpu.sbc(0x05);
        assert_eq!(cpu.regs.a, 0x01);
        assert!(!cpu.regs.p.is_set(C));
        assert!(!cpu.regs.p.is_set(V));
    }

    #[test]
    fn compare_flags_follow_register() {
        let mut cpu = Mos6510::ungated();
        cpu.regs.a = 0x00;
        cpu.cmp(0x00);
        assert!(cpu.regs.p.is_set(Z));
        assert!(!cpu.regs.p.is_set(C));

        cpu.regs.x = 0x90;
        cpu.cpx(0x90);
        assert!(!cpu.regs.p.is_set(Z), "Z tests the register, not the difference");
        assert!(cpu.regs.p.is_set(N));

        cpu.regs.y = 0x01;
        cpu.cpy(0x02);
        assert!(cpu.regs.p.is_set(C));
    }

    #[test]
    fn ror_rotates_carry_in_but_clears_n() {
        let mut cpu = Mos6510::ungated();
        cpu.regs.p.set(C | N);
        let result = cpu.ror(0x02);
        assert_eq!(result, 0x81);
        assert!(!cpu.regs.p.is_set(C));
        assert!(!cpu.regs.p.is_set(N));
    }

    #[test]
    fn rol_rotates_carry_into_bit0() {
        let mut cpu = Mos6510::ungated();
        cpu.regs.p.set(C);
        let result = cpu.rol(0x80);
        assert_eq!(result, 0x01);
        assert!(cpu.regs.p.is_set(C));
        assert!(!cpu.regs.p.is_set(Z));
    }

    #[test]
    fn lsr_to_zero() {
        let mut cpu = Mos6510::ungated();
        let result = cpu.lsr(0x01);
        assert_eq!(result, 0x00);
        assert!(cpu.regs.p.is_set(C));
        assert!(cpu.regs.p.is_set(Z));
    }

    #[test]
    fn bit_copies_n_and_v_from_memory() {
        let mut cpu = Mos6510::ungated();
        cpu.regs.a = 0x01;
        cpu.bit(0xC0);
        assert!(cpu.regs.p.is_set(N));
        assert!(cpu.regs.p.is_set(V));
        assert!(cpu.regs.p.is_set(Z));
        assert_eq!(cpu.regs.a, 0x01);
    }

    #[test]
    fn push_then_pull_round_trips() {
        let mut cpu = Mos6510::ungated();
        cpu.push_byte(0x42);
        assert_eq!(cpu.memory().peek(0x01FF), 0x42);
        assert_eq!(cpu.regs.s, 0xFE);
        assert_eq!(cpu.pull_byte(), 0x42);
        assert_eq!(cpu.regs.s, 0xFF);
    }
}
