//! 6510 CPU engine.
//!
//! Instruction-stepped execution where every bus access, and every internal
//! cycle, passes through the cycle gate. `step()` runs one whole opcode and
//! reports how many cycles the gate saw.

use emu_core::{AlwaysOpen, Bus, Cpu, CycleGate, Memory};
use log::trace;

use crate::{CpuError, Registers};

/// Vector read on reset.
pub const RESET_VECTOR: u16 = 0xFFFC;

/// Vector read by BRK.
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// The MOS 6510 CPU.
///
/// Owns its memory and its gate. Collaborators reach memory through
/// [`Mos6510::memory_mut`] before the run; once the execution loop takes the
/// engine, memory goes with it.
#[derive(Debug)]
pub struct Mos6510<G: CycleGate = AlwaysOpen> {
    /// CPU registers.
    pub regs: Registers,

    memory: Memory,

    gate: G,

    /// Instructions executed since construction or reset.
    instructions: u64,

    /// Cycles executed since construction or reset.
    total_cycles: u64,
}

impl Mos6510<AlwaysOpen> {
    /// Engine on blank memory with an ungated clock.
    #[must_use]
    pub fn ungated() -> Self {
        Self::new(Memory::new(), AlwaysOpen::new())
    }
}

impl<G: CycleGate> Mos6510<G> {
    /// Create an engine over `memory`, paced by `gate`.
    ///
    /// Registers start in power-on state; PC is zero until [`Cpu::reset`]
    /// loads the reset vector or the caller sets it.
    #[must_use]
    pub fn new(memory: Memory, gate: G) -> Self {
        Self {
            regs: Registers::new(),
            memory,
            gate,
            instructions: 0,
            total_cycles: 0,
        }
    }

    /// Shared memory.
    #[must_use]
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Shared memory, for loaders and test harnesses.
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// The cycle gate.
    #[must_use]
    pub fn gate(&self) -> &G {
        &self.gate
    }

    /// Tear the engine apart, returning its memory and gate.
    #[must_use]
    pub fn into_parts(self) -> (Memory, G) {
        (self.memory, self.gate)
    }

    /// Instructions executed so far.
    #[must_use]
    pub fn instructions(&self) -> u64 {
        self.instructions
    }

    /// Cycles executed so far.
    #[must_use]
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Execute one instruction.
    ///
    /// Returns the number of cycles used. On a decode error the opcode byte
    /// has still been consumed and the cycle counter is still reset.
    pub fn step(&mut self) -> Result<u64, CpuError> {
        let pc = self.regs.pc;
        let opcode = self.fetch();
        trace!(
            "{pc:04X}  {opcode:02X}  A:{:02X} X:{:02X} Y:{:02X} P:{:02X} S:{:02X}",
            self.regs.a,
            self.regs.x,
            self.regs.y,
            self.regs.p.bits(),
            self.regs.s
        );

        let result = self.execute(opcode, pc);

        let cycles = self.gate.cycle_count();
        self.gate.reset_cycle_count();
        self.total_cycles += cycles;
        self.instructions += 1;

        result.map(|()| cycles)
    }

    // ========================================================================
    // Gated bus access
    // ========================================================================

    /// Run `f` as one internal cycle with no bus access.
    pub(crate) fn internal<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.gate.enter_cycle();
        let value = f(self);
        self.gate.exit_cycle();
        value
    }

    /// One internal cycle that does nothing.
    pub(crate) fn idle(&mut self) {
        self.internal(|_| ());
    }

    /// Read a byte in its own cycle.
    pub(crate) fn read(&mut self, address: u16) -> u8 {
        self.gate.enter_cycle();
        let value = self.memory.read(address);
        self.gate.exit_cycle();
        value
    }

    /// Write a byte in its own cycle.
    pub(crate) fn write(&mut self, address: u16, value: u8) {
        self.gate.enter_cycle();
        self.memory.write(address, value);
        self.gate.exit_cycle();
    }

    /// Fetch the byte at PC and advance PC.
    pub(crate) fn fetch(&mut self) -> u8 {
        let value = self.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    /// Fetch a little-endian word at PC.
    pub(crate) fn fetch_word(&mut self) -> u16 {
        let low = self.fetch();
        let high = self.fetch();
        u16::from_le_bytes([low, high])
    }

    /// Push a byte onto the stack.
    pub(crate) fn push(&mut self, value: u8) {
        let addr = self.regs.push();
        self.write(addr, value);
    }

    /// Pull a byte from the stack.
    pub(crate) fn pull(&mut self) -> u8 {
        let addr = self.regs.pop();
        self.read(addr)
    }
}

impl<G: CycleGate> Cpu for Mos6510<G> {
    type Registers = Registers;
    type Error = CpuError;

    fn step(&mut self) -> Result<u64, CpuError> {
        Mos6510::step(self)
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    /// Power-on registers, then PC from the reset vector.
    ///
    /// The vector is read without the gate: reset happens before any clock
    /// is driving the CPU.
    fn reset(&mut self) {
        self.regs = Registers::new();
        self.regs.pc = self.memory.peek_word(RESET_VECTOR);
        self.gate.reset_cycle_count();
        self.instructions = 0;
        self.total_cycles = 0;
    }
}
