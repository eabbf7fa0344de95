//! CPU core trait.

/// A CPU core that executes whole instructions.
///
/// Each call to [`Cpu::step`] runs one complete instruction. The cycles the
/// instruction used are reported back so callers can check timing; the
/// pacing itself is the cycle gate's job.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Decode or execution failure for a single instruction.
    type Error;

    /// Execute one instruction and return the cycles it consumed.
    fn step(&mut self) -> Result<u64, Self::Error>;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers.
    fn registers(&self) -> Self::Registers;

    /// Reset the CPU and load the program counter from the reset vector.
    fn reset(&mut self);
}
