//! MOS 6510 instruction engine.
//!
//! Executes the 151 documented NMOS opcodes against a flat 64K memory.
//! Each bus access and each internal cycle passes through a
//! [`CycleGate`], so an external clock can pace the CPU one cycle at a
//! time. Arithmetic is binary only; decimal mode is stored but ignored.

mod addressing;
mod cpu;
mod dispatch;
mod error;
pub mod flags;
mod instructions;
mod registers;
mod runner;

pub use addressing::{Access, AddressingMode, page_wrapped_next};
pub use cpu::{IRQ_VECTOR, Mos6510, RESET_VECTOR};
pub use dispatch::{is_jam, undocumented_mnemonic, undocumented_mode};
pub use error::{CpuError, RunnerError};
pub use flags::{Status, check_for_overflow};
pub use registers::{Registers, STACK_OFFSET};
pub use runner::{DecodePolicy, Halted, RunConfig, Running, StopReason};

pub use emu_core::{AlwaysOpen, Bus, Cpu, CycleGate, Handshake, Memory};
