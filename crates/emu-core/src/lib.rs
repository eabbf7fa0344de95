//! Core traits and types shared by the CPU and the machine around it.
//!
//! Memory is a flat 64K bus. Time is handed out one cycle at a time through
//! a [`CycleGate`]; nothing in the CPU advances without passing through it.

mod bus;
mod clock;
mod cpu;
pub mod gate;

pub use bus::{ADDRESS_SPACE, Bus, Memory};
pub use clock::MasterClock;
pub use cpu::Cpu;
pub use gate::{AlwaysOpen, CycleGate, Handshake};
