//! Commodore 64 host for the 6510 engine.
//!
//! Loads the three system ROMs, maps them through the processor-port latch,
//! and runs the CPU against a real-time clock. Video, sound, CIAs and I/O
//! are not emulated.

pub mod banks;
mod c64;
pub mod clock;
pub mod config;
pub mod dump;
mod error;
pub mod rom;

pub use c64::{C64, Session};
pub use clock::SystemClock;
pub use config::{C64Config, C64Model, ClockConfig};
pub use error::C64Error;
pub use rom::RomError;
