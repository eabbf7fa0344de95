//! Machine-level errors.

use std::io;

use mos_6510::RunnerError;
use thiserror::Error;

use crate::RomError;

#[derive(Debug, Error)]
pub enum C64Error {
    #[error(transparent)]
    Rom(#[from] RomError),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("failed to start system clock")]
    Clock(#[source] io::Error),

    #[error("machine is already powered on")]
    AlreadyOn,

    #[error("machine is powered off")]
    NotRunning,

    #[error("memory is owned by the running CPU")]
    Busy,
}
