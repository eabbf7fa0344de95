//! Errors raised while decoding and running instructions.

use thiserror::Error;

/// An opcode the engine could not execute.
///
/// Both variants are recoverable: the opcode byte has been consumed and PC
/// points at the following byte, so execution can carry on from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuError {
    /// The opcode has no defined behaviour (the NMOS JAM/KIL group).
    #[error("illegal opcode ${opcode:02X} at ${pc:04X}")]
    IllegalOpcode { opcode: u8, pc: u16 },

    /// An undocumented opcode that real silicon executes but this engine
    /// does not.
    #[error("opcode ${opcode:02X} ({mnemonic}) at ${pc:04X} is not implemented")]
    NotImplemented {
        opcode: u8,
        mnemonic: &'static str,
        pc: u16,
    },
}

impl CpuError {
    /// The offending opcode byte.
    #[must_use]
    pub const fn opcode(&self) -> u8 {
        match *self {
            Self::IllegalOpcode { opcode, .. } | Self::NotImplemented { opcode, .. } => opcode,
        }
    }

    /// Address the opcode was fetched from.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        match *self {
            Self::IllegalOpcode { pc, .. } | Self::NotImplemented { pc, .. } => pc,
        }
    }
}

/// Failure of the execution-loop thread itself.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to spawn execution thread")]
    Spawn(#[from] std::io::Error),

    #[error("execution thread panicked")]
    Panicked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_use_hex_addresses() {
        let err = CpuError::IllegalOpcode {
            opcode: 0x02,
            pc: 0xC000,
        };
        assert_eq!(err.to_string(), "illegal opcode $02 at $C000");

        let err = CpuError::NotImplemented {
            opcode: 0xA7,
            mnemonic: "LAX",
            pc: 0x0801,
        };
        assert_eq!(err.to_string(), "opcode $A7 (LAX) at $0801 is not implemented");
        assert_eq!(err.opcode(), 0xA7);
        assert_eq!(err.pc(), 0x0801);
    }
}
