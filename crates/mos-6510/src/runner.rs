//! Execution loop on a dedicated thread.
//!
//! [`Mos6510::start`] moves the engine onto its own thread and hands back a
//! [`Running`] handle. The loop checks the stop flag between instructions;
//! a CPU blocked inside a gated cycle is released by closing the gate.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use emu_core::CycleGate;
use log::{debug, error, warn};

use crate::{CpuError, Mos6510, RunnerError};

/// What the loop does with an opcode it cannot execute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Log the error and carry on with the next byte.
    #[default]
    Permissive,
    /// Stop the loop on the first decode error.
    Strict,
}

/// Execution-loop settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunConfig {
    pub policy: DecodePolicy,
    /// Stop after this many instructions. `None` runs until stopped.
    pub instruction_limit: Option<u64>,
}

impl RunConfig {
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.policy = DecodePolicy::Strict;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, instructions: u64) -> Self {
        self.instruction_limit = Some(instructions);
        self
    }
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The stop flag was raised.
    Stopped,
    /// The instruction limit was reached.
    LimitReached,
    /// A decode error under [`DecodePolicy::Strict`].
    Fault(CpuError),
}

/// A finished run: the engine back in the caller's hands.
#[derive(Debug)]
pub struct Halted<G: CycleGate> {
    pub cpu: Mos6510<G>,
    pub reason: StopReason,
    /// Instructions executed by this run.
    pub instructions: u64,
}

/// Handle to an engine running on its own thread.
#[derive(Debug)]
pub struct Running<G: CycleGate> {
    handle: Option<JoinHandle<Halted<G>>>,
    outcome: Option<Result<Halted<G>, RunnerError>>,
    stop: Arc<AtomicBool>,
}

impl<G: CycleGate> Mos6510<G> {
    /// Run instructions on the current thread until `stop` is raised, the
    /// limit is reached, or a strict decode error occurs.
    pub fn run(&mut self, config: RunConfig, stop: &AtomicBool) -> StopReason {
        let mut executed = 0u64;
        loop {
            if stop.load(Ordering::Acquire) {
                return StopReason::Stopped;
            }
            if config.instruction_limit.is_some_and(|limit| executed >= limit) {
                return StopReason::LimitReached;
            }

            let result = self.step();
            executed += 1;

            if let Err(err) = result {
                match config.policy {
                    DecodePolicy::Permissive => warn!("{err}, skipping"),
                    DecodePolicy::Strict => {
                        error!("{err}");
                        return StopReason::Fault(err);
                    }
                }
            }
        }
    }
}

impl<G: CycleGate + 'static> Mos6510<G> {
    /// Move the engine onto a new thread and start executing at PC.
    pub fn start(self, config: RunConfig) -> Result<Running<G>, RunnerError> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        debug!("starting execution at ${:04X}", self.regs.pc);
        let handle = thread::Builder::new()
            .name("mos6510".into())
            .spawn(move || {
                let mut cpu = self;
                let before = cpu.instructions();
                let reason = cpu.run(config, &flag);
                let instructions = cpu.instructions() - before;
                debug!("execution ended after {instructions} instructions: {reason:?}");
                Halted {
                    cpu,
                    reason,
                    instructions,
                }
            })?;

        Ok(Running {
            handle: Some(handle),
            outcome: None,
            stop,
        })
    }
}

impl<G: CycleGate> Running<G> {
    /// Ask the loop to end after the current instruction.
    ///
    /// With `blocking` set, join the thread and keep its outcome for
    /// [`Running::join`]. Calling this more than once is harmless.
    pub fn stop(&mut self, blocking: bool) {
        self.stop.store(true, Ordering::Release);
        if !blocking {
            return;
        }
        if let Some(handle) = self.handle.take() {
            self.outcome = Some(handle.join().map_err(|_| RunnerError::Panicked));
        }
    }

    /// Has the loop ended?
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the loop to end and take the engine back.
    pub fn join(mut self) -> Result<Halted<G>, RunnerError> {
        if let Some(outcome) = self.outcome.take() {
            return outcome;
        }
        let handle = self.handle.take().ok_or(RunnerError::Panicked)?;
        handle.join().map_err(|_| RunnerError::Panicked)
    }
}

impl<G: CycleGate> Drop for Running<G> {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_counts_instructions() {
        let mut cpu = Mos6510::ungated();
        cpu.memory_mut().load(0x0000, &[0xEA; 16]);
        let stop = AtomicBool::new(false);

        let reason = cpu.run(RunConfig::default().with_limit(5), &stop);

        assert_eq!(reason, StopReason::LimitReached);
        assert_eq!(cpu.instructions(), 5);
        assert_eq!(cpu.regs.pc, 0x0005);
    }

    #[test]
    fn raised_flag_stops_before_first_instruction() {
        let mut cpu = Mos6510::ungated();
        let stop = AtomicBool::new(true);

        assert_eq!(cpu.run(RunConfig::default(), &stop), StopReason::Stopped);
        assert_eq!(cpu.instructions(), 0);
    }

    #[test]
    fn strict_policy_faults() {
        let mut cpu = Mos6510::ungated();
        cpu.memory_mut().load(0x0000, &[0xEA, 0x02]);
        let stop = AtomicBool::new(false);

        let reason = cpu.run(RunConfig::default().strict(), &stop);

        assert_eq!(
            reason,
            StopReason::Fault(CpuError::IllegalOpcode {
                opcode: 0x02,
                pc: 0x0001
            })
        );
        assert_eq!(cpu.regs.pc, 0x0002);
    }

    #[test]
    fn permissive_policy_skips_bad_opcodes() {
        let mut cpu = Mos6510::ungated();
        // JAM; LAX $A9; LDX #$11
        cpu.memory_mut().load(0x0000, &[0x02, 0xA7, 0xA9, 0xA2, 0x11]);
        let stop = AtomicBool::new(false);

        let reason = cpu.run(RunConfig::default().with_limit(3), &stop);

        assert_eq!(reason, StopReason::LimitReached);
        assert_eq!(cpu.regs.x, 0x11);
        assert_eq!(cpu.regs.a, 0x00);
        assert_eq!(cpu.regs.pc, 0x0005);
    }
}
