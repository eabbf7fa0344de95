//! Cycle gate: paces CPU work against an external clock.
//!
//! The CPU brackets every cycle of work with [`CycleGate::enter_cycle`] and
//! [`CycleGate::exit_cycle`]. A clock driver on another thread hands out
//! cycles with [`CycleGate::start_cycle`]. Enter/exit are always paired
//! before the next enter, so at most one cycle is ever outstanding.
//!
//! Two gates are provided:
//!
//! - [`AlwaysOpen`] never blocks; it only counts. Used for unit tests and
//!   headless runs.
//! - [`Handshake`] blocks the CPU at every cycle until the driver releases
//!   it, then blocks the driver until the CPU has finished that cycle.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Synchronization between one clock driver and one CPU.
pub trait CycleGate: Send + Sync {
    /// Begin one cycle of CPU work. Increments the cycle counter and, in
    /// gated mode, waits for the driver.
    fn enter_cycle(&self);

    /// End the current cycle. In gated mode, tells the driver the cycle is
    /// complete.
    fn exit_cycle(&self);

    /// Driver side: release the CPU for one cycle and wait until it has
    /// finished.
    fn start_cycle(&self);

    /// Cycles entered since the last reset.
    fn cycle_count(&self) -> u64;

    /// Zero the cycle counter.
    fn reset_cycle_count(&self);

    /// Stop gating. Wakes every waiter; later waits return immediately.
    fn close(&self) {}
}

impl<G: CycleGate + ?Sized> CycleGate for Arc<G> {
    fn enter_cycle(&self) {
        (**self).enter_cycle();
    }

    fn exit_cycle(&self) {
        (**self).exit_cycle();
    }

    fn start_cycle(&self) {
        (**self).start_cycle();
    }

    fn cycle_count(&self) -> u64 {
        (**self).cycle_count()
    }

    fn reset_cycle_count(&self) {
        (**self).reset_cycle_count();
    }

    fn close(&self) {
        (**self).close();
    }
}

/// A gate that never blocks.
#[derive(Debug, Default)]
pub struct AlwaysOpen {
    cycles: AtomicU64,
}

impl AlwaysOpen {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cycles: AtomicU64::new(0),
        }
    }
}

impl CycleGate for AlwaysOpen {
    fn enter_cycle(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    fn exit_cycle(&self) {}

    fn start_cycle(&self) {}

    fn cycle_count(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    fn reset_cycle_count(&self) {
        self.cycles.store(0, Ordering::Relaxed);
    }
}

#[derive(Debug, Default)]
struct SignalState {
    set: bool,
    closed: bool,
}

/// Auto-resetting binary signal.
///
/// A `set` is latched until exactly one `wait` consumes it, so a set that
/// happens before the matching wait is never lost.
#[derive(Debug, Default)]
struct Signal {
    state: Mutex<SignalState>,
    cond: Condvar,
}

impl Signal {
    fn lock(&self) -> MutexGuard<'_, SignalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self) {
        let mut state = self.lock();
        state.set = true;
        self.cond.notify_one();
    }

    fn wait(&self) {
        let mut state = self.lock();
        while !state.set && !state.closed {
            state = self
                .cond
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.set = false;
    }

    fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        self.cond.notify_all();
    }
}

/// Lockstep gate between a clock driver and the CPU.
///
/// ```text
/// driver: start_cycle ── release ──▶ cpu: enter_cycle
///                                         ... one cycle of work ...
/// driver: (returns)   ◀── complete ── cpu: exit_cycle
/// ```
///
/// If the driver stops calling `start_cycle`, the CPU waits in
/// `enter_cycle` indefinitely, like a real 6510 with its clock stopped.
/// [`CycleGate::close`] is the only way out of that wait.
#[derive(Debug, Default)]
pub struct Handshake {
    release: Signal,
    complete: Signal,
    cycles: AtomicU64,
    closed: AtomicBool,
}

impl Handshake {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True once [`CycleGate::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl CycleGate for Handshake {
    fn enter_cycle(&self) {
        self.release.wait();
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    fn exit_cycle(&self) {
        self.complete.set();
    }

    fn start_cycle(&self) {
        self.release.set();
        self.complete.wait();
    }

    fn cycle_count(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    fn reset_cycle_count(&self) {
        self.cycles.store(0, Ordering::Relaxed);
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.release.close();
        self.complete.close();
    }
}
