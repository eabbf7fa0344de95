//! Real-time clock driver.
//!
//! Hands cycles to the CPU through the gate from a thread of its own. When
//! throttled it releases one slice of cycles, then sleeps until wall-clock
//! time catches up with the master clock.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use emu_core::CycleGate;
use log::{debug, error};

use crate::ClockConfig;

/// Clock driver thread for a [`CycleGate`].
#[derive(Debug)]
pub struct SystemClock<G: CycleGate> {
    gate: Arc<G>,
    config: ClockConfig,
    ticks: Arc<AtomicU64>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl<G: CycleGate + 'static> SystemClock<G> {
    #[must_use]
    pub fn new(gate: Arc<G>, config: ClockConfig) -> Self {
        Self {
            gate,
            config,
            ticks: Arc::new(AtomicU64::new(0)),
            stop: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Start handing out cycles. Does nothing if already running.
    pub fn start(&mut self) -> io::Result<()> {
        if self.handle.is_some() {
            return Ok(());
        }
        self.stop.store(false, Ordering::Release);

        let gate = Arc::clone(&self.gate);
        let ticks = Arc::clone(&self.ticks);
        let stop = Arc::clone(&self.stop);
        let config = self.config;

        debug!(
            "clock starting at {} Hz ({})",
            config.clock.frequency_hz,
            if config.throttle { "throttled" } else { "unthrottled" }
        );
        let handle = thread::Builder::new()
            .name("system-clock".into())
            .spawn(move || drive(&*gate, config, &ticks, &stop))?;
        self.handle = Some(handle);
        Ok(())
    }

    /// Stop the clock and close the gate so a waiting CPU is released.
    ///
    /// With `blocking` set, wait for the driver thread to exit.
    pub fn halt(&mut self, blocking: bool) {
        self.stop.store(true, Ordering::Release);
        self.gate.close();
        if !blocking {
            return;
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("clock thread panicked");
            }
            debug!("clock halted after {} ticks", self.ticks());
        }
    }

    /// Cycles handed out so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Is the driver thread alive?
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

fn drive<G: CycleGate + ?Sized>(
    gate: &G,
    config: ClockConfig,
    ticks: &AtomicU64,
    stop: &AtomicBool,
) {
    let per_slice = config.clock.cycles_per(config.slice);
    let started = Instant::now();
    let mut issued = 0u64;

    while !stop.load(Ordering::Acquire) {
        for _ in 0..per_slice {
            if stop.load(Ordering::Relaxed) {
                return;
            }
            gate.start_cycle();
            issued += 1;
            ticks.store(issued, Ordering::Relaxed);
        }

        if config.throttle {
            let due = config.clock.duration_of(issued);
            let elapsed = started.elapsed();
            if due > elapsed {
                thread::sleep(due - elapsed);
            }
        }
    }
}
