//! Top-level C64 system.
//!
//! One [`Handshake`] gate is shared between the 6510 and the system clock.
//! Powering on moves the CPU, and the memory it owns, onto its execution
//! thread and starts the clock; powering off stops both and takes the CPU
//! back.

use std::sync::Arc;

use emu_core::{Cpu, Handshake, Memory};
use log::{debug, info};
use mos_6510::{Halted, Mos6510, RunConfig, Running, StopReason};

use crate::clock::SystemClock;
use crate::config::{C64Config, ClockConfig};
use crate::{C64Error, banks, dump};

type GatedCpu = Mos6510<Arc<Handshake>>;

/// Outcome of one power-on session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub reason: StopReason,
    /// Instructions executed during the session.
    pub instructions: u64,
    /// Cycles handed out by the system clock.
    pub ticks: u64,
}

/// C64 system.
#[derive(Debug)]
pub struct C64 {
    config: C64Config,
    clock_config: ClockConfig,
    /// The CPU while powered off.
    cpu: Option<GatedCpu>,
    /// The CPU's execution thread while powered on.
    running: Option<Running<Arc<Handshake>>>,
    clock: SystemClock<Handshake>,
}

impl C64 {
    /// Build memory, map the ROMs and reset the CPU from the Kernal vector.
    #[must_use]
    pub fn new(config: C64Config, clock_config: ClockConfig) -> Self {
        let mut memory = Memory::new();
        banks::initialize(&mut memory, &config);

        let gate = Arc::new(Handshake::new());
        let mut cpu = Mos6510::new(memory, Arc::clone(&gate));
        cpu.reset();
        debug!("reset vector ${:04X}", cpu.regs.pc);

        Self {
            config,
            clock_config,
            cpu: Some(cpu),
            running: None,
            clock: SystemClock::new(gate, clock_config),
        }
    }

    /// Start the CPU loop, then the clock that paces it.
    pub fn power_on(&mut self, run_config: RunConfig) -> Result<(), C64Error> {
        let cpu = self.cpu.take().ok_or(C64Error::AlreadyOn)?;
        info!("power on at ${:04X}", cpu.regs.pc);

        self.running = Some(cpu.start(run_config)?);
        self.clock.start().map_err(C64Error::Clock)
    }

    /// Stop the CPU at the next instruction boundary and halt the clock.
    pub fn power_off(&mut self) -> Result<Session, C64Error> {
        let mut running = self.running.take().ok_or(C64Error::NotRunning)?;
        running.stop(false);
        // Closing the gate lets a CPU waiting on the clock reach the boundary
        self.clock.halt(true);
        let halted = running.join()?;
        Ok(self.recover(halted))
    }

    /// Wait for the CPU loop to end on its own (limit or fault), then halt
    /// the clock.
    pub fn wait(&mut self) -> Result<Session, C64Error> {
        let running = self.running.take().ok_or(C64Error::NotRunning)?;
        let halted = running.join();
        self.clock.halt(true);
        Ok(self.recover(halted?))
    }

    /// Take the CPU back and give it a fresh gate and clock for the next
    /// power-on; the old gate stays closed.
    fn recover(&mut self, halted: Halted<Arc<Handshake>>) -> Session {
        let ticks = self.clock.ticks();
        info!(
            "power off: {:?} after {} instructions, {ticks} cycles",
            halted.reason, halted.instructions
        );

        let regs = halted.cpu.regs;
        let (memory, _) = halted.cpu.into_parts();
        let gate = Arc::new(Handshake::new());
        let mut cpu = Mos6510::new(memory, Arc::clone(&gate));
        cpu.regs = regs;
        self.cpu = Some(cpu);
        self.clock = SystemClock::new(gate, self.clock_config);

        Session {
            reason: halted.reason,
            instructions: halted.instructions,
            ticks,
        }
    }

    /// Is the CPU loop running?
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.running.is_some()
    }

    /// The CPU, while powered off.
    #[must_use]
    pub fn cpu(&self) -> Option<&GatedCpu> {
        self.cpu.as_ref()
    }

    /// Memory, while powered off.
    pub fn memory(&self) -> Result<&Memory, C64Error> {
        self.cpu.as_ref().map(Mos6510::memory).ok_or(C64Error::Busy)
    }

    /// Re-apply the bank latch at $01.
    pub fn update_banks(&mut self) -> Result<banks::Latch, C64Error> {
        let cpu = self.cpu.as_mut().ok_or(C64Error::Busy)?;
        Ok(banks::update(cpu.memory_mut(), &self.config))
    }

    /// Log memory from `offset` to the end of the address space.
    pub fn dump_memory(&self, offset: u16) -> Result<(), C64Error> {
        dump::log_memory(self.memory()?.as_slice(), usize::from(offset));
        Ok(())
    }

    /// Log the three ROM images.
    pub fn dump_roms(&self) {
        debug!("--- BASIC ROM");
        dump::log_memory(&self.config.basic_rom, 0);
        debug!("--- character ROM");
        dump::log_memory(&self.config.char_rom, 0);
        debug!("--- Kernal ROM");
        dump::log_memory(&self.config.kernal_rom, 0);
    }
}

impl Drop for C64 {
    fn drop(&mut self) {
        if let Some(running) = self.running.as_mut() {
            running.stop(false);
            self.clock.halt(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::C64Model;

    /// Kernal that starts at $E000 with `program`.
    fn config(program: &[u8]) -> C64Config {
        let mut kernal_rom = vec![0xEA; 8192];
        kernal_rom[..program.len()].copy_from_slice(program);
        kernal_rom[0x1FFC] = 0x00;
        kernal_rom[0x1FFD] = 0xE0;
        C64Config {
            model: C64Model::C64Pal,
            kernal_rom,
            basic_rom: vec![0; 8192],
            char_rom: vec![0; 4096],
        }
    }

    #[test]
    fn new_resets_from_kernal_vector() {
        let c64 = C64::new(config(&[]), ClockConfig::default());
        let cpu = c64.cpu().expect("powered off");
        assert_eq!(cpu.pc(), 0xE000);
        assert!(!c64.is_on());
    }

    #[test]
    fn runs_to_instruction_limit() {
        // INX; JMP $E000
        let mut c64 = C64::new(
            config(&[0xE8, 0x4C, 0x00, 0xE0]),
            ClockConfig::default().unthrottled(),
        );

        c64.power_on(RunConfig::default().with_limit(100)).expect("power on");
        assert!(matches!(c64.power_on(RunConfig::default()), Err(C64Error::AlreadyOn)));
        let session = c64.wait().expect("session");

        assert_eq!(session.reason, StopReason::LimitReached);
        assert_eq!(session.instructions, 100);
        assert!(session.ticks >= 50 * 5);
        assert_eq!(c64.cpu().expect("powered off").regs.x, 50);
    }

    #[test]
    fn power_off_stops_an_endless_loop() {
        // JMP $E000
        let mut c64 = C64::new(config(&[0x4C, 0x00, 0xE0]), ClockConfig::default());

        c64.power_on(RunConfig::default()).expect("power on");
        assert!(matches!(c64.memory(), Err(C64Error::Busy)));
        let session = c64.power_off().expect("session");

        assert_eq!(session.reason, StopReason::Stopped);
        assert_eq!(c64.cpu().expect("powered off").regs.pc, 0xE000);

        // A second session runs on a fresh gate.
        c64.power_on(RunConfig::default().with_limit(3)).expect("power on again");
        assert_eq!(c64.wait().expect("session").instructions, 3);
    }

    #[test]
    fn latch_write_remaps_char_rom() {
        let mut c64 = C64::new(config(&[]), ClockConfig::default());
        c64.config.char_rom = vec![0x3C; 4096];
        {
            let cpu = c64.cpu.as_mut().expect("powered off");
            cpu.memory_mut().poke(banks::PORT_LATCH, 0x03);
        }

        let latch = c64.update_banks().expect("powered off");

        assert!(!latch.contains(banks::Latch::CHAREN));
        assert_eq!(c64.memory().expect("powered off").peek(0xD000), 0x3C);
    }
}
