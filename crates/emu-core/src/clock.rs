//! Master clock configuration.

use std::time::Duration;

/// Master clock for a system.
///
/// On the C64 the 6510 runs at the dot clock divided by eight, so the CPU
/// frequency is the one that matters here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// CPU frequency in Hz.
    pub frequency_hz: u64,
}

impl MasterClock {
    /// PAL C64 (6569 VIC-II).
    pub const C64_PAL: Self = Self::new(985_248);

    /// NTSC C64 (6567 VIC-II).
    pub const C64_NTSC: Self = Self::new(1_022_727);

    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Whole cycles that fit in `slice` (at least one).
    #[must_use]
    pub fn cycles_per(&self, slice: Duration) -> u64 {
        let cycles = u128::from(self.frequency_hz) * slice.as_nanos() / 1_000_000_000;
        u64::try_from(cycles).unwrap_or(u64::MAX).max(1)
    }

    /// Wall-clock time taken by `cycles` at this frequency.
    #[must_use]
    pub fn duration_of(&self, cycles: u64) -> Duration {
        if self.frequency_hz == 0 {
            return Duration::ZERO;
        }
        let nanos = u128::from(cycles) * 1_000_000_000 / u128::from(self.frequency_hz);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pal_millisecond_slice() {
        assert_eq!(MasterClock::C64_PAL.cycles_per(Duration::from_millis(1)), 985);
    }

    #[test]
    fn tiny_slices_still_run_a_cycle() {
        assert_eq!(MasterClock::C64_NTSC.cycles_per(Duration::from_nanos(1)), 1);
    }

    #[test]
    fn one_second_of_cycles_is_one_second() {
        let clock = MasterClock::C64_NTSC;
        assert_eq!(clock.duration_of(clock.frequency_hz), Duration::from_secs(1));
    }
}
