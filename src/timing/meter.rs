//! Four-dimension meter around a single trial.

use std::fmt;

use serde::Serialize;

use super::clock::{ClockSource, CpuClock, SystemClock, UserClock, WallClock};
use super::timer::{SampledTimer, Timer};
use crate::error::{BenchError, Result};

/// Elapsed nanoseconds of one trial in every dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrialReadings {
    pub clock: i64,
    pub cpu: i64,
    pub user: i64,
    pub system: i64,
}

impl TrialReadings {
    pub fn new(clock: i64, cpu: i64, user: i64, system: i64) -> Self {
        Self {
            clock,
            cpu,
            user,
            system,
        }
    }

    pub fn as_tuple(&self) -> (i64, i64, i64, i64) {
        (self.clock, self.cpu, self.user, self.system)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterState {
    Idle,
    Running,
    Stopped,
    /// The measured operation failed; the readings mean nothing.
    Invalid,
}

fn boxed_timer(clock: impl ClockSource + 'static) -> SampledTimer<Box<dyn ClockSource>> {
    let clock: Box<dyn ClockSource> = Box::new(clock);
    SampledTimer::with_clock(clock)
}

/// Wall-clock, CPU, user and system timers started and stopped together.
///
/// Timers are always driven in the order wall, CPU, user, system. A meter is used for
/// exactly one trial.
#[derive(Debug)]
pub struct TrialMeter {
    clock: SampledTimer<Box<dyn ClockSource>>,
    cpu: SampledTimer<Box<dyn ClockSource>>,
    user: SampledTimer<Box<dyn ClockSource>>,
    system: SampledTimer<Box<dyn ClockSource>>,
    state: MeterState,
}

impl TrialMeter {
    pub fn new() -> Self {
        Self::with_clocks(
            WallClock,
            CpuClock::detect(),
            UserClock::detect(),
            SystemClock::detect(),
        )
    }

    /// Meter over arbitrary sources, one per dimension.
    pub fn with_clocks(
        wall: impl ClockSource + 'static,
        cpu: impl ClockSource + 'static,
        user: impl ClockSource + 'static,
        system: impl ClockSource + 'static,
    ) -> Self {
        Self {
            clock: boxed_timer(wall),
            cpu: boxed_timer(cpu),
            user: boxed_timer(user),
            system: boxed_timer(system),
            state: MeterState::Idle,
        }
    }

    pub fn start(&mut self) {
        self.clock.start();
        self.cpu.start();
        self.user.start();
        self.system.start();
        self.state = MeterState::Running;
    }

    pub fn stop(&mut self) {
        self.clock.stop();
        self.cpu.stop();
        self.user.stop();
        self.system.stop();
        if self.state == MeterState::Running {
            self.state = MeterState::Stopped;
        }
    }

    /// Marks the trial as having no result.
    pub fn invalidate(&mut self) {
        self.state = MeterState::Invalid;
    }

    /// Brackets `body` between `start` and `stop`, invalidating the meter if it fails.
    pub fn time<T, F>(&mut self, body: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        self.start();
        let outcome = body();
        self.stop();
        if outcome.is_err() {
            self.invalidate();
        }
        outcome
    }

    pub fn state(&self) -> MeterState {
        self.state
    }

    /// True once the meter has been started and stopped around a successful operation.
    pub fn is_valid(&self) -> bool {
        self.state == MeterState::Stopped
    }

    pub fn clock_time(&self) -> i64 {
        self.clock.elapsed()
    }

    pub fn cpu_time(&self) -> i64 {
        self.cpu.elapsed()
    }

    pub fn user_time(&self) -> i64 {
        self.user.elapsed()
    }

    pub fn system_time(&self) -> i64 {
        self.system.elapsed()
    }

    /// Live wall-clock reading for progress output.
    pub fn elapsed_now(&self) -> i64 {
        self.clock.elapsed_now()
    }

    /// All four readings, refusing meters that did not complete a trial.
    pub fn readings(&self) -> Result<TrialReadings> {
        match self.state {
            MeterState::Stopped => Ok(TrialReadings::new(
                self.clock_time(),
                self.cpu_time(),
                self.user_time(),
                self.system_time(),
            )),
            MeterState::Invalid => Err(BenchError::InvalidTrial(
                "the measured operation failed".to_string(),
            )),
            MeterState::Idle | MeterState::Running => Err(BenchError::InvalidTrial(
                "the meter was not started and stopped".to_string(),
            )),
        }
    }
}

impl Default for TrialMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrialMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}\t{}", self.clock, self.cpu, self.user, self.system)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hint::black_box;

    #[test]
    fn lifecycle_states() {
        let mut meter = TrialMeter::new();
        assert_eq!(meter.state(), MeterState::Idle);
        assert!(meter.readings().is_err());

        meter.start();
        assert_eq!(meter.state(), MeterState::Running);
        assert!(!meter.is_valid());

        meter.stop();
        assert!(meter.is_valid());
        let readings = meter.readings().unwrap();
        assert!(readings.clock >= 0);
        assert_eq!(readings.as_tuple().0, meter.clock_time());
    }

    #[test]
    fn failed_body_invalidates() {
        let mut meter = TrialMeter::new();
        let outcome: Result<()> =
            meter.time(|| Err(BenchError::TrialFailure("transient".to_string())));
        assert!(outcome.is_err());
        assert_eq!(meter.state(), MeterState::Invalid);
        assert!(matches!(meter.readings(), Err(BenchError::InvalidTrial(_))));
    }

    #[test]
    fn stop_does_not_revive_invalid_meter() {
        let mut meter = TrialMeter::new();
        meter.start();
        meter.invalidate();
        meter.stop();
        assert!(!meter.is_valid());
    }

    #[test]
    fn successful_body_returns_value() {
        let mut meter = TrialMeter::new();
        let value = meter
            .time(|| {
                let sum: u64 = (0..10_000u64).map(black_box).sum();
                Ok(sum)
            })
            .unwrap();
        assert_eq!(value, 49_995_000);
        assert!(meter.is_valid());
        assert!(meter.clock_time() >= 0);
        assert!(meter.cpu_time() >= 0);
    }

    #[test]
    fn unsupported_thread_clocks_report_zero() {
        let mut meter = TrialMeter::with_clocks(
            WallClock,
            CpuClock::unsupported(),
            UserClock::unsupported(),
            SystemClock::unsupported(),
        );
        meter.time(|| Ok(())).unwrap();
        let readings = meter.readings().unwrap();
        assert_eq!((readings.cpu, readings.user, readings.system), (0, 0, 0));
    }

    #[test]
    fn scripted_clocks_drive_every_dimension() {
        use crate::timing::timer::tests::ScriptedClock;

        let mut meter = TrialMeter::with_clocks(
            ScriptedClock::new(&[10, 1_010]),
            ScriptedClock::new(&[5, 105]),
            ScriptedClock::new(&[3, 63]),
            ScriptedClock::new(&[2, 42]),
        );
        meter.time(|| Ok(())).unwrap();
        assert_eq!(meter.readings().unwrap().as_tuple(), (1_000, 100, 60, 40));
        assert_eq!(meter.to_string(), "1000\t100\t60\t40");
    }

    #[test]
    fn display_is_tab_separated() {
        let mut meter = TrialMeter::new();
        meter.time(|| Ok(())).unwrap();
        assert_eq!(meter.to_string().split('\t').count(), 4);
    }
}
