//! Single-dimension stopwatches.

use std::fmt;

use super::clock::{ClockSource, CpuClock, SystemClock, UserClock, WallClock};

/// A stopwatch over one time dimension.
///
/// A timer is started once and stopped once. `elapsed` is only meaningful after `stop`;
/// `elapsed_now` may be read at any point after `start` and never changes the stored end.
pub trait Timer {
    fn start(&mut self);
    fn stop(&mut self);

    /// Reading taken by `start`, in nanoseconds.
    fn start_value(&self) -> i64;
    /// Reading taken by `stop`, in nanoseconds.
    fn end_value(&self) -> i64;

    /// `end_value - start_value`.
    fn elapsed(&self) -> i64 {
        self.end_value() - self.start_value()
    }

    /// Live delta against the current reading.
    fn elapsed_now(&self) -> i64;
}

/// A timer that samples a [`ClockSource`] at each edge.
#[derive(Debug, Clone, Default)]
pub struct SampledTimer<C> {
    clock: C,
    start: i64,
    end: i64,
}

impl<C: ClockSource> SampledTimer<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            start: 0,
            end: 0,
        }
    }
}

impl<C: ClockSource> Timer for SampledTimer<C> {
    fn start(&mut self) {
        self.start = self.clock.sample();
    }

    fn stop(&mut self) {
        self.end = self.clock.sample();
    }

    fn start_value(&self) -> i64 {
        self.start
    }

    fn end_value(&self) -> i64 {
        self.end
    }

    fn elapsed_now(&self) -> i64 {
        self.clock.sample() - self.start
    }
}

impl<C> fmt::Display for SampledTimer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.end - self.start)
    }
}

pub type WallClockTimer = SampledTimer<WallClock>;
pub type CpuTimer = SampledTimer<CpuClock>;
pub type UserTimer = SampledTimer<UserClock>;
pub type SystemTimer = SampledTimer<SystemClock>;
