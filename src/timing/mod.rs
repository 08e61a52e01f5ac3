//! Measurement core: clocks, timers, the per-trial meter and run summaries.

pub mod clock;
pub mod meter;
pub mod summary;
pub mod timer;
pub mod unit;

pub use clock::{ClockSource, CpuClock, SystemClock, UserClock, WallClock};
pub use meter::{MeterState, TrialMeter, TrialReadings};
pub use summary::{Dimension, RunSummary};
pub use timer::{CpuTimer, SampledTimer, SystemTimer, Timer, UserTimer, WallClockTimer};
pub use unit::TimeUnit;
