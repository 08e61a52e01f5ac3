//! Clock sources sampled by the timers.
//!
//! Every source reports a signed nanosecond count. The thread-scoped sources (CPU, user,
//! system) read the calling thread's accounting, so a timer must be started and stopped on
//! the same thread. Where the platform cannot report thread times the sources read a
//! constant `0`, for the start sample and the stop sample alike.

use std::fmt;
use std::sync::OnceLock;
use std::time::Instant;

/// A single time dimension that can be sampled.
pub trait ClockSource: fmt::Debug {
    /// Current reading in nanoseconds.
    fn sample(&self) -> i64;
}

impl<C: ClockSource + ?Sized> ClockSource for Box<C> {
    fn sample(&self) -> i64 {
        (**self).sample()
    }
}

/// Per-thread CPU accounting at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreadTimes {
    /// Total CPU time consumed by the thread.
    pub cpu_ns: i64,
    /// Portion of `cpu_ns` spent in user mode.
    pub user_ns: i64,
}

// ============================================================================
// Linux implementation using libc
// ============================================================================

#[cfg(target_os = "linux")]
mod platform {
    use super::ThreadTimes;

    fn timeval_ns(tv: libc::timeval) -> i64 {
        tv.tv_sec as i64 * 1_000_000_000 + tv.tv_usec as i64 * 1_000
    }

    /// CPU and user time from one `getrusage(RUSAGE_THREAD)` call.
    ///
    /// Both come from the same accounting, so `cpu_ns - user_ns` is the thread's `ru_stime`
    /// and never goes negative. Mixing in `CLOCK_THREAD_CPUTIME_ID` would not hold that.
    pub fn thread_times() -> Option<ThreadTimes> {
        let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
        if unsafe { libc::getrusage(libc::RUSAGE_THREAD, &mut usage) } != 0 {
            return None;
        }

        let user_ns = timeval_ns(usage.ru_utime);
        let system_ns = timeval_ns(usage.ru_stime);
        Some(ThreadTimes {
            cpu_ns: user_ns + system_ns,
            user_ns,
        })
    }
}

// ============================================================================
// Everything else: no per-thread user/system split available
// ============================================================================

#[cfg(not(target_os = "linux"))]
mod platform {
    use super::ThreadTimes;

    pub fn thread_times() -> Option<ThreadTimes> {
        None
    }
}

/// Whether this platform reports per-thread CPU and user time.
///
/// Probed once per process so that every thread-scoped source agrees for its lifetime.
pub fn thread_times_supported() -> bool {
    static SUPPORTED: OnceLock<bool> = OnceLock::new();
    *SUPPORTED.get_or_init(|| platform::thread_times().is_some())
}

/// Reads the calling thread's accounting, or zeros when unsupported.
pub fn current_thread_times() -> ThreadTimes {
    if thread_times_supported() {
        platform::thread_times().unwrap_or_default()
    } else {
        ThreadTimes::default()
    }
}

/// Monotonic wall-clock time, measured from a process-wide anchor.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl ClockSource for WallClock {
    fn sample(&self) -> i64 {
        static ANCHOR: OnceLock<Instant> = OnceLock::new();
        let anchor = ANCHOR.get_or_init(Instant::now);
        anchor.elapsed().as_nanos() as i64
    }
}

macro_rules! thread_clock {
    ($(#[$doc:meta])* $name:ident, |$times:ident| $read:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name {
            supported: bool,
        }

        impl $name {
            /// Reads the platform's thread accounting when available.
            pub fn detect() -> Self {
                Self {
                    supported: thread_times_supported(),
                }
            }

            /// Behaves as on a platform without thread accounting.
            pub fn unsupported() -> Self {
                Self { supported: false }
            }

            pub fn is_supported(&self) -> bool {
                self.supported
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::detect()
            }
        }

        impl ClockSource for $name {
            fn sample(&self) -> i64 {
                if !self.supported {
                    return 0;
                }
                let $times = current_thread_times();
                $read
            }
        }
    };
}

thread_clock!(
    /// CPU time consumed by the calling thread.
    CpuClock,
    |times| times.cpu_ns
);

thread_clock!(
    /// User-mode CPU time of the calling thread.
    UserClock,
    |times| times.user_ns
);

thread_clock!(
    /// System time of the calling thread, defined as CPU time minus user time taken from
    /// the same sample.
    SystemClock,
    |times| times.cpu_ns - times.user_ns
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::hint::black_box;

    #[test]
    fn wall_clock_is_monotonic() {
        let clock = WallClock;
        let a = clock.sample();
        let b = clock.sample();
        let c = clock.sample();
        assert!(a >= 0);
        assert!(b >= a);
        assert!(c >= b);
    }

    #[test]
    fn unsupported_thread_clocks_read_zero() {
        assert!(!CpuClock::unsupported().is_supported());
        assert_eq!(CpuClock::unsupported().sample(), 0);
        assert_eq!(UserClock::unsupported().sample(), 0);
        assert_eq!(SystemClock::unsupported().sample(), 0);
    }

    #[test]
    fn thread_cpu_time_advances_under_load() {
        let clock = CpuClock::detect();
        if !clock.is_supported() {
            return;
        }
        let before = clock.sample();
        let mut acc = 0u64;
        for i in 0..20_000_000u64 {
            acc = black_box(acc.wrapping_add(black_box(i)));
        }
        let after = clock.sample();
        assert!(acc > 0);
        assert!(after > before, "cpu clock did not advance: {} -> {}", before, after);
    }

    #[test]
    fn user_time_never_exceeds_cpu_time() {
        if !thread_times_supported() {
            return;
        }
        for _ in 0..1_000 {
            let times = current_thread_times();
            assert!(times.user_ns >= 0);
            assert!(times.user_ns <= times.cpu_ns, "{:?}", times);
        }
    }

    #[test]
    fn short_trials_never_report_negative_time() {
        use crate::timing::TrialMeter;

        for trial in 0..1_000u64 {
            let mut meter = TrialMeter::new();
            meter
                .time(|| {
                    let mut acc = 0u64;
                    for i in 0..(trial % 50) * 100 {
                        acc = black_box(acc.wrapping_add(black_box(i)));
                    }
                    Ok(acc)
                })
                .unwrap();
            let readings = meter.readings().unwrap();
            assert!(readings.cpu >= 0, "trial {}: {:?}", trial, readings);
            assert!(readings.user >= 0, "trial {}: {:?}", trial, readings);
            assert!(readings.system >= 0, "trial {}: {:?}", trial, readings);
        }
    }
}
