use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};

/// Reporting unit for nanosecond totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    #[default]
    Milliseconds,
    Seconds,
}

impl TimeUnit {
    pub const ALL: [TimeUnit; 4] = [
        TimeUnit::Nanoseconds,
        TimeUnit::Microseconds,
        TimeUnit::Milliseconds,
        TimeUnit::Seconds,
    ];

    pub const fn nanos_per_unit(self) -> i64 {
        match self {
            Self::Nanoseconds => 1,
            Self::Microseconds => 1_000,
            Self::Milliseconds => 1_000_000,
            Self::Seconds => 1_000_000_000,
        }
    }

    /// Whole units, truncated toward zero.
    pub const fn convert(self, nanos: i64) -> i64 {
        nanos / self.nanos_per_unit()
    }

    /// Fractional units; keeps sub-unit precision.
    pub fn to_f64(self, nanos: i64) -> f64 {
        nanos as f64 / self.nanos_per_unit() as f64
    }

    /// Inverse of [`TimeUnit::to_f64`].
    pub fn to_nanos(self, value: f64) -> f64 {
        value * self.nanos_per_unit() as f64
    }

    /// Upper-case full name used in report headers.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nanoseconds => "NANOSECONDS",
            Self::Microseconds => "MICROSECONDS",
            Self::Milliseconds => "MILLISECONDS",
            Self::Seconds => "SECONDS",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Nanoseconds => "ns",
            Self::Microseconds => "us",
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeUnit {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ns" | "nanos" | "nanoseconds" => Ok(Self::Nanoseconds),
            "us" | "micros" | "microseconds" => Ok(Self::Microseconds),
            "ms" | "millis" | "milliseconds" => Ok(Self::Milliseconds),
            "s" | "secs" | "seconds" => Ok(Self::Seconds),
            other => Err(BenchError::Configuration(format!("unknown time unit '{}'", other))),
        }
    }
}
