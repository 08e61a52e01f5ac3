//! Accumulation of trial readings into per-run totals.
//!
//! Totals are kept in nanoseconds as `i64`; a 64-bit nanosecond total covers roughly
//! 292 years of measured time, far past any realistic run. Unit conversion is done on
//! read and never touches the stored totals.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::meter::{TrialMeter, TrialReadings};
use super::unit::TimeUnit;
use crate::error::{BenchError, Result};

/// Column headings of the report, in column order.
pub const REPORT_COLUMNS: [&str; 5] = [
    "N. Experiments",
    "Clock Time",
    "Cpu Time",
    "User Time",
    "System Time",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Clock,
    Cpu,
    User,
    System,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Clock,
        Dimension::Cpu,
        Dimension::User,
        Dimension::System,
    ];
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Clock => "clock",
            Self::Cpu => "cpu",
            Self::User => "user",
            Self::System => "system",
        };
        f.write_str(name)
    }
}

/// Running totals over the valid trials of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    name: Option<String>,
    trial_count: u64,
    clock: i64,
    cpu: i64,
    user: i64,
    system: i64,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Adds one completed trial. Invalid meters are refused and leave the summary unchanged.
    pub fn fold(&mut self, trial: &TrialMeter) -> Result<()> {
        let readings = trial.readings()?;
        self.add(readings);
        Ok(())
    }

    /// Adds the readings of one valid trial.
    pub fn add(&mut self, readings: TrialReadings) {
        self.trial_count += 1;
        self.clock += readings.clock;
        self.cpu += readings.cpu;
        self.user += readings.user;
        self.system += readings.system;
    }

    /// Combines the totals of another summary of the same configuration into this one.
    pub fn merge(&mut self, other: &RunSummary) {
        self.trial_count += other.trial_count;
        self.clock += other.clock;
        self.cpu += other.cpu;
        self.user += other.user;
        self.system += other.system;
    }

    pub fn trial_count(&self) -> u64 {
        self.trial_count
    }

    pub fn is_empty(&self) -> bool {
        self.trial_count == 0
    }

    /// Stored total in nanoseconds.
    pub fn total_nanos(&self, dimension: Dimension) -> i64 {
        match dimension {
            Dimension::Clock => self.clock,
            Dimension::Cpu => self.cpu,
            Dimension::User => self.user,
            Dimension::System => self.system,
        }
    }

    /// Total in `unit`, with sub-unit precision.
    pub fn total(&self, dimension: Dimension, unit: TimeUnit) -> f64 {
        unit.to_f64(self.total_nanos(dimension))
    }

    /// Total in whole `unit`s, truncated.
    pub fn total_whole(&self, dimension: Dimension, unit: TimeUnit) -> i64 {
        unit.convert(self.total_nanos(dimension))
    }

    /// Per-trial average in `unit`; undefined for a summary without trials.
    pub fn average(&self, dimension: Dimension, unit: TimeUnit) -> Result<f64> {
        if self.trial_count == 0 {
            return Err(BenchError::DivisionUndefined(self.display_name().to_string()));
        }
        Ok(self.total(dimension, unit) / self.trial_count as f64)
    }

    /// Averages of all four dimensions, in [`Dimension::ALL`] order.
    pub fn averages(&self, unit: TimeUnit) -> Result<[f64; 4]> {
        Ok([
            self.average(Dimension::Clock, unit)?,
            self.average(Dimension::Cpu, unit)?,
            self.average(Dimension::User, unit)?,
            self.average(Dimension::System, unit)?,
        ])
    }

    pub fn render_header(unit: TimeUnit) -> String {
        format!(
            "{:>15}\t{:>10}\t{:>10}\t{:>10}\t{:>11}\t{}/experiment",
            REPORT_COLUMNS[0],
            REPORT_COLUMNS[1],
            REPORT_COLUMNS[2],
            REPORT_COLUMNS[3],
            REPORT_COLUMNS[4],
            unit.name()
        )
    }

    pub fn render_row(&self, unit: TimeUnit, precision: usize) -> Result<String> {
        let [clock, cpu, user, system] = self.averages(unit)?;
        Ok(format!(
            "{:>15}\t{:>10.prec$}\t{:>10.prec$}\t{:>10.prec$}\t{:>11.prec$}",
            self.trial_count,
            clock,
            cpu,
            user,
            system,
            prec = precision
        ))
    }

    /// Name line (when named), header line and data line, each newline-terminated.
    pub fn render(&self, unit: TimeUnit, precision: usize) -> Result<String> {
        let row = self.render_row(unit, precision)?;
        let mut out = String::new();
        if let Some(name) = &self.name {
            out.push_str(name);
            out.push('\n');
        }
        out.push_str(&Self::render_header(unit));
        out.push('\n');
        out.push_str(&row);
        out.push('\n');
        Ok(out)
    }

    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed run")
    }
}
