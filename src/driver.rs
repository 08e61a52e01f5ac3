//! Sweep driver: runs every configured {algorithm, provider} pair and routes the reports.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{error, info};
use serde::Serialize;

use crate::adapters::adapter_for;
use crate::config::{BenchConfig, SweepConfig};
use crate::family::{AlgorithmFamily, Direction};
use crate::provider::ProviderRegistry;
use crate::runner::BenchmarkRunner;
use crate::timing::{RunSummary, TimeUnit};
use crate::Result;

/// Where rendered summaries go.
#[derive(Debug)]
pub enum ReportSink {
    Stdout,
    /// One file per family and direction, e.g. `block ciphers.txt`. A file is truncated the
    /// first time a sink writes to it and appended to afterwards.
    Directory {
        root: PathBuf,
        written: HashSet<PathBuf>,
    },
}

impl ReportSink {
    pub fn directory(root: impl AsRef<Path>) -> Result<Self> {
        fs::create_dir_all(root.as_ref())?;
        Ok(Self::Directory {
            root: root.as_ref().to_path_buf(),
            written: HashSet::new(),
        })
    }

    pub fn for_config(config: &BenchConfig) -> Result<Self> {
        match &config.output_dir {
            Some(dir) => Self::directory(dir),
            None => Ok(Self::Stdout),
        }
    }

    pub fn path_for(&self, family: AlgorithmFamily, direction: Direction) -> Option<PathBuf> {
        match self {
            Self::Stdout => None,
            Self::Directory { root, .. } => {
                Some(root.join(format!("{}.txt", family.report_stem(direction))))
            }
        }
    }

    /// Writes one report block. Nothing is written if the summary cannot be rendered.
    pub fn write(
        &mut self,
        family: AlgorithmFamily,
        direction: Direction,
        summary: &RunSummary,
        unit: TimeUnit,
        precision: usize,
    ) -> Result<()> {
        let block = summary.render(unit, precision)?;
        let path = self.path_for(family, direction);
        match (self, path) {
            (Self::Directory { written, .. }, Some(path)) => {
                let mut file = Self::open(&path, written.insert(path.clone()))?;
                writeln!(file, "{}", block)?;
            }
            _ => {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                writeln!(out, "{}", block)?;
            }
        }
        Ok(())
    }

    fn open(path: &Path, first_write: bool) -> io::Result<File> {
        if first_write {
            File::create(path)
        } else {
            OpenOptions::new().append(true).create(true).open(path)
        }
    }
}

/// Result of one {algorithm, provider} run, as reported in JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub sweep: String,
    pub family: AlgorithmFamily,
    pub algorithm: String,
    pub provider: String,
    pub direction: Direction,
    pub key_size: Option<usize>,
    pub unit: TimeUnit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
    /// Clock, CPU, user and system averages in `unit`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub averages: Option<[f64; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunOutcome {
    fn new(sweep: &SweepConfig, provider: &str, unit: TimeUnit) -> Self {
        Self {
            sweep: sweep.label().to_string(),
            family: sweep.family,
            algorithm: sweep.algorithm.clone(),
            provider: provider.to_string(),
            direction: sweep.direction,
            key_size: sweep.key_size,
            unit,
            summary: None,
            averages: None,
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

pub struct Driver<'a> {
    config: &'a BenchConfig,
    registry: ProviderRegistry,
}

impl<'a> Driver<'a> {
    pub fn new(config: &'a BenchConfig, registry: ProviderRegistry) -> Self {
        Self { config, registry }
    }

    /// Runs every sweep in order. Failed runs are logged and recorded; the sweep goes on.
    pub fn run(&self, sink: &mut ReportSink) -> Vec<RunOutcome> {
        let mut outcomes = Vec::new();
        for sweep in &self.config.sweeps {
            info!(
                "Evaluating {} ({} {})",
                sweep.label(),
                sweep.family,
                sweep.direction
            );
            let adapter = adapter_for(sweep.family);
            let payload = self.config.payload_for(sweep);

            for provider in &sweep.providers {
                let mut outcome = RunOutcome::new(sweep, provider, self.config.unit);
                let mut runner = BenchmarkRunner::new(adapter.as_ref(), &self.registry);
                let result = runner.run_trials(
                    sweep.trials,
                    &payload,
                    &sweep.algorithm,
                    provider,
                    sweep.key_size,
                    sweep.direction,
                );

                match result {
                    Ok(summary) => {
                        outcome.averages = summary.averages(self.config.unit).ok();
                        if let Err(e) = sink.write(
                            sweep.family,
                            sweep.direction,
                            &summary,
                            self.config.unit,
                            self.config.precision,
                        ) {
                            error!("No report for {}-{}: {}", sweep.algorithm, provider, e);
                            outcome.error = Some(e.to_string());
                        }
                        outcome.summary = Some(summary);
                    }
                    Err(e) => {
                        error!("Skipping {} with {}: {}", sweep.algorithm, provider, e);
                        outcome.error = Some(e.to_string());
                    }
                }
                outcomes.push(outcome);
            }
        }

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        info!("Done: {} runs, {} failed", outcomes.len(), failed);
        outcomes
    }
}

pub fn outcomes_to_json(outcomes: &[RunOutcome]) -> Result<String> {
    Ok(serde_json::to_string_pretty(outcomes)?)
}

/// One line per algorithm: family, algorithm id and implementing providers.
pub fn catalogue_lines() -> Vec<String> {
    let mut lines = Vec::new();
    for family in AlgorithmFamily::ALL {
        for (algorithm, providers) in adapter_for(family).catalogue() {
            let ids: Vec<&str> = providers.iter().map(|p| p.id()).collect();
            lines.push(format!("{}\t{}\t{}", family.id(), algorithm, ids.join(",")));
        }
    }
    lines
}
