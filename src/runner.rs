//! Sequential trial orchestration for one run.

use log::{debug, info, trace, warn};

use crate::family::Direction;
use crate::payload::PayloadSource;
use crate::provider::ProviderRegistry;
use crate::timing::{RunSummary, TrialMeter};
use crate::{BenchError, OperationAdapter, OperationRequest, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
    NotStarted,
    Running { trial: usize, of: usize },
    Completed(RunSummary),
    Aborted(String),
}

/// Drives one adapter through runs of sequential trials.
///
/// Each trial gets a fresh [`TrialMeter`] and a freshly prepared body; only the body is timed.
/// Trial-level failures are logged and the trial is dropped. Configuration and unsupported
/// operation errors end the run and are returned to the caller.
pub struct BenchmarkRunner<'a> {
    adapter: &'a dyn OperationAdapter,
    registry: &'a ProviderRegistry,
    new_meter: Box<dyn Fn() -> TrialMeter + 'a>,
    state: RunState,
}

impl<'a> BenchmarkRunner<'a> {
    pub fn new(adapter: &'a dyn OperationAdapter, registry: &'a ProviderRegistry) -> Self {
        Self {
            adapter,
            registry,
            new_meter: Box::new(TrialMeter::new),
            state: RunState::NotStarted,
        }
    }

    /// Replaces the per-trial meter, e.g. with one over scripted clocks.
    pub fn with_meter_factory(mut self, factory: impl Fn() -> TrialMeter + 'a) -> Self {
        self.new_meter = Box::new(factory);
        self
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// The summary of the last completed run.
    pub fn summary(&self) -> Option<&RunSummary> {
        match &self.state {
            RunState::Completed(summary) => Some(summary),
            _ => None,
        }
    }

    pub fn run_full(
        &mut self,
        trials: usize,
        payload: &PayloadSource,
        algorithm: &str,
        provider: &str,
        key_size: Option<usize>,
    ) -> Result<RunSummary> {
        self.run_trials(trials, payload, algorithm, provider, key_size, Direction::Full)
    }

    pub fn run_forward(
        &mut self,
        trials: usize,
        payload: &PayloadSource,
        algorithm: &str,
        provider: &str,
        key_size: Option<usize>,
    ) -> Result<RunSummary> {
        self.run_trials(trials, payload, algorithm, provider, key_size, Direction::Forward)
    }

    pub fn run_reverse(
        &mut self,
        trials: usize,
        payload: &PayloadSource,
        algorithm: &str,
        provider: &str,
        key_size: Option<usize>,
    ) -> Result<RunSummary> {
        self.run_trials(trials, payload, algorithm, provider, key_size, Direction::Reverse)
    }

    pub fn run_trials(
        &mut self,
        trials: usize,
        payload: &PayloadSource,
        algorithm: &str,
        provider: &str,
        key_size: Option<usize>,
        direction: Direction,
    ) -> Result<RunSummary> {
        let request = match self.configure(trials, algorithm, provider, key_size, direction) {
            Ok(request) => request,
            Err(e) => return Err(self.abort(e)),
        };
        let name = request.summary_name();
        info!(
            "Running {} trials of {} ({} {})",
            trials,
            name,
            self.adapter.family(),
            direction
        );

        let mut summary = RunSummary::named(name.as_str());
        for trial in 1..=trials {
            self.state = RunState::Running { trial, of: trials };
            match self.run_trial(&request, payload) {
                Ok(meter) => {
                    debug!("{} trial {}/{}: {}", name, trial, trials, meter);
                    summary.fold(&meter)?;
                }
                Err(e) if e.is_fatal_to_run() => return Err(self.abort(e)),
                Err(e) => warn!("{} trial {}/{} discarded: {}", name, trial, trials, e),
            }
        }

        info!(
            "Finished {}: {} of {} trials valid",
            name,
            summary.trial_count(),
            trials
        );
        self.state = RunState::Completed(summary.clone());
        Ok(summary)
    }

    /// Everything that can fail before the first trial.
    fn configure(
        &self,
        trials: usize,
        algorithm: &str,
        provider: &str,
        key_size: Option<usize>,
        direction: Direction,
    ) -> Result<OperationRequest> {
        if trials == 0 {
            return Err(BenchError::Configuration(
                "a run needs at least one trial".to_string(),
            ));
        }
        let provider = self.registry.resolve(provider)?;
        let family = self.adapter.family();
        family.check_direction(direction)?;
        let key_size = family.resolve_key_size(key_size)?;

        let request = OperationRequest::new(algorithm, provider)
            .with_key_size(key_size)
            .with_direction(direction);
        self.adapter.validate(&request)?;
        Ok(request)
    }

    fn run_trial(&self, request: &OperationRequest, payload: &PayloadSource) -> Result<TrialMeter> {
        let mut body = self.adapter.prepare(request, payload)?;
        let mut meter = (self.new_meter)();
        meter.time(|| body.run(payload))?;
        trace!("{} ns since trial start", meter.elapsed_now());
        Ok(meter)
    }

    fn abort(&mut self, error: BenchError) -> BenchError {
        self.state = RunState::Aborted(error.to_string());
        error
    }
}
