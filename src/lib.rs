pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod driver;
pub mod error;
pub mod family;
pub mod payload;
pub mod provider;
pub mod runner;
pub mod timing;

pub use error::{BenchError, Result};
pub use family::{AlgorithmFamily, Direction};
pub use payload::PayloadSource;
pub use provider::{Provider, ProviderRegistry};
pub use runner::{BenchmarkRunner, RunState};
pub use timing::{RunSummary, TimeUnit, TrialMeter};

// Common traits for all cipher wrappers
pub trait Encryption {
    fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>>;
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>>;
}

pub trait KeyGeneration {
    fn generate_key(&self) -> Result<Vec<u8>>;
}

/// Incremental digest over a payload stream.
pub trait StreamingDigest {
    fn update(&mut self, data: &[u8]);
    fn finish(self: Box<Self>) -> Vec<u8>;
}

/// One run configuration as seen by an operation adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    pub algorithm: String,
    pub provider: Provider,
    /// Already resolved against the family's key-size policy.
    pub key_size: Option<usize>,
    pub direction: Direction,
}

impl OperationRequest {
    pub fn new(algorithm: impl Into<String>, provider: Provider) -> Self {
        Self {
            algorithm: algorithm.into(),
            provider,
            key_size: None,
            direction: Direction::Full,
        }
    }

    pub fn with_key_size(mut self, key_size: Option<usize>) -> Self {
        self.key_size = key_size;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Name of the summary this request produces, e.g. `AES/CBC/PKCS5Padding-rustcrypto`.
    pub fn summary_name(&self) -> String {
        format!("{}-{}", self.algorithm, self.provider)
    }
}

/// The part of a trial that runs between the meter's start and stop.
pub trait TimedBody {
    fn run(&mut self, payload: &PayloadSource) -> Result<()>;
}

impl<F> TimedBody for F
where
    F: FnMut(&PayloadSource) -> Result<()>,
{
    fn run(&mut self, payload: &PayloadSource) -> Result<()> {
        self(payload)
    }
}

/// Performs the cryptographic work of one algorithm family.
///
/// Setup (key generation, cipher construction, ciphertext for decrypt-only runs) happens in the
/// `prepare_*` methods and is never timed; only the returned [`TimedBody`] is.
pub trait OperationAdapter {
    fn family(&self) -> AlgorithmFamily;

    /// Algorithm ids this adapter knows, with the providers implementing each.
    fn catalogue(&self) -> Vec<(&'static str, &'static [Provider])>;

    /// Rejects unknown algorithms, unimplemented provider pairs and bad key sizes.
    fn validate(&self, request: &OperationRequest) -> Result<()>;

    fn prepare_full(
        &self,
        request: &OperationRequest,
        payload: &PayloadSource,
    ) -> Result<Box<dyn TimedBody>>;

    fn prepare_forward(
        &self,
        _request: &OperationRequest,
        _payload: &PayloadSource,
    ) -> Result<Box<dyn TimedBody>> {
        Err(BenchError::unsupported(self.family(), Direction::Forward))
    }

    fn prepare_reverse(
        &self,
        _request: &OperationRequest,
        _payload: &PayloadSource,
    ) -> Result<Box<dyn TimedBody>> {
        Err(BenchError::unsupported(self.family(), Direction::Reverse))
    }

    /// Dispatches on the request's direction.
    fn prepare(
        &self,
        request: &OperationRequest,
        payload: &PayloadSource,
    ) -> Result<Box<dyn TimedBody>> {
        match request.direction {
            Direction::Full => self.prepare_full(request, payload),
            Direction::Forward => self.prepare_forward(request, payload),
            Direction::Reverse => self.prepare_reverse(request, payload),
        }
    }
}
