use thiserror::Error;

use crate::family::{AlgorithmFamily, Direction};

pub type Result<T> = std::result::Result<T, BenchError>;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported operation: {direction} is not meaningful for {family} algorithms")]
    UnsupportedOperation {
        family: AlgorithmFamily,
        direction: Direction,
    },

    #[error("Trial failure: {0}")]
    TrialFailure(String),

    #[error("Division undefined: {0} has no valid trials")]
    DivisionUndefined(String),

    #[error("Invalid trial: {0}")]
    InvalidTrial(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Decryption error: {0}")]
    Decryption(String),

    #[error("Key generation error: {0}")]
    KeyGeneration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BenchError {
    /// Errors that void a whole run rather than a single trial.
    pub fn is_fatal_to_run(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::UnsupportedOperation { .. }
        )
    }

    pub fn unsupported(family: AlgorithmFamily, direction: Direction) -> Self {
        Self::UnsupportedOperation { family, direction }
    }
}

impl From<serde_json::Error> for BenchError {
    fn from(err: serde_json::Error) -> Self {
        BenchError::Serialization(err.to_string())
    }
}
