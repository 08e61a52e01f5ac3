//! Sweep configuration: JSON file or built-in suite, then environment, then command line.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::adapters::{
    adapter_for, AES_CBC, AES_CFB, AES_GCM, CHACHA20_POLY1305, DESEDE_CBC, DESEDE_CFB, ECIES,
    RC2_CBC, RC2_CFB,
};
use crate::algorithms::rsa_wrapper::RsaPadding;
use crate::family::{AlgorithmFamily, Direction};
use crate::payload::PayloadSource;
use crate::timing::TimeUnit;
use crate::{BenchError, Result};

pub const DEFAULT_TRIALS: usize = 10;
pub const DEFAULT_ASYMMETRIC_TRIALS: usize = 5;
pub const DEFAULT_PRECISION: usize = 2;
pub const MAX_PRECISION: usize = 9;
pub const DEFAULT_PAYLOAD: &str = "data/payload.bin";
pub const DEFAULT_OUTPUT_DIR: &str = "data/results";

pub const ENV_PAYLOAD: &str = "CRYPTO_PERF_PAYLOAD";
pub const ENV_TRIALS: &str = "CRYPTO_PERF_TRIALS";
pub const ENV_OUTPUT_DIR: &str = "CRYPTO_PERF_OUTPUT_DIR";

fn default_trials() -> usize {
    DEFAULT_TRIALS
}

fn default_precision() -> usize {
    DEFAULT_PRECISION
}

fn default_payload() -> PathBuf {
    PathBuf::from(DEFAULT_PAYLOAD)
}

fn default_output_dir() -> Option<PathBuf> {
    Some(PathBuf::from(DEFAULT_OUTPUT_DIR))
}

/// One algorithm swept over a list of providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default)]
    pub name: String,
    pub family: AlgorithmFamily,
    pub algorithm: String,
    #[serde(default)]
    pub key_size: Option<usize>,
    #[serde(default)]
    pub direction: Direction,
    pub providers: Vec<String>,
    #[serde(default = "default_trials")]
    pub trials: usize,
    /// Overrides the top-level payload for this sweep only.
    #[serde(default)]
    pub payload: Option<PathBuf>,
}

impl SweepConfig {
    pub fn new(family: AlgorithmFamily, algorithm: &str, providers: &[&str]) -> Self {
        Self {
            name: String::new(),
            family,
            algorithm: algorithm.to_string(),
            key_size: None,
            direction: Direction::Full,
            providers: providers.iter().map(|p| p.to_string()).collect(),
            trials: DEFAULT_TRIALS,
            payload: None,
        }
    }

    pub fn with_key_size(mut self, key_size: usize) -> Self {
        self.key_size = Some(key_size);
        self
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.algorithm
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchConfig {
    #[serde(default = "default_payload")]
    pub payload: PathBuf,
    /// Directory for the per-family report files; reports go to stdout when unset.
    #[serde(default = "default_output_dir")]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub unit: TimeUnit,
    #[serde(default = "default_precision")]
    pub precision: usize,
    #[serde(default)]
    pub sweeps: Vec<SweepConfig>,
}

/// Settings given on the command line; each one that is set wins over the file and environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub payload: Option<PathBuf>,
    pub trials: Option<usize>,
    pub family: Option<AlgorithmFamily>,
    pub algorithm: Option<String>,
    pub key_size: Option<usize>,
    pub direction: Option<Direction>,
    pub providers: Vec<String>,
    pub unit: Option<TimeUnit>,
    pub precision: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub stdout: bool,
}

impl BenchConfig {
    /// The stock runs: block ciphers, hash functions, asymmetric ciphers, stream ciphers.
    pub fn default_suite() -> Self {
        use AlgorithmFamily::*;

        let mut sweeps = vec![
            SweepConfig::new(Block, DESEDE_CBC, &["rustcrypto"]),
            SweepConfig::new(Block, AES_CBC, &["rustcrypto"]),
            SweepConfig::new(Block, RC2_CBC, &["rustcrypto"]),
            SweepConfig::new(Block, AES_GCM, &["rustcrypto", "ring"]),
            SweepConfig::new(Hash, "MD5", &["rustcrypto"]),
            SweepConfig::new(Hash, "SHA-1", &["rustcrypto", "ring"]),
            SweepConfig::new(Hash, "SHA-512", &["rustcrypto", "ring"]),
            SweepConfig::new(Hash, "SHA-256", &["rustcrypto", "ring"]),
            SweepConfig::new(Hash, "SHA3-256", &["rustcrypto"]),
        ];
        for padding in RsaPadding::ALL {
            sweeps.push(
                SweepConfig::new(Asymmetric, padding.id(), &["rustcrypto"])
                    .with_key_size(2048)
                    .with_trials(DEFAULT_ASYMMETRIC_TRIALS),
            );
        }
        sweeps.push(
            SweepConfig::new(Asymmetric, ECIES, &["rustcrypto"])
                .with_key_size(256)
                .with_trials(DEFAULT_ASYMMETRIC_TRIALS),
        );
        for algorithm in [DESEDE_CFB, AES_CFB, RC2_CFB] {
            sweeps.push(SweepConfig::new(Stream, algorithm, &["rustcrypto"]));
        }
        sweeps.push(SweepConfig::new(Stream, CHACHA20_POLY1305, &["rustcrypto", "ring"]));

        Self {
            payload: default_payload(),
            output_dir: default_output_dir(),
            unit: TimeUnit::default(),
            precision: DEFAULT_PRECISION,
            sweeps,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        info!("Loaded {} sweeps from {}", config.sweeps.len(), path.display());
        Ok(config)
    }

    /// The file at `path`, or the default suite, with environment overrides applied.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default_suite(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies `CRYPTO_PERF_*` variables looked up through `var`.
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(payload) = var(ENV_PAYLOAD) {
            self.payload = PathBuf::from(payload);
        }
        if let Some(trials) = var(ENV_TRIALS) {
            let trials = trials.trim().parse::<usize>().map_err(|e| {
                BenchError::Configuration(format!("{} is not a trial count: {}", ENV_TRIALS, e))
            })?;
            for sweep in &mut self.sweeps {
                sweep.trials = trials;
            }
        }
        if let Some(dir) = var(ENV_OUTPUT_DIR) {
            self.output_dir = if dir.is_empty() {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }
        Ok(())
    }

    pub fn apply(&mut self, overrides: &Overrides) -> Result<()> {
        if let Some(payload) = &overrides.payload {
            self.payload = payload.clone();
        }
        if let Some(unit) = overrides.unit {
            self.unit = unit;
        }
        if let Some(precision) = overrides.precision {
            self.precision = precision;
        }
        if overrides.stdout {
            self.output_dir = None;
        } else if let Some(dir) = &overrides.output_dir {
            self.output_dir = Some(dir.clone());
        }

        match (&overrides.algorithm, overrides.family) {
            (Some(algorithm), Some(family)) => {
                self.sweeps = vec![Self::single_sweep(family, algorithm, overrides)];
            }
            (Some(algorithm), None) => {
                return Err(BenchError::Configuration(format!(
                    "--algorithm {} needs --family",
                    algorithm
                )))
            }
            (None, Some(family)) => self.sweeps.retain(|sweep| sweep.family == family),
            (None, None) => {}
        }

        // Unsupported combinations stay in; the driver reports each one as a failed run.
        if let Some(direction) = overrides.direction {
            for sweep in &mut self.sweeps {
                if !sweep.family.supports(direction) {
                    warn!("{} does not support {}", sweep.label(), direction);
                }
                sweep.direction = direction;
            }
        }
        if let Some(key_size) = overrides.key_size {
            for sweep in &mut self.sweeps {
                sweep.key_size = Some(key_size);
            }
        }
        if let Some(trials) = overrides.trials {
            for sweep in &mut self.sweeps {
                sweep.trials = trials;
            }
        }
        if !overrides.providers.is_empty() {
            for sweep in &mut self.sweeps {
                sweep.providers = overrides.providers.clone();
            }
        }
        Ok(())
    }

    fn single_sweep(family: AlgorithmFamily, algorithm: &str, overrides: &Overrides) -> SweepConfig {
        let providers: Vec<String> = adapter_for(family)
            .catalogue()
            .into_iter()
            .find(|(id, _)| *id == algorithm)
            .map(|(_, providers)| providers.iter().map(|p| p.id().to_string()).collect())
            .unwrap_or_default();
        let trials = match family {
            AlgorithmFamily::Asymmetric => DEFAULT_ASYMMETRIC_TRIALS,
            _ => DEFAULT_TRIALS,
        };
        SweepConfig {
            name: String::new(),
            family,
            algorithm: algorithm.to_string(),
            key_size: overrides.key_size,
            direction: Direction::Full,
            providers,
            trials,
            payload: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.precision > MAX_PRECISION {
            return Err(BenchError::Configuration(format!(
                "precision {} is above the maximum of {}",
                self.precision, MAX_PRECISION
            )));
        }
        if self.sweeps.is_empty() {
            return Err(BenchError::Configuration("no sweeps configured".to_string()));
        }
        for sweep in &self.sweeps {
            if sweep.algorithm.trim().is_empty() {
                return Err(BenchError::Configuration(
                    "a sweep has an empty algorithm id".to_string(),
                ));
            }
            if sweep.trials == 0 {
                return Err(BenchError::Configuration(format!(
                    "{} has zero trials",
                    sweep.label()
                )));
            }
            if sweep.providers.is_empty() {
                return Err(BenchError::Configuration(format!(
                    "{} has no providers",
                    sweep.label()
                )));
            }
        }
        Ok(())
    }

    pub fn payload_for(&self, sweep: &SweepConfig) -> PayloadSource {
        PayloadSource::file(sweep.payload.as_ref().unwrap_or(&self.payload))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self::default_suite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_suite_is_valid() {
        let config = BenchConfig::default_suite();
        config.validate().unwrap();
        assert_eq!(config.unit, TimeUnit::Milliseconds);
        assert_eq!(config.precision, 2);

        let asymmetric: Vec<_> = config
            .sweeps
            .iter()
            .filter(|s| s.family == AlgorithmFamily::Asymmetric)
            .collect();
        assert_eq!(asymmetric.len(), 6);
        assert!(asymmetric.iter().all(|s| s.trials == 5 && s.key_size.is_some()));
    }

    #[test]
    fn default_suite_covers_the_classic_catalogue() {
        let config = BenchConfig::default_suite();
        let has = |family: AlgorithmFamily, algorithm: &str| {
            config
                .sweeps
                .iter()
                .any(|s| s.family == family && s.algorithm == algorithm)
        };
        for algorithm in [DESEDE_CBC, AES_CBC, RC2_CBC] {
            assert!(has(AlgorithmFamily::Block, algorithm), "{}", algorithm);
        }
        for algorithm in [DESEDE_CFB, AES_CFB, RC2_CFB] {
            assert!(has(AlgorithmFamily::Stream, algorithm), "{}", algorithm);
        }
        for algorithm in ["MD5", "SHA-1", "SHA-512"] {
            assert!(has(AlgorithmFamily::Hash, algorithm), "{}", algorithm);
        }
        for padding in [
            RsaPadding::Pkcs1v15,
            RsaPadding::OaepSha1,
            RsaPadding::OaepSha224,
            RsaPadding::OaepSha512,
        ] {
            assert!(has(AlgorithmFamily::Asymmetric, padding.id()), "{}", padding.id());
        }
        assert!(has(AlgorithmFamily::Asymmetric, ECIES));

        // every sweep names a catalogue entry its providers implement
        for sweep in &config.sweeps {
            let catalogue = adapter_for(sweep.family).catalogue();
            let (_, providers) = catalogue
                .iter()
                .find(|(id, _)| *id == sweep.algorithm)
                .unwrap_or_else(|| panic!("{} is not catalogued", sweep.label()));
            for provider in &sweep.providers {
                assert!(
                    providers.iter().any(|p| p.id() == provider),
                    "{} / {}",
                    sweep.label(),
                    provider
                );
            }
        }
    }

    #[test]
    fn json_defaults_fill_in() {
        let config = BenchConfig::from_json_str(
            r#"{
                "sweeps": [
                    { "family": "hash", "algorithm": "SHA-256", "providers": ["ring"] },
                    { "family": "block", "algorithm": "AES/CBC/PKCS5Padding",
                      "providers": ["rc"], "key_size": 256, "direction": "reverse", "trials": 3 }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.payload, PathBuf::from(DEFAULT_PAYLOAD));
        assert_eq!(config.sweeps[0].trials, DEFAULT_TRIALS);
        assert_eq!(config.sweeps[0].direction, Direction::Full);
        assert_eq!(config.sweeps[1].key_size, Some(256));
        assert_eq!(config.sweeps[1].direction, Direction::Reverse);
        assert_eq!(config.sweeps[1].label(), "AES/CBC/PKCS5Padding");
    }

    #[test]
    fn bad_json_is_a_serialization_error() {
        assert!(matches!(
            BenchConfig::from_json_str("{ \"sweeps\": 3 }"),
            Err(BenchError::Serialization(_))
        ));
    }

    #[test]
    fn environment_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_PAYLOAD, "/tmp/other.bin"),
            (ENV_TRIALS, "3"),
            (ENV_OUTPUT_DIR, ""),
        ]
        .into_iter()
        .collect();
        let mut config = BenchConfig::default_suite();
        config
            .apply_env(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.payload, PathBuf::from("/tmp/other.bin"));
        assert!(config.sweeps.iter().all(|s| s.trials == 3));
        assert_eq!(config.output_dir, None);

        let mut config = BenchConfig::default_suite();
        let bad = config.apply_env(|key| (key == ENV_TRIALS).then(|| "many".to_string()));
        assert!(matches!(bad, Err(BenchError::Configuration(_))));
    }

    #[test]
    fn single_sweep_from_overrides() {
        let mut config = BenchConfig::default_suite();
        config
            .apply(&Overrides {
                family: Some(AlgorithmFamily::Block),
                algorithm: Some(AES_GCM.to_string()),
                key_size: Some(256),
                trials: Some(4),
                stdout: true,
                ..Overrides::default()
            })
            .unwrap();
        assert_eq!(config.sweeps.len(), 1);
        let sweep = &config.sweeps[0];
        assert_eq!(sweep.providers, vec!["rustcrypto", "ring"]);
        assert_eq!(sweep.key_size, Some(256));
        assert_eq!(sweep.trials, 4);
        assert_eq!(config.output_dir, None);
    }

    #[test]
    fn direction_override_keeps_unsupported_sweeps() {
        let mut config = BenchConfig::default_suite();
        let before = config.sweeps.len();
        config
            .apply(&Overrides {
                direction: Some(Direction::Reverse),
                ..Overrides::default()
            })
            .unwrap();
        assert_eq!(config.sweeps.len(), before);
        assert!(config.sweeps.iter().all(|s| s.direction == Direction::Reverse));
        assert!(config.sweeps.iter().any(|s| s.family == AlgorithmFamily::Hash));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn algorithm_without_family_is_rejected() {
        let mut config = BenchConfig::default_suite();
        let result = config.apply(&Overrides {
            algorithm: Some("SHA-256".to_string()),
            ..Overrides::default()
        });
        assert!(matches!(result, Err(BenchError::Configuration(_))));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = BenchConfig::default_suite();
        config.precision = 10;
        assert!(config.validate().is_err());

        let mut config = BenchConfig::default_suite();
        config.sweeps[0].trials = 0;
        assert!(config.validate().is_err());

        let mut config = BenchConfig::default_suite();
        config.sweeps[0].providers.clear();
        assert!(config.validate().is_err());

        let mut config = BenchConfig::default_suite();
        config.sweeps.clear();
        assert!(config.validate().is_err());
    }
}
