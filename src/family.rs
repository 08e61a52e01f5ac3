//! Algorithm families, operation directions and the per-family policy table.
//!
//! Family behaviour that varies (whether a key size is needed, which directions make sense)
//! lives in [`POLICIES`] as plain data; runners and adapters look it up instead of
//! overriding defaults per family.

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmFamily {
    Block,
    Stream,
    Hash,
    Asymmetric,
}

/// Which half of a reversible operation a trial times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Forward then reverse (encrypt and decrypt), or the whole digest for hashes.
    #[default]
    Full,
    Forward,
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySizePolicy {
    /// The family takes no key; a supplied size is ignored.
    Ignored,
    /// A missing size falls back to the algorithm's key-generation default.
    AlgorithmDefault,
    /// No safe default exists; a missing size is a configuration error.
    Required,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyPolicy {
    pub family: AlgorithmFamily,
    pub key_size: KeySizePolicy,
    pub directions: &'static [Direction],
}

pub const POLICIES: [FamilyPolicy; 4] = [
    FamilyPolicy {
        family: AlgorithmFamily::Block,
        key_size: KeySizePolicy::AlgorithmDefault,
        directions: &[Direction::Full, Direction::Forward, Direction::Reverse],
    },
    FamilyPolicy {
        family: AlgorithmFamily::Stream,
        key_size: KeySizePolicy::AlgorithmDefault,
        directions: &[Direction::Full, Direction::Forward, Direction::Reverse],
    },
    FamilyPolicy {
        family: AlgorithmFamily::Hash,
        key_size: KeySizePolicy::Ignored,
        directions: &[Direction::Full],
    },
    FamilyPolicy {
        family: AlgorithmFamily::Asymmetric,
        key_size: KeySizePolicy::Required,
        directions: &[Direction::Full, Direction::Forward, Direction::Reverse],
    },
];

impl AlgorithmFamily {
    pub const ALL: [AlgorithmFamily; 4] = [
        AlgorithmFamily::Block,
        AlgorithmFamily::Stream,
        AlgorithmFamily::Hash,
        AlgorithmFamily::Asymmetric,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Stream => "stream",
            Self::Hash => "hash",
            Self::Asymmetric => "asymmetric",
        }
    }

    pub fn policy(self) -> &'static FamilyPolicy {
        let index = match self {
            Self::Block => 0,
            Self::Stream => 1,
            Self::Hash => 2,
            Self::Asymmetric => 3,
        };
        &POLICIES[index]
    }

    pub fn supports(self, direction: Direction) -> bool {
        self.policy().directions.contains(&direction)
    }

    /// Fails with `UnsupportedOperation` when the direction is meaningless here.
    pub fn check_direction(self, direction: Direction) -> Result<()> {
        if self.supports(direction) {
            Ok(())
        } else {
            Err(BenchError::unsupported(self, direction))
        }
    }

    /// Applies the family's key-size policy to a requested size.
    ///
    /// Returns the size the adapter should use; `None` means "no key" for hashes and
    /// "algorithm default" for symmetric ciphers.
    pub fn resolve_key_size(self, requested: Option<usize>) -> Result<Option<usize>> {
        match (self.policy().key_size, requested) {
            (KeySizePolicy::Ignored, Some(bits)) => {
                debug!("Ignoring key size {} for {} algorithm", bits, self);
                Ok(None)
            }
            (KeySizePolicy::Ignored, None) => Ok(None),
            (KeySizePolicy::AlgorithmDefault, requested) => Ok(requested),
            (KeySizePolicy::Required, Some(bits)) => Ok(Some(bits)),
            (KeySizePolicy::Required, None) => Err(BenchError::Configuration(format!(
                "{} algorithms need an explicit key size",
                self
            ))),
        }
    }

    /// File stem of the per-family results file.
    pub fn report_stem(self, direction: Direction) -> String {
        let base = match self {
            Self::Block => "block ciphers",
            Self::Stream => "stream ciphers",
            Self::Hash => "hash",
            Self::Asymmetric => "asymmetric ciphers",
        };
        match direction {
            Direction::Full => base.to_string(),
            Direction::Forward => format!("{} encryption", base),
            Direction::Reverse => format!("{} decryption", base),
        }
    }
}

impl fmt::Display for AlgorithmFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Block => "block cipher",
            Self::Stream => "stream cipher",
            Self::Hash => "hash",
            Self::Asymmetric => "asymmetric cipher",
        };
        f.write_str(name)
    }
}

impl FromStr for AlgorithmFamily {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BenchError::Configuration(format!("unknown algorithm family '{}'", s)))
    }
}

impl Direction {
    pub fn id(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Forward => "forward",
            Self::Reverse => "reverse",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Direction {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "forward" | "encrypt" => Ok(Self::Forward),
            "reverse" | "decrypt" => Ok(Self::Reverse),
            other => Err(BenchError::Configuration(format!("unknown direction '{}'", other))),
        }
    }
}
