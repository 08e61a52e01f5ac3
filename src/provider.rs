//! Cryptographic providers and the registry of providers available to a sweep.
//!
//! Nothing here is global: the driver calls [`ProviderRegistry::install`] once and hands the
//! registry to every runner it builds.

use std::fmt;
use std::str::FromStr;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// The RustCrypto crates (`aes`, `cbc`, `aes-gcm`, `chacha20poly1305`, `sha2`, `sha3`,
    /// `rsa`, `p256`).
    RustCrypto,
    /// BoringSSL-derived primitives from `ring`.
    Ring,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::RustCrypto, Provider::Ring];

    pub fn id(self) -> &'static str {
        match self {
            Self::RustCrypto => "rustcrypto",
            Self::Ring => "ring",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Provider {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rustcrypto" | "rc" => Ok(Self::RustCrypto),
            "ring" => Ok(Self::Ring),
            other => Err(BenchError::Configuration(format!("unknown provider '{}'", other))),
        }
    }
}

/// The providers a sweep may use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
}

impl ProviderRegistry {
    /// Registers every provider compiled into this build.
    pub fn install() -> Self {
        let registry = Self::with(&Provider::ALL);
        info!("Registered providers: {}", registry.ids().join(", "));
        registry
    }

    pub fn with(providers: &[Provider]) -> Self {
        let mut unique = Vec::with_capacity(providers.len());
        for provider in providers {
            if !unique.contains(provider) {
                unique.push(*provider);
            }
        }
        Self { providers: unique }
    }

    pub fn contains(&self, provider: Provider) -> bool {
        self.providers.contains(&provider)
    }

    /// Parses `id` and checks that the provider is registered.
    pub fn resolve(&self, id: &str) -> Result<Provider> {
        let provider: Provider = id.parse()?;
        if self.contains(provider) {
            Ok(provider)
        } else {
            Err(BenchError::Configuration(format!(
                "provider '{}' is not registered",
                provider
            )))
        }
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.id()).collect()
    }
}
