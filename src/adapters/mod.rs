//! Operation adapters, one per algorithm family.

mod asymmetric;
mod block;
mod body;
mod hash;
mod stream;

pub use asymmetric::{AsymmetricCipherAdapter, ASYMMETRIC_CHUNK_SIZE, ECIES};
pub use block::{BlockCipherAdapter, AES_CBC, AES_GCM, DESEDE_CBC, RC2_CBC};
pub use body::CipherBody;
pub use hash::{HashAdapter, HASH_CHUNK_SIZE};
pub use stream::{StreamCipherAdapter, AES_CFB, CHACHA20_POLY1305, DESEDE_CFB, RC2_CFB};

use crate::family::AlgorithmFamily;
use crate::{BenchError, OperationAdapter, OperationRequest, Result};

pub fn adapter_for(family: AlgorithmFamily) -> Box<dyn OperationAdapter> {
    match family {
        AlgorithmFamily::Block => Box::new(BlockCipherAdapter),
        AlgorithmFamily::Stream => Box::new(StreamCipherAdapter),
        AlgorithmFamily::Hash => Box::new(HashAdapter),
        AlgorithmFamily::Asymmetric => Box::new(AsymmetricCipherAdapter),
    }
}

/// Checks that the algorithm is known to `adapter` and implemented by the requested provider.
pub(crate) fn check_catalogue(adapter: &dyn OperationAdapter, request: &OperationRequest) -> Result<()> {
    let catalogue = adapter.catalogue();
    let providers = catalogue
        .iter()
        .find(|(id, _)| *id == request.algorithm)
        .map(|(_, providers)| *providers)
        .ok_or_else(|| {
            BenchError::Configuration(format!(
                "unknown {} algorithm '{}'",
                adapter.family(),
                request.algorithm
            ))
        })?;
    if !providers.contains(&request.provider) {
        return Err(BenchError::Configuration(format!(
            "{} is not provided by {}",
            request.algorithm, request.provider
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapters_match_their_family() {
        for family in AlgorithmFamily::ALL {
            let adapter = adapter_for(family);
            assert_eq!(adapter.family(), family);
            assert!(!adapter.catalogue().is_empty());
        }
    }

    #[test]
    fn catalogue_entries_validate() {
        for family in AlgorithmFamily::ALL {
            let adapter = adapter_for(family);
            let key_size = match family {
                AlgorithmFamily::Asymmetric => Some(2048),
                _ => None,
            };
            for (algorithm, providers) in adapter.catalogue() {
                for provider in providers {
                    let key_size = if algorithm == ECIES { Some(256) } else { key_size };
                    let request = OperationRequest::new(algorithm, *provider).with_key_size(key_size);
                    assert!(adapter.validate(&request).is_ok(), "{} / {}", algorithm, provider);
                }
            }
        }
    }
}
