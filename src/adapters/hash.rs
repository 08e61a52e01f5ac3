use std::hint::black_box;

use super::check_catalogue;
use crate::algorithms::digest_wrapper::{new_digest, DigestAlgorithm};
use crate::family::AlgorithmFamily;
use crate::payload::PayloadSource;
use crate::provider::Provider;
use crate::{BenchError, OperationAdapter, OperationRequest, Result, StreamingDigest, TimedBody};

/// Read size when streaming the payload through a digest.
pub const HASH_CHUNK_SIZE: usize = 8 * 1024;

/// Message digests. Only the full direction exists; forward and reverse are unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashAdapter;

struct DigestBody {
    digest: Option<Box<dyn StreamingDigest>>,
}

impl TimedBody for DigestBody {
    fn run(&mut self, payload: &PayloadSource) -> Result<()> {
        let mut digest = self
            .digest
            .take()
            .ok_or_else(|| BenchError::TrialFailure("digest already consumed".to_string()))?;
        payload.for_each_chunk(HASH_CHUNK_SIZE, |chunk| {
            digest.update(chunk);
            Ok(())
        })?;
        black_box(digest.finish());
        Ok(())
    }
}

impl OperationAdapter for HashAdapter {
    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::Hash
    }

    fn catalogue(&self) -> Vec<(&'static str, &'static [Provider])> {
        DigestAlgorithm::ALL
            .into_iter()
            .map(|algorithm| (algorithm.id(), algorithm.providers()))
            .collect()
    }

    fn validate(&self, request: &OperationRequest) -> Result<()> {
        check_catalogue(self, request)
    }

    fn prepare_full(
        &self,
        request: &OperationRequest,
        _payload: &PayloadSource,
    ) -> Result<Box<dyn TimedBody>> {
        let algorithm = DigestAlgorithm::from_id(&request.algorithm).ok_or_else(|| {
            BenchError::Configuration(format!("unknown hash function '{}'", request.algorithm))
        })?;
        let digest = new_digest(algorithm, request.provider)?;
        Ok(Box::new(DigestBody {
            digest: Some(digest),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::Direction;

    #[test]
    fn only_full_is_supported() {
        let payload = PayloadSource::memory(vec![0u8; 20_000]);
        let request = OperationRequest::new("SHA-256", Provider::Ring);

        let mut body = HashAdapter.prepare(&request, &payload).unwrap();
        body.run(&payload).unwrap();
        // a body is good for one trial
        assert!(body.run(&payload).is_err());

        for direction in [Direction::Forward, Direction::Reverse] {
            let request = request.clone().with_direction(direction);
            match HashAdapter.prepare(&request, &payload) {
                Err(BenchError::UnsupportedOperation { family, direction: d }) => {
                    assert_eq!(family, AlgorithmFamily::Hash);
                    assert_eq!(d, direction);
                }
                Err(other) => panic!("unexpected error {other}"),
                Ok(_) => panic!("hash {direction} should be unsupported"),
            }
        }
    }

    #[test]
    fn unknown_and_unprovided_names() {
        assert!(HashAdapter
            .validate(&OperationRequest::new("SHA1", Provider::Ring))
            .is_err());
        assert!(HashAdapter
            .validate(&OperationRequest::new("SHA3-512", Provider::Ring))
            .is_err());
        assert!(HashAdapter
            .validate(&OperationRequest::new("SHA3-512", Provider::RustCrypto))
            .is_ok());
    }
}
