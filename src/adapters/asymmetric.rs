use super::body::CipherBody;
use super::check_catalogue;
use crate::algorithms::ecc_wrapper::{ECCWrapper, ECIES_KEY_SIZE};
use crate::algorithms::rsa_wrapper::{RSAWrapper, RsaPadding, MIN_RSA_KEY_SIZE};
use crate::family::{AlgorithmFamily, Direction};
use crate::payload::PayloadSource;
use crate::provider::Provider;
use crate::{BenchError, Encryption, OperationAdapter, OperationRequest, Result, TimedBody};

/// Asymmetric ciphers run in ECB fashion over fixed-size payload chunks.
pub const ASYMMETRIC_CHUNK_SIZE: usize = 126;
pub const ECIES: &str = "ECIES";

const RUSTCRYPTO_ONLY: &[Provider] = &[Provider::RustCrypto];

#[derive(Debug, Clone, Copy, Default)]
pub struct AsymmetricCipherAdapter;

impl AsymmetricCipherAdapter {
    fn key_bits(request: &OperationRequest) -> Result<usize> {
        request.key_size.ok_or_else(|| {
            BenchError::Configuration(format!("{} needs an explicit key size", request.algorithm))
        })
    }

    /// A keyed cipher and the chunk size it can carry.
    fn cipher(request: &OperationRequest) -> Result<(Box<dyn Encryption>, usize)> {
        let bits = Self::key_bits(request)?;
        if request.algorithm == ECIES {
            let mut ecc = ECCWrapper::new();
            ecc.set_key()?;
            return Ok((Box::new(ecc), ASYMMETRIC_CHUNK_SIZE));
        }
        let padding = RsaPadding::from_id(&request.algorithm).ok_or_else(|| {
            BenchError::Configuration(format!("unknown asymmetric cipher '{}'", request.algorithm))
        })?;
        let mut rsa = RSAWrapper::new(padding);
        rsa.set_key(bits)?;
        let chunk_size = ASYMMETRIC_CHUNK_SIZE.min(rsa.max_message_len()?);
        Ok((Box::new(rsa), chunk_size))
    }

    fn body(
        request: &OperationRequest,
        direction: Direction,
        payload: &PayloadSource,
    ) -> Result<Box<dyn TimedBody>> {
        let (cipher, chunk_size) = Self::cipher(request)?;
        let body = CipherBody::prepare(cipher, Some(chunk_size), direction, payload)?;
        Ok(Box::new(body))
    }
}

impl OperationAdapter for AsymmetricCipherAdapter {
    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::Asymmetric
    }

    fn catalogue(&self) -> Vec<(&'static str, &'static [Provider])> {
        RsaPadding::ALL
            .into_iter()
            .map(|padding| (padding.id(), RUSTCRYPTO_ONLY))
            .chain(std::iter::once((ECIES, RUSTCRYPTO_ONLY)))
            .collect()
    }

    fn validate(&self, request: &OperationRequest) -> Result<()> {
        check_catalogue(self, request)?;
        let bits = Self::key_bits(request)?;
        if request.algorithm == ECIES {
            if bits != ECIES_KEY_SIZE {
                return Err(BenchError::Configuration(format!(
                    "ECIES runs on P-256 only, not {} bits",
                    bits
                )));
            }
            return Ok(());
        }
        if bits < MIN_RSA_KEY_SIZE {
            return Err(BenchError::Configuration(format!(
                "RSA keys below {} bits are not supported",
                MIN_RSA_KEY_SIZE
            )));
        }
        let padding = RsaPadding::from_id(&request.algorithm).ok_or_else(|| {
            BenchError::Configuration(format!("unknown asymmetric cipher '{}'", request.algorithm))
        })?;
        if padding.capacity(bits).is_none() {
            return Err(BenchError::Configuration(format!(
                "a {}-bit key is too small for {}",
                bits, request.algorithm
            )));
        }
        Ok(())
    }

    fn prepare_full(
        &self,
        request: &OperationRequest,
        payload: &PayloadSource,
    ) -> Result<Box<dyn TimedBody>> {
        Self::body(request, Direction::Full, payload)
    }

    fn prepare_forward(
        &self,
        request: &OperationRequest,
        payload: &PayloadSource,
    ) -> Result<Box<dyn TimedBody>> {
        Self::body(request, Direction::Forward, payload)
    }

    fn prepare_reverse(
        &self,
        request: &OperationRequest,
        payload: &PayloadSource,
    ) -> Result<Box<dyn TimedBody>> {
        Self::body(request, Direction::Reverse, payload)
    }
}
