use super::body::CipherBody;
use super::check_catalogue;
use crate::algorithms::aead_wrapper::{AEADWrapper, AeadAlgorithm};
use crate::algorithms::block_wrapper::{parse_transformation, BlockCipherWrapper};
use crate::family::{AlgorithmFamily, Direction};
use crate::payload::PayloadSource;
use crate::provider::Provider;
use crate::{BenchError, Encryption, OperationAdapter, OperationRequest, Result, TimedBody};

pub const DESEDE_CBC: &str = "DESede/CBC/PKCS5Padding";
pub const AES_CBC: &str = "AES/CBC/PKCS5Padding";
pub const RC2_CBC: &str = "RC2/CBC/PKCS5Padding";
pub const AES_GCM: &str = "AES/GCM/NoPadding";

const CATALOGUE: [(&str, &[Provider]); 4] = [
    (DESEDE_CBC, &[Provider::RustCrypto]),
    (AES_CBC, &[Provider::RustCrypto]),
    (RC2_CBC, &[Provider::RustCrypto]),
    (AES_GCM, &[Provider::RustCrypto, Provider::Ring]),
];

/// Allowed key sizes and the default for a symmetric id. Ids that are not
/// `<cipher>/<mode>/PKCS5Padding` transformations belong to `aead`.
pub(super) fn key_sizes(algorithm: &str, aead: AeadAlgorithm) -> (&'static [usize], usize) {
    match parse_transformation(algorithm) {
        Some((cipher, _)) => (cipher.key_sizes(), cipher.default_key_size()),
        None => (aead.key_sizes(), aead.default_key_size()),
    }
}

pub(super) fn check_key_size(request: &OperationRequest, aead: AeadAlgorithm) -> Result<()> {
    let (allowed, default) = key_sizes(&request.algorithm, aead);
    let bits = request.key_size.unwrap_or(default);
    if !allowed.contains(&bits) {
        return Err(BenchError::Configuration(format!(
            "{} does not take a {}-bit key",
            request.algorithm, bits
        )));
    }
    Ok(())
}

/// A freshly keyed cipher for `request`.
pub(super) fn keyed_cipher(
    request: &OperationRequest,
    aead: AeadAlgorithm,
) -> Result<Box<dyn Encryption>> {
    let (_, default) = key_sizes(&request.algorithm, aead);
    let bits = request.key_size.unwrap_or(default);
    match parse_transformation(&request.algorithm) {
        Some((cipher, mode)) => Ok(Box::new(BlockCipherWrapper::with_random_key(
            cipher, mode, bits,
        )?)),
        None => Ok(Box::new(AEADWrapper::with_random_key(
            aead,
            request.provider,
            bits,
        )?)),
    }
}

/// Triple DES, AES and RC2 in CBC mode, plus AES-GCM, over the whole payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockCipherAdapter;

impl BlockCipherAdapter {
    fn body(
        request: &OperationRequest,
        direction: Direction,
        payload: &PayloadSource,
    ) -> Result<Box<dyn TimedBody>> {
        let cipher = keyed_cipher(request, AeadAlgorithm::AesGcm)?;
        let body = CipherBody::prepare(cipher, None, direction, payload)?;
        Ok(Box::new(body))
    }
}

impl OperationAdapter for BlockCipherAdapter {
    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::Block
    }

    fn catalogue(&self) -> Vec<(&'static str, &'static [Provider])> {
        CATALOGUE.to_vec()
    }

    fn validate(&self, request: &OperationRequest) -> Result<()> {
        check_catalogue(self, request)?;
        check_key_size(request, AeadAlgorithm::AesGcm)
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
