use super::block::{check_key_size, keyed_cipher};
use super::body::CipherBody;
use super::check_catalogue;
use crate::algorithms::aead_wrapper::AeadAlgorithm;
use crate::family::{AlgorithmFamily, Direction};
use crate::payload::PayloadSource;
use crate::provider::Provider;
use crate::{OperationAdapter, OperationRequest, Result, TimedBody};

pub const DESEDE_CFB: &str = "DESede/CFB/PKCS5Padding";
pub const AES_CFB: &str = "AES/CFB/PKCS5Padding";
pub const RC2_CFB: &str = "RC2/CFB/PKCS5Padding";
pub const CHACHA20_POLY1305: &str = "ChaCha20-Poly1305";

const CATALOGUE: [(&str, &[Provider]); 4] = [
    (DESEDE_CFB, &[Provider::RustCrypto]),
    (AES_CFB, &[Provider::RustCrypto]),
    (RC2_CFB, &[Provider::RustCrypto]),
    (CHACHA20_POLY1305, &[Provider::RustCrypto, Provider::Ring]),
];

/// Block ciphers run as self-synchronising streams (CFB), plus ChaCha20-Poly1305.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamCipherAdapter;

impl StreamCipherAdapter {
    fn body(
        request: &OperationRequest,
        direction: Direction,
        payload: &PayloadSource,
    ) -> Result<Box<dyn TimedBody>> {
        let cipher = keyed_cipher(request, AeadAlgorithm::ChaCha20Poly1305)?;
        let body = CipherBody::prepare(cipher, None, direction, payload)?;
        Ok(Box::new(body))
    }
}

impl OperationAdapter for StreamCipherAdapter {
    fn family(&self) -> AlgorithmFamily {
        AlgorithmFamily::Stream
    }

    fn catalogue(&self) -> Vec<(&'static str, &'static [Provider])> {
        CATALOGUE.to_vec()
    }

    fn validate(&self, request: &OperationRequest) -> Result<()> {
        check_catalogue(self, request)?;
        check_key_size(request, AeadAlgorithm::ChaCha20Poly1305)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BenchError;

    #[test]
    fn key_size_is_fixed() {
        let adapter = StreamCipherAdapter;
        let base = OperationRequest::new(CHACHA20_POLY1305, Provider::Ring);
        assert!(adapter.validate(&base).is_ok());
        assert!(adapter.validate(&base.clone().with_key_size(Some(256))).is_ok());
        assert!(matches!(
            adapter.validate(&base.with_key_size(Some(128))),
            Err(BenchError::Configuration(_))
        ));
    }

    #[test]
    fn both_providers_round_trip() {
        let payload = PayloadSource::memory(vec![0x11u8; 4096]);
        for provider in Provider::ALL {
            let request = OperationRequest::new(CHACHA20_POLY1305, provider);
            let mut body = StreamCipherAdapter.prepare(&request, &payload).unwrap();
            body.run(&payload).unwrap();
        }
    }

    #[test]
    fn cfb_transformations_round_trip() {
        let payload = PayloadSource::memory((0..4099u32).map(|i| i as u8).collect::<Vec<u8>>());
        for algorithm in [DESEDE_CFB, AES_CFB, RC2_CFB] {
            let adapter = StreamCipherAdapter;
            let request = OperationRequest::new(algorithm, Provider::RustCrypto);
            assert!(adapter.validate(&request).is_ok(), "{}", algorithm);
            for direction in [Direction::Full, Direction::Forward, Direction::Reverse] {
                let request = request.clone().with_direction(direction);
                let mut body = adapter.prepare(&request, &payload).unwrap();
                body.run(&payload).unwrap();
            }
        }
    }

    #[test]
    fn cfb_key_sizes_follow_the_cipher() {
        let adapter = StreamCipherAdapter;
        let triple_des = OperationRequest::new(DESEDE_CFB, Provider::RustCrypto);
        assert!(adapter.validate(&triple_des.clone().with_key_size(Some(112))).is_ok());
        assert!(adapter.validate(&triple_des.with_key_size(Some(256))).is_err());
        assert!(adapter
            .validate(&OperationRequest::new(AES_CFB, Provider::RustCrypto).with_key_size(Some(192)))
            .is_ok());
        assert!(adapter
            .validate(&OperationRequest::new(AES_CFB, Provider::Ring))
            .is_err());
    }
}
