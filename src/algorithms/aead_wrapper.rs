use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Aes256Gcm};
use chacha20poly1305::ChaCha20Poly1305;
use rand::RngCore;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_128_GCM, AES_256_GCM, CHACHA20_POLY1305};

use crate::provider::Provider;
use crate::{BenchError, Encryption, KeyGeneration, Result};

pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AeadAlgorithm {
    AesGcm,
    ChaCha20Poly1305,
}

impl AeadAlgorithm {
    pub fn key_sizes(self) -> &'static [usize] {
        match self {
            Self::AesGcm => &[128, 256],
            Self::ChaCha20Poly1305 => &[256],
        }
    }

    pub fn default_key_size(self) -> usize {
        match self {
            Self::AesGcm => 128,
            Self::ChaCha20Poly1305 => 256,
        }
    }
}

/// Authenticated cipher backed by either RustCrypto or `ring`.
///
/// A wrapper holds one key and one nonce, so it must seal at most one message per key.
pub struct AEADWrapper {
    algorithm: AeadAlgorithm,
    provider: Provider,
    key: Option<Vec<u8>>,
    nonce: [u8; NONCE_LEN],
}

impl AEADWrapper {
    pub fn new(algorithm: AeadAlgorithm, provider: Provider) -> Self {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);
        Self {
            algorithm,
            provider,
            key: None,
            nonce,
        }
    }

    pub fn with_random_key(
        algorithm: AeadAlgorithm,
        provider: Provider,
        key_bits: usize,
    ) -> Result<Self> {
        if !algorithm.key_sizes().contains(&key_bits) {
            return Err(BenchError::KeyGeneration(format!(
                "{:?} has no {}-bit key size",
                algorithm, key_bits
            )));
        }
        let mut wrapper = Self::new(algorithm, provider);
        let mut key = vec![0u8; key_bits / 8];
        rand::thread_rng().fill_bytes(&mut key);
        wrapper.set_key(key);
        Ok(wrapper)
    }

    pub fn set_key(&mut self, key: Vec<u8>) {
        self.key = Some(key);
    }

    fn key(&self) -> Result<&[u8]> {
        self.key
            .as_deref()
            .ok_or_else(|| BenchError::Encryption("No key set".to_string()))
    }

    fn ring_key(&self) -> Result<LessSafeKey> {
        let key = self.key()?;
        let algorithm = match (self.algorithm, key.len()) {
            (AeadAlgorithm::AesGcm, 16) => &AES_128_GCM,
            (AeadAlgorithm::AesGcm, 32) => &AES_256_GCM,
            (AeadAlgorithm::ChaCha20Poly1305, 32) => &CHACHA20_POLY1305,
            (algorithm, n) => {
                return Err(BenchError::KeyGeneration(format!(
                    "ring has no {:?} with a {}-byte key",
                    algorithm, n
                )))
            }
        };
        let unbound = UnboundKey::new(algorithm, key)
            .map_err(|e| BenchError::KeyGeneration(e.to_string()))?;
        Ok(LessSafeKey::new(unbound))
    }

    fn seal_rustcrypto(&self, data: &[u8]) -> Result<Vec<u8>> {
        let key = self.key()?;
        let nonce = GenericArray::from_slice(&self.nonce);
        let sealed = match (self.algorithm, key.len()) {
            (AeadAlgorithm::AesGcm, 16) => Aes128Gcm::new_from_slice(key)
                .map_err(|e| BenchError::Encryption(e.to_string()))?
                .encrypt(nonce, data),
            (AeadAlgorithm::AesGcm, 32) => Aes256Gcm::new_from_slice(key)
                .map_err(|e| BenchError::Encryption(e.to_string()))?
                .encrypt(nonce, data),
            (AeadAlgorithm::ChaCha20Poly1305, 32) => ChaCha20Poly1305::new_from_slice(key)
                .map_err(|e| BenchError::Encryption(e.to_string()))?
                .encrypt(nonce, data),
            (algorithm, n) => {
                return Err(BenchError::Encryption(format!(
                    "no {:?} with a {}-byte key",
                    algorithm, n
                )))
            }
        };
        sealed.map_err(|e| BenchError::Encryption(e.to_string()))
    }

    fn open_rustcrypto(&self, data: &[u8]) -> Result<Vec<u8>> {
        let key = self.key()?;
        let nonce = GenericArray::from_slice(&self.nonce);
        let opened = match (self.algorithm, key.len()) {
            (AeadAlgorithm::AesGcm, 16) => Aes128Gcm::new_from_slice(key)
                .map_err(|e| BenchError::Decryption(e.to_string()))?
                .decrypt(nonce, data),
            (AeadAlgorithm::AesGcm, 32) => Aes256Gcm::new_from_slice(key)
                .map_err(|e| BenchError::Decryption(e.to_string()))?
                .decrypt(nonce, data),
            (AeadAlgorithm::ChaCha20Poly1305, 32) => ChaCha20Poly1305::new_from_slice(key)
                .map_err(|e| BenchError::Decryption(e.to_string()))?
                .decrypt(nonce, data),
            (algorithm, n) => {
                return Err(BenchError::Decryption(format!(
                    "no {:?} with a {}-byte key",
                    algorithm, n
                )))
            }
        };
        opened.map_err(|e| BenchError::Decryption(e.to_string()))
    }
}

impl KeyGeneration for AEADWrapper {
    fn generate_key(&self) -> Result<Vec<u8>> {
        let mut key = vec![0u8; self.algorithm.default_key_size() / 8];
        rand::thread_rng().fill_bytes(&mut key);
        Ok(key)
    }
}

impl Encryption for AEADWrapper {
    fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self.provider {
            Provider::RustCrypto => self.seal_rustcrypto(data),
            Provider::Ring => {
                let key = self.ring_key()?;
                let mut in_out = data.to_vec();
                key.seal_in_place_append_tag(
                    Nonce::assume_unique_for_key(self.nonce),
                    Aad::empty(),
                    &mut in_out,
                )
                .map_err(|e| BenchError::Encryption(e.to_string()))?;
                Ok(in_out)
            }
        }
    }

    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self.provider {
            Provider::RustCrypto => self.open_rustcrypto(data),
            Provider::Ring => {
                let key = self.ring_key()?;
                let mut in_out = data.to_vec();
                let plaintext = key
                    .open_in_place(
                        Nonce::assume_unique_for_key(self.nonce),
                        Aad::empty(),
                        &mut in_out,
                    )
                    .map_err(|e| BenchError::Decryption(e.to_string()))?;
                Ok(plaintext.to_vec())
            }
        }
    }
}
