use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::Aes256Gcm;
use hkdf::Hkdf;
use p256::{ecdh::diffie_hellman, elliptic_curve::sec1::ToEncodedPoint, PublicKey, SecretKey};
use rand::rngs::OsRng;
use sha2::Sha256;

use crate::{BenchError, Encryption, KeyGeneration, Result};

pub const ECIES_KEY_SIZE: usize = 256;
/// Uncompressed SEC1 point length on P-256.
pub const POINT_LEN: usize = 65;
const KDF_INFO: &[u8] = b"ecies-p256-aes256gcm";

/// ECIES over P-256: ephemeral ECDH, HKDF-SHA256, AES-256-GCM.
///
/// Ciphertext layout is the ephemeral public point followed by the sealed message.
pub struct ECCWrapper {
    private_key: Option<SecretKey>,
    public_key: Option<PublicKey>,
}

impl ECCWrapper {
    pub fn new() -> Self {
        Self {
            private_key: None,
            public_key: None,
        }
    }

    pub fn set_key(&mut self) -> Result<()> {
        let private_key = SecretKey::random(&mut OsRng);
        let public_key = private_key.public_key();

        self.private_key = Some(private_key);
        self.public_key = Some(public_key);
        Ok(())
    }

    fn message_cipher(shared_secret: &[u8], ephemeral_point: &[u8]) -> Result<Aes256Gcm> {
        let hkdf = Hkdf::<Sha256>::new(Some(ephemeral_point), shared_secret);
        let mut key = [0u8; 32];
        hkdf.expand(KDF_INFO, &mut key)
            .map_err(|e| BenchError::KeyGeneration(e.to_string()))?;
        Aes256Gcm::new_from_slice(&key).map_err(|e| BenchError::KeyGeneration(e.to_string()))
    }
}

impl Default for ECCWrapper {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyGeneration for ECCWrapper {
    fn generate_key(&self) -> Result<Vec<u8>> {
        if let Some(public_key) = &self.public_key {
            Ok(public_key.to_encoded_point(false).as_bytes().to_vec())
        } else {
            Err(BenchError::KeyGeneration("No key pair generated".to_string()))
        }
    }
}

impl Encryption for ECCWrapper {
    fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        let public_key = self
            .public_key
            .as_ref()
            .ok_or_else(|| BenchError::Encryption("No public key available".to_string()))?;

        let ephemeral_secret = SecretKey::random(&mut OsRng);
        let ephemeral_point = ephemeral_secret
            .public_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec();

        let shared_secret = diffie_hellman(ephemeral_secret.to_nonzero_scalar(), public_key.as_affine());
        let cipher = Self::message_cipher(shared_secret.raw_secret_bytes(), &ephemeral_point)?;

        // one derived key per message, zero nonce
        let nonce = GenericArray::from_slice(&[0u8; 12]);
        let sealed = cipher
            .encrypt(nonce, data)
            .map_err(|e| BenchError::Encryption(e.to_string()))?;

        let mut result = ephemeral_point;
        result.extend_from_slice(&sealed);
        Ok(result)
    }

    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        let private_key = self
            .private_key
            .as_ref()
            .ok_or_else(|| BenchError::Decryption("No private key available".to_string()))?;

        if data.len() <= POINT_LEN {
            return Err(BenchError::Decryption("Invalid ciphertext".to_string()));
        }

        let (point, sealed) = data.split_at(POINT_LEN);
        let ephemeral_public = PublicKey::from_sec1_bytes(point)
            .map_err(|e| BenchError::Decryption(e.to_string()))?;

        let shared_secret = diffie_hellman(private_key.to_nonzero_scalar(), ephemeral_public.as_affine());
        let cipher = Self::message_cipher(shared_secret.raw_secret_bytes(), point)?;

        let nonce = GenericArray::from_slice(&[0u8; 12]);
        cipher
            .decrypt(nonce, sealed)
            .map_err(|e| BenchError::Decryption(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_and_layout() {
        let mut ecc = ECCWrapper::new();
        ecc.set_key().unwrap();
        assert_eq!(ecc.generate_key().unwrap().len(), POINT_LEN);

        let message = [0x42u8; 126];
        let encrypted = ecc.encrypt(&message).unwrap();
        assert_eq!(encrypted.len(), POINT_LEN + message.len() + 16);
        assert_eq!(encrypted[0], 0x04);
        assert_eq!(ecc.decrypt(&encrypted).unwrap(), message);
    }

    #[test]
    fn ciphertexts_differ_per_message() {
        let mut ecc = ECCWrapper::new();
        ecc.set_key().unwrap();
        let a = ecc.encrypt(b"same").unwrap();
        let b = ecc.encrypt(b"same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails() {
        let mut alice = ECCWrapper::new();
        alice.set_key().unwrap();
        let mut mallory = ECCWrapper::new();
        mallory.set_key().unwrap();

        let encrypted = alice.encrypt(b"for alice only").unwrap();
        assert!(mallory.decrypt(&encrypted).is_err());
        assert!(alice.decrypt(&encrypted[..POINT_LEN]).is_err());
    }
}
