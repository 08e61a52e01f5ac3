use rand::rngs::OsRng;
use rsa::{traits::PublicKeyParts, Oaep, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha512};

use crate::{BenchError, Encryption, KeyGeneration, Result};

pub const MIN_RSA_KEY_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsaPadding {
    Pkcs1v15,
    OaepSha1,
    OaepSha224,
    OaepSha256,
    OaepSha512,
}

impl RsaPadding {
    pub const ALL: [RsaPadding; 5] = [
        RsaPadding::Pkcs1v15,
        RsaPadding::OaepSha1,
        RsaPadding::OaepSha224,
        RsaPadding::OaepSha256,
        RsaPadding::OaepSha512,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Pkcs1v15 => "RSA/ECB/PKCS1Padding",
            Self::OaepSha1 => "RSA/ECB/OAEPWithSHA1AndMGF1Padding",
            Self::OaepSha224 => "RSA/ECB/OAEPWithSHA-224AndMGF1Padding",
            Self::OaepSha256 => "RSA/ECB/OAEPWithSHA-256AndMGF1Padding",
            Self::OaepSha512 => "RSA/ECB/OAEPWithSHA-512AndMGF1Padding",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|padding| padding.id() == id)
    }

    /// Bytes of each block taken by the padding scheme.
    pub fn overhead(self) -> usize {
        match self {
            Self::Pkcs1v15 => 11,
            Self::OaepSha1 => 2 * 20 + 2,
            Self::OaepSha224 => 2 * 28 + 2,
            Self::OaepSha256 => 2 * 32 + 2,
            Self::OaepSha512 => 2 * 64 + 2,
        }
    }

    /// Largest message one block of a `key_bits` modulus can carry.
    pub fn capacity(self, key_bits: usize) -> Option<usize> {
        (key_bits / 8)
            .checked_sub(self.overhead())
            .filter(|capacity| *capacity > 0)
    }
}

pub struct RSAWrapper {
    padding: RsaPadding,
    private_key: Option<RsaPrivateKey>,
    public_key: Option<RsaPublicKey>,
}

impl RSAWrapper {
    pub fn new(padding: RsaPadding) -> Self {
        Self {
            padding,
            private_key: None,
            public_key: None,
        }
    }

    pub fn set_key(&mut self, bits: usize) -> Result<()> {
        if bits < MIN_RSA_KEY_SIZE {
            return Err(BenchError::KeyGeneration(format!(
                "RSA keys below {} bits are not supported",
                MIN_RSA_KEY_SIZE
            )));
        }
        let mut rng = OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| BenchError::KeyGeneration(e.to_string()))?;
        let public_key = RsaPublicKey::from(&private_key);

        self.private_key = Some(private_key);
        self.public_key = Some(public_key);
        Ok(())
    }

    pub fn padding(&self) -> RsaPadding {
        self.padding
    }

    /// Plaintext bytes per block for the current key.
    pub fn max_message_len(&self) -> Result<usize> {
        let public_key = self
            .public_key
            .as_ref()
            .ok_or_else(|| BenchError::KeyGeneration("No key pair generated".to_string()))?;
        self.padding
            .capacity(public_key.size() * 8)
            .ok_or_else(|| {
                BenchError::KeyGeneration(format!(
                    "{}-bit key is too small for {}",
                    public_key.size() * 8,
                    self.padding.id()
                ))
            })
    }
}

impl KeyGeneration for RSAWrapper {
    fn generate_key(&self) -> Result<Vec<u8>> {
        // the modulus stands in for the key
        if let Some(public_key) = &self.public_key {
            Ok(public_key.n().to_bytes_be())
        } else {
            Err(BenchError::KeyGeneration("No key pair generated".to_string()))
        }
    }
}

impl Encryption for RSAWrapper {
    fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        let public_key = self
            .public_key
            .as_ref()
            .ok_or_else(|| BenchError::Encryption("No public key available".to_string()))?;

        let mut rng = OsRng;
        let encrypted = match self.padding {
            RsaPadding::Pkcs1v15 => public_key.encrypt(&mut rng, Pkcs1v15Encrypt, data),
            RsaPadding::OaepSha1 => public_key.encrypt(&mut rng, Oaep::new::<Sha1>(), data),
            RsaPadding::OaepSha224 => public_key.encrypt(&mut rng, Oaep::new::<Sha224>(), data),
            RsaPadding::OaepSha256 => public_key.encrypt(&mut rng, Oaep::new::<Sha256>(), data),
            RsaPadding::OaepSha512 => public_key.encrypt(&mut rng, Oaep::new::<Sha512>(), data),
        };
        encrypted.map_err(|e| BenchError::Encryption(e.to_string()))
    }

    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        let private_key = self
            .private_key
            .as_ref()
            .ok_or_else(|| BenchError::Decryption("No private key available".to_string()))?;

        let decrypted = match self.padding {
            RsaPadding::Pkcs1v15 => private_key.decrypt(Pkcs1v15Encrypt, data),
            RsaPadding::OaepSha1 => private_key.decrypt(Oaep::new::<Sha1>(), data),
            RsaPadding::OaepSha224 => private_key.decrypt(Oaep::new::<Sha224>(), data),
            RsaPadding::OaepSha256 => private_key.decrypt(Oaep::new::<Sha256>(), data),
            RsaPadding::OaepSha512 => private_key.decrypt(Oaep::new::<Sha512>(), data),
        };
        decrypted.map_err(|e| BenchError::Decryption(e.to_string()))
    }
}
