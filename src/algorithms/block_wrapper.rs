use aes::{Aes128, Aes192, Aes256};
use cipher::{block_padding::{Pkcs7, UnpadError}, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use des::{TdesEde2, TdesEde3};
use rand::RngCore;
use rc2::Rc2;

use crate::{BenchError, Encryption, KeyGeneration, Result};

type CbcEnc<C> = cbc::Encryptor<C>;
type CbcDec<C> = cbc::Decryptor<C>;
type CfbEnc<C> = cfb_mode::Encryptor<C>;
type CfbDec<C> = cfb_mode::Decryptor<C>;

/// Padding suffix shared by every block transformation id.
pub const PADDING: &str = "PKCS5Padding";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockAlgorithm {
    Aes,
    /// Triple DES, encrypt-decrypt-encrypt.
    DesEde,
    Rc2,
}

impl BlockAlgorithm {
    pub const ALL: [BlockAlgorithm; 3] = [Self::DesEde, Self::Aes, Self::Rc2];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Aes => "AES",
            Self::DesEde => "DESede",
            Self::Rc2 => "RC2",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    pub const fn block_size(self) -> usize {
        match self {
            Self::Aes => 16,
            Self::DesEde | Self::Rc2 => 8,
        }
    }

    pub const fn key_sizes(self) -> &'static [usize] {
        match self {
            Self::Aes => &[128, 192, 256],
            // two-key and three-key triple DES, counted without parity bits
            Self::DesEde => &[112, 168],
            Self::Rc2 => &[128],
        }
    }

    pub const fn default_key_size(self) -> usize {
        match self {
            Self::Aes | Self::Rc2 => 128,
            Self::DesEde => 168,
        }
    }

    /// Key material length in bytes for a nominal key size.
    pub const fn key_len(self, key_bits: usize) -> usize {
        match (self, key_bits) {
            (Self::DesEde, 112) => 16,
            (Self::DesEde, 168) => 24,
            _ => key_bits / 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockMode {
    Cbc,
    Cfb,
}

impl BlockMode {
    pub const ALL: [BlockMode; 2] = [Self::Cbc, Self::Cfb];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Cbc => "CBC",
            Self::Cfb => "CFB",
        }
    }
}

/// Splits `"<cipher>/<mode>/PKCS5Padding"` into its cipher and mode.
pub fn parse_transformation(id: &str) -> Option<(BlockAlgorithm, BlockMode)> {
    let mut parts = id.split('/');
    let algorithm = BlockAlgorithm::from_name(parts.next()?)?;
    let mode_name = parts.next()?;
    let mode = BlockMode::ALL.into_iter().find(|m| m.name() == mode_name)?;
    match (parts.next(), parts.next()) {
        (Some(PADDING), None) => Some((algorithm, mode)),
        _ => None,
    }
}

fn seal<M: KeyIvInit + BlockEncryptMut>(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let cipher = M::new_from_slices(key, iv).map_err(|e| BenchError::Encryption(e.to_string()))?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(data))
}

fn open<M: KeyIvInit + BlockDecryptMut>(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let cipher = M::new_from_slices(key, iv).map_err(|e| BenchError::Decryption(e.to_string()))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(data)
        .map_err(|_: UnpadError| BenchError::Decryption("invalid PKCS#7 padding".to_string()))
}

// Picks the concrete cipher type from the algorithm and key length.
macro_rules! dispatch {
    ($op:ident, $Mode:ident, $err:path, $algorithm:expr, $key:expr, $iv:expr, $data:expr) => {
        match ($algorithm, $key.len()) {
            (BlockAlgorithm::Aes, 16) => $op::<$Mode<Aes128>>($key, $iv, $data),
            (BlockAlgorithm::Aes, 24) => $op::<$Mode<Aes192>>($key, $iv, $data),
            (BlockAlgorithm::Aes, 32) => $op::<$Mode<Aes256>>($key, $iv, $data),
            (BlockAlgorithm::DesEde, 16) => $op::<$Mode<TdesEde2>>($key, $iv, $data),
            (BlockAlgorithm::DesEde, 24) => $op::<$Mode<TdesEde3>>($key, $iv, $data),
            (BlockAlgorithm::Rc2, 16) => $op::<$Mode<Rc2>>($key, $iv, $data),
            (algorithm, n) => Err($err(format!(
                "unsupported {} key length {}",
                algorithm.name(),
                n
            ))),
        }
    };
}

/// A block cipher in CBC or CFB mode with PKCS#7 padding.
pub struct BlockCipherWrapper {
    algorithm: BlockAlgorithm,
    mode: BlockMode,
    key_bits: usize,
    key: Option<Vec<u8>>,
    iv: Vec<u8>,
}

impl BlockCipherWrapper {
    pub fn new(algorithm: BlockAlgorithm, mode: BlockMode, key_bits: usize) -> Result<Self> {
        if !algorithm.key_sizes().contains(&key_bits) {
            return Err(BenchError::KeyGeneration(format!(
                "{} has no {}-bit key size",
                algorithm.name(),
                key_bits
            )));
        }
        let mut iv = vec![0u8; algorithm.block_size()];
        rand::thread_rng().fill_bytes(&mut iv);
        Ok(Self {
            algorithm,
            mode,
            key_bits,
            key: None,
            iv,
        })
    }

    /// Builds a wrapper with a freshly generated key.
    pub fn with_random_key(
        algorithm: BlockAlgorithm,
        mode: BlockMode,
        key_bits: usize,
    ) -> Result<Self> {
        let mut wrapper = Self::new(algorithm, mode, key_bits)?;
        let key = wrapper.generate_key()?;
        wrapper.set_key(key)?;
        Ok(wrapper)
    }

    pub fn set_key(&mut self, key: Vec<u8>) -> Result<()> {
        let expected = self.algorithm.key_len(self.key_bits);
        if key.len() != expected {
            return Err(BenchError::KeyGeneration(format!(
                "expected a {}-byte {} key, got {} bytes",
                expected,
                self.algorithm.name(),
                key.len()
            )));
        }
        self.key = Some(key);
        Ok(())
    }
}

impl KeyGeneration for BlockCipherWrapper {
    fn generate_key(&self) -> Result<Vec<u8>> {
        let mut key = vec![0u8; self.algorithm.key_len(self.key_bits)];
        rand::thread_rng().fill_bytes(&mut key);
        Ok(key)
    }
}

impl Encryption for BlockCipherWrapper {
    fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        let key = self
            .key
            .as_deref()
            .ok_or_else(|| BenchError::Encryption("No key set".to_string()))?;
        match self.mode {
            BlockMode::Cbc => {
                dispatch!(seal, CbcEnc, BenchError::Encryption, self.algorithm, key, &self.iv, data)
            }
            BlockMode::Cfb => {
                dispatch!(seal, CfbEnc, BenchError::Encryption, self.algorithm, key, &self.iv, data)
            }
        }
    }

    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        let key = self
            .key
            .as_deref()
            .ok_or_else(|| BenchError::Decryption("No key set".to_string()))?;
        match self.mode {
            BlockMode::Cbc => {
                dispatch!(open, CbcDec, BenchError::Decryption, self.algorithm, key, &self.iv, data)
            }
            BlockMode::Cfb => {
                dispatch!(open, CfbDec, BenchError::Decryption, self.algorithm, key, &self.iv, data)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_every_cipher_mode_and_key_size() {
        let message = b"seventeen bytes!!";
        for algorithm in BlockAlgorithm::ALL {
            for mode in BlockMode::ALL {
                for &bits in algorithm.key_sizes() {
                    let cipher = BlockCipherWrapper::with_random_key(algorithm, mode, bits).unwrap();
                    let encrypted = cipher.encrypt(message).unwrap();
                    let block = algorithm.block_size();
                    // PKCS#7 always adds at least one byte, up to a whole block
                    assert_eq!(encrypted.len(), (message.len() / block + 1) * block);
                    assert_eq!(cipher.decrypt(&encrypted).unwrap(), message);
                }
            }
        }
    }

    #[test]
    fn parses_transformation_ids() {
        assert_eq!(
            parse_transformation("DESede/CBC/PKCS5Padding"),
            Some((BlockAlgorithm::DesEde, BlockMode::Cbc))
        );
        assert_eq!(
            parse_transformation("RC2/CFB/PKCS5Padding"),
            Some((BlockAlgorithm::Rc2, BlockMode::Cfb))
        );
        assert_eq!(parse_transformation("AES/GCM/NoPadding"), None);
        assert_eq!(parse_transformation("AES/CBC/NoPadding"), None);
        assert_eq!(parse_transformation("DES/CBC/PKCS5Padding"), None);
        assert_eq!(parse_transformation("AES/CBC/PKCS5Padding/extra"), None);
    }

    #[test]
    fn triple_des_key_material() {
        assert_eq!(BlockAlgorithm::DesEde.key_len(112), 16);
        assert_eq!(BlockAlgorithm::DesEde.key_len(168), 24);
        let cipher = BlockCipherWrapper::new(BlockAlgorithm::DesEde, BlockMode::Cbc, 168).unwrap();
        assert_eq!(cipher.generate_key().unwrap().len(), 24);
    }

    #[test]
    fn rejects_bad_sizes() {
        assert!(BlockCipherWrapper::new(BlockAlgorithm::Aes, BlockMode::Cbc, 100).is_err());
        assert!(BlockCipherWrapper::new(BlockAlgorithm::DesEde, BlockMode::Cfb, 192).is_err());
        let mut aes = BlockCipherWrapper::new(BlockAlgorithm::Aes, BlockMode::Cbc, 256).unwrap();
        assert!(aes.set_key(vec![0u8; 16]).is_err());
        assert!(aes.encrypt(b"no key").is_err());
    }
}
