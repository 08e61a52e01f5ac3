use md5::Md5;
use ring::digest;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use sha3::{Sha3_256, Sha3_512};

use crate::provider::Provider;
use crate::{BenchError, Result, StreamingDigest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
    Sha3_256,
    Sha3_512,
}

impl DigestAlgorithm {
    pub const ALL: [DigestAlgorithm; 7] = [
        DigestAlgorithm::Md5,
        DigestAlgorithm::Sha1,
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sha384,
        DigestAlgorithm::Sha512,
        DigestAlgorithm::Sha3_256,
        DigestAlgorithm::Sha3_512,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA-1",
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
            Self::Sha3_256 => "SHA3-256",
            Self::Sha3_512 => "SHA3-512",
        }
    }

    /// Exact, case-sensitive lookup. "SHA1" is not an alias of "SHA-1".
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|algorithm| algorithm.id() == id)
    }

    pub fn providers(self) -> &'static [Provider] {
        match self {
            Self::Sha1 | Self::Sha256 | Self::Sha384 | Self::Sha512 => {
                &[Provider::RustCrypto, Provider::Ring]
            }
            // ring has no MD5 and no SHA-3
            Self::Md5 | Self::Sha3_256 | Self::Sha3_512 => &[Provider::RustCrypto],
        }
    }

    pub fn output_len(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha256 | Self::Sha3_256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 | Self::Sha3_512 => 64,
        }
    }
}

struct RustCryptoDigest<D>(D);

impl<D: Digest> StreamingDigest for RustCryptoDigest<D> {
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.0, data);
    }

    fn finish(self: Box<Self>) -> Vec<u8> {
        let Self(hasher) = *self;
        hasher.finalize().to_vec()
    }
}

struct RingDigest(digest::Context);

impl StreamingDigest for RingDigest {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finish(self: Box<Self>) -> Vec<u8> {
        let Self(context) = *self;
        context.finish().as_ref().to_vec()
    }
}

/// A fresh hasher for `algorithm` from `provider`.
pub fn new_digest(algorithm: DigestAlgorithm, provider: Provider) -> Result<Box<dyn StreamingDigest>> {
    let hasher: Box<dyn StreamingDigest> = match (provider, algorithm) {
        (Provider::RustCrypto, DigestAlgorithm::Md5) => Box::new(RustCryptoDigest(Md5::new())),
        (Provider::RustCrypto, DigestAlgorithm::Sha1) => Box::new(RustCryptoDigest(Sha1::new())),
        (Provider::RustCrypto, DigestAlgorithm::Sha256) => Box::new(RustCryptoDigest(Sha256::new())),
        (Provider::RustCrypto, DigestAlgorithm::Sha384) => Box::new(RustCryptoDigest(Sha384::new())),
        (Provider::RustCrypto, DigestAlgorithm::Sha512) => Box::new(RustCryptoDigest(Sha512::new())),
        (Provider::RustCrypto, DigestAlgorithm::Sha3_256) => {
            Box::new(RustCryptoDigest(Sha3_256::new()))
        }
        (Provider::RustCrypto, DigestAlgorithm::Sha3_512) => {
            Box::new(RustCryptoDigest(Sha3_512::new()))
        }
        (Provider::Ring, DigestAlgorithm::Sha1) => {
            Box::new(RingDigest(digest::Context::new(&digest::SHA1_FOR_LEGACY_USE_ONLY)))
        }
        (Provider::Ring, DigestAlgorithm::Sha256) => {
            Box::new(RingDigest(digest::Context::new(&digest::SHA256)))
        }
        (Provider::Ring, DigestAlgorithm::Sha384) => {
            Box::new(RingDigest(digest::Context::new(&digest::SHA384)))
        }
        (Provider::Ring, DigestAlgorithm::Sha512) => {
            Box::new(RingDigest(digest::Context::new(&digest::SHA512)))
        }
        (provider, algorithm) => {
            return Err(BenchError::Configuration(format!(
                "{} is not provided by {}",
                algorithm.id(),
                provider
            )))
        }
    };
    Ok(hasher)
}

/// One-shot digest of `data`.
pub fn digest_bytes(algorithm: DigestAlgorithm, provider: Provider, data: &[u8]) -> Result<Vec<u8>> {
    let mut hasher = new_digest(algorithm, provider)?;
    hasher.update(data);
    Ok(hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    #[test]
    fn known_answers() {
        assert_eq!(
            hex(&digest_bytes(DigestAlgorithm::Sha256, Provider::RustCrypto, b"abc").unwrap()),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            hex(&digest_bytes(DigestAlgorithm::Sha1, Provider::Ring, b"abc").unwrap()),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            hex(&digest_bytes(DigestAlgorithm::Sha1, Provider::RustCrypto, b"abc").unwrap()),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            hex(&digest_bytes(DigestAlgorithm::Md5, Provider::RustCrypto, b"abc").unwrap()),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(
            hex(&digest_bytes(DigestAlgorithm::Sha3_256, Provider::RustCrypto, b"abc").unwrap()),
            "3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532"
        );
    }

    #[test]
    fn providers_agree() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        for algorithm in [
            DigestAlgorithm::Sha1,
            DigestAlgorithm::Sha256,
            DigestAlgorithm::Sha384,
            DigestAlgorithm::Sha512,
        ] {
            let rc = digest_bytes(algorithm, Provider::RustCrypto, &data).unwrap();
            let ring = digest_bytes(algorithm, Provider::Ring, &data).unwrap();
            assert_eq!(rc, ring);
            assert_eq!(rc.len(), algorithm.output_len());
        }
    }

    #[test]
    fn names_are_exact() {
        assert_eq!(DigestAlgorithm::from_id("SHA-1"), Some(DigestAlgorithm::Sha1));
        assert_eq!(DigestAlgorithm::from_id("MD5"), Some(DigestAlgorithm::Md5));
        assert_eq!(DigestAlgorithm::from_id("SHA1"), None);
        assert_eq!(DigestAlgorithm::from_id("md5"), None);
        assert_eq!(DigestAlgorithm::from_id("sha-256"), None);
        assert!(new_digest(DigestAlgorithm::Md5, Provider::Ring).is_err());
    }
}
