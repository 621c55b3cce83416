use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CryptoError;

/// GCM / ChaCha20-Poly1305 nonce length in bytes (96 bits per NIST recommendation).
pub const AEAD_NONCE_LENGTH: usize = 12;

/// GCM / Poly1305 tag length in bytes (128 bits).
pub const AEAD_TAG_LENGTH: usize = 16;

/// AES block size, also the CBC IV length.
pub const AES_BLOCK_LENGTH: usize = 16;

/// Master key length in bytes (AES-256).
pub const MASTER_KEY_LENGTH: usize = 32;

/// Minimum wrapped-key size: nonce + tag with an empty payload.
pub const WRAPPED_KEY_MIN_LENGTH: usize = AEAD_NONCE_LENGTH + AEAD_TAG_LENGTH;

/// Closed set of supported key algorithms.
///
/// The external tag strings are stable and are what records persist.
/// `Rsa` is the legacy alias of `Rsa2048` and keeps its own tag so old
/// records round-trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Aes128Gcm,
    Aes256Gcm,
    Aes256Cbc,
    ChaCha20Poly1305,
    Rsa2048,
    Rsa4096,
    Ecc256,
    Ecc384,
    Ed25519,
    Hmac256,
    Hmac512,
    Rsa,
}

/// How an algorithm's `seal` output relates to its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmFamily {
    /// Authenticated encryption (GCM, ChaCha20-Poly1305).
    Aead,
    /// Unauthenticated AES-CBC with PKCS#7 padding.
    BlockCbc,
    /// Plaintext with an attached HMAC.
    Mac,
    /// RSA-OAEP encryption.
    AsymmetricEncrypt,
    /// Plaintext with an attached signature.
    AsymmetricSign,
}

impl Algorithm {
    /// Every supported tag, including the legacy `RSA` alias.
    pub const ALL: [Algorithm; 12] = [
        Self::Aes128Gcm,
        Self::Aes256Gcm,
        Self::Aes256Cbc,
        Self::ChaCha20Poly1305,
        Self::Rsa2048,
        Self::Rsa4096,
        Self::Ecc256,
        Self::Ecc384,
        Self::Ed25519,
        Self::Hmac256,
        Self::Hmac512,
        Self::Rsa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aes128Gcm => "AES128GCM",
            Self::Aes256Gcm => "AES256GCM",
            Self::Aes256Cbc => "AES256CBC",
            Self::ChaCha20Poly1305 => "ChaCha20Poly1305",
            Self::Rsa2048 => "RSA2048",
            Self::Rsa4096 => "RSA4096",
            Self::Ecc256 => "ECC256",
            Self::Ecc384 => "ECC384",
            Self::Ed25519 => "Ed25519",
            Self::Hmac256 => "HMAC256",
            Self::Hmac512 => "HMAC512",
            Self::Rsa => "RSA",
        }
    }

    pub fn family(&self) -> AlgorithmFamily {
        match self {
            Self::Aes128Gcm | Self::Aes256Gcm | Self::ChaCha20Poly1305 => AlgorithmFamily::Aead,
            Self::Aes256Cbc => AlgorithmFamily::BlockCbc,
            Self::Hmac256 | Self::Hmac512 => AlgorithmFamily::Mac,
            Self::Rsa2048 | Self::Rsa4096 | Self::Rsa => AlgorithmFamily::AsymmetricEncrypt,
            Self::Ecc256 | Self::Ecc384 | Self::Ed25519 => AlgorithmFamily::AsymmetricSign,
        }
    }

    /// Raw key length for symmetric and HMAC algorithms.
    ///
    /// `None` for asymmetric algorithms, whose material is a PKCS#8 PEM
    /// document of variable length.
    pub fn symmetric_key_length(&self) -> Option<usize> {
        match self {
            Self::Aes128Gcm => Some(16),
            Self::Aes256Gcm | Self::Aes256Cbc | Self::ChaCha20Poly1305 | Self::Hmac256 => {
                Some(32)
            }
            Self::Hmac512 => Some(64),
            Self::Rsa2048
            | Self::Rsa4096
            | Self::Rsa
            | Self::Ecc256
            | Self::Ecc384
            | Self::Ed25519 => None,
        }
    }

    /// RSA modulus size in bits, for RSA algorithms only.
    pub fn rsa_bits(&self) -> Option<usize> {
        match self {
            Self::Rsa2048 | Self::Rsa => Some(2048),
            Self::Rsa4096 => Some(4096),
            _ => None,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| CryptoError::UnsupportedAlgorithm(s.to_string()))
    }
}

impl Serialize for Algorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Algorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}
