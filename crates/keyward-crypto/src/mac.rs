//! HMAC-SHA256 / HMAC-SHA512 authentication tags.
//!
//! A MAC "seal" leaves the plaintext readable and attaches the tag:
//! `[plaintext]|HMAC|[len:2][tag]`.

use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha512};

use crate::error::CryptoError;
use crate::frame::{attach_proof, split_proof, HMAC_MARKER};

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

/// Which hash backs the HMAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacHash {
    Sha256,
    Sha512,
}

impl MacHash {
    /// Tag length in bytes.
    pub fn tag_length(&self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }
}

/// Compute the raw HMAC tag over `message`.
pub fn hmac_tag(hash: MacHash, key: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let tag = match hash {
        MacHash::Sha256 => {
            let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
                .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
            mac.update(message);
            mac.finalize().into_bytes().to_vec()
        }
        MacHash::Sha512 => {
            let mut mac = <HmacSha512 as Mac>::new_from_slice(key)
                .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
            mac.update(message);
            mac.finalize().into_bytes().to_vec()
        }
    };
    Ok(tag)
}

/// Check `tag` against `message` in constant time.
pub fn hmac_verify(
    hash: MacHash,
    key: &[u8],
    message: &[u8],
    tag: &[u8],
) -> Result<(), CryptoError> {
    let verified = match hash {
        MacHash::Sha256 => {
            let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
                .map_err(|e| CryptoError::MalformedInput(e.to_string()))?;
            mac.update(message);
            mac.verify_slice(tag)
        }
        MacHash::Sha512 => {
            let mut mac = <HmacSha512 as Mac>::new_from_slice(key)
                .map_err(|e| CryptoError::MalformedInput(e.to_string()))?;
            mac.update(message);
            mac.verify_slice(tag)
        }
    };
    verified.map_err(|_| CryptoError::Integrity("HMAC verification failed".into()))
}

/// Attach an HMAC tag to `plaintext`.
pub fn mac_seal(hash: MacHash, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let tag = hmac_tag(hash, key, plaintext)?;
    attach_proof(plaintext, HMAC_MARKER, &tag)
}

/// Verify an attached HMAC tag and return the original plaintext.
pub fn mac_open(hash: MacHash, key: &[u8], sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let (plaintext, tag) = split_proof(sealed, HMAC_MARKER, hash.tag_length())?;
    hmac_verify(hash, key, plaintext, tag)?;
    Ok(plaintext.to_vec())
}
