//! Polymorphic seal/open over every supported algorithm.
//!
//! | family            | seal output                               |
//! |-------------------|-------------------------------------------|
//! | AES-GCM           | `nonce(12) || tag(16) || ciphertext`      |
//! | ChaCha20-Poly1305 | `nonce(12) || ciphertext+tag`             |
//! | AES-256-CBC       | `iv(16) || ciphertext`                    |
//! | HMAC              | `plaintext || |HMAC| || len(2) || mac`    |
//! | RSA-OAEP          | raw ciphertext                            |
//! | ECDSA / Ed25519   | `plaintext || marker || len(2) || sig`    |

use aes_gcm::{Aes128Gcm, Aes256Gcm};

use crate::aead::{chacha_open, chacha_seal, gcm_open, gcm_seal};
use crate::cbc::{cbc_open, cbc_seal};
use crate::error::CryptoError;
use crate::mac::{mac_open, mac_seal, MacHash};
use crate::rsa_oaep::{rsa_open, rsa_seal};
use crate::signing::{sign_open, sign_seal, SignatureScheme};
use crate::types::Algorithm;

fn check_symmetric_key(algorithm: Algorithm, key: &[u8]) -> Result<(), CryptoError> {
    match algorithm.symmetric_key_length() {
        Some(expected) if expected != key.len() => Err(CryptoError::InvalidKeyMaterial {
            algorithm: algorithm.as_str(),
            reason: format!("expected {} key bytes, got {}", expected, key.len()),
        }),
        _ => Ok(()),
    }
}

/// Seal `plaintext` under `key` according to `algorithm`.
///
/// For AEAD, CBC and RSA this is encryption. For HMAC and signature
/// algorithms the plaintext stays readable and a proof is attached.
pub fn seal(algorithm: Algorithm, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    check_symmetric_key(algorithm, key)?;
    match algorithm {
        Algorithm::Aes128Gcm => gcm_seal::<Aes128Gcm>(key, plaintext),
        Algorithm::Aes256Gcm => gcm_seal::<Aes256Gcm>(key, plaintext),
        Algorithm::ChaCha20Poly1305 => chacha_seal(key, plaintext),
        Algorithm::Aes256Cbc => cbc_seal(key, plaintext),
        Algorithm::Hmac256 => mac_seal(MacHash::Sha256, key, plaintext),
        Algorithm::Hmac512 => mac_seal(MacHash::Sha512, key, plaintext),
        Algorithm::Rsa2048 | Algorithm::Rsa4096 | Algorithm::Rsa => rsa_seal(key, plaintext),
        Algorithm::Ecc256 => sign_seal(SignatureScheme::EcdsaP256, key, plaintext),
        Algorithm::Ecc384 => sign_seal(SignatureScheme::EcdsaP384, key, plaintext),
        Algorithm::Ed25519 => sign_seal(SignatureScheme::Ed25519, key, plaintext),
    }
}

/// Reverse [`seal`]: decrypt, or verify the attached proof, and return the
/// original plaintext.
pub fn open(algorithm: Algorithm, key: &[u8], sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
    check_symmetric_key(algorithm, key)?;
    match algorithm {
        Algorithm::Aes128Gcm => gcm_open::<Aes128Gcm>(key, sealed),
        Algorithm::Aes256Gcm => gcm_open::<Aes256Gcm>(key, sealed),
        Algorithm::ChaCha20Poly1305 => chacha_open(key, sealed),
        Algorithm::Aes256Cbc => cbc_open(key, sealed),
        Algorithm::Hmac256 => mac_open(MacHash::Sha256, key, sealed),
        Algorithm::Hmac512 => mac_open(MacHash::Sha512, key, sealed),
        Algorithm::Rsa2048 | Algorithm::Rsa4096 | Algorithm::Rsa => rsa_open(key, sealed),
        Algorithm::Ecc256 => sign_open(SignatureScheme::EcdsaP256, key, sealed),
        Algorithm::Ecc384 => sign_open(SignatureScheme::EcdsaP384, key, sealed),
        Algorithm::Ed25519 => sign_open(SignatureScheme::Ed25519, key, sealed),
    }
}
