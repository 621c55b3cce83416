//! Fresh key material per algorithm.
//!
//! Symmetric and HMAC keys are raw random bytes. Asymmetric keys are
//! PKCS#8 PEM documents (unencrypted), which is what gets wrapped and stored.

use ed25519_dalek::pkcs8::EncodePrivateKey as _;
use rand_core::OsRng;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::types::Algorithm;

/// Fill `buf` from the operating system CSPRNG.
pub fn fill_random(buf: &mut [u8]) -> Result<(), CryptoError> {
    getrandom::getrandom(buf).map_err(|e| CryptoError::RngFailed(e.to_string()))
}

/// Generate `len` random bytes.
pub fn random_bytes(len: usize) -> Result<Vec<u8>, CryptoError> {
    let mut bytes = vec![0u8; len];
    fill_random(&mut bytes)?;
    Ok(bytes)
}

/// Generate fresh key material for `algorithm`.
///
/// The returned buffer is zeroized on drop.
pub fn generate_key(algorithm: Algorithm) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let pem = match algorithm {
        Algorithm::Aes128Gcm
        | Algorithm::Aes256Gcm
        | Algorithm::Aes256Cbc
        | Algorithm::ChaCha20Poly1305
        | Algorithm::Hmac256
        | Algorithm::Hmac512 => {
            let len = algorithm
                .symmetric_key_length()
                .ok_or_else(|| CryptoError::UnsupportedAlgorithm(algorithm.to_string()))?;
            return random_bytes(len).map(Zeroizing::new);
        }
        Algorithm::Rsa2048 | Algorithm::Rsa4096 | Algorithm::Rsa => {
            let bits = algorithm
                .rsa_bits()
                .ok_or_else(|| CryptoError::UnsupportedAlgorithm(algorithm.to_string()))?;
            let private = RsaPrivateKey::new(&mut OsRng, bits)
                .map_err(|e| CryptoError::KeyGeneration(format!("rsa generate: {e}")))?;
            private
                .to_pkcs8_pem(LineEnding::LF)
                .map_err(|e| CryptoError::KeyGeneration(format!("rsa encode: {e}")))?
        }
        Algorithm::Ecc256 => p256::ecdsa::SigningKey::random(&mut OsRng)
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyGeneration(format!("p256 encode: {e}")))?,
        Algorithm::Ecc384 => p384::ecdsa::SigningKey::random(&mut OsRng)
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyGeneration(format!("p384 encode: {e}")))?,
        Algorithm::Ed25519 => ed25519_dalek::SigningKey::generate(&mut OsRng)
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyGeneration(format!("ed25519 encode: {e}")))?,
    };

    Ok(Zeroizing::new(pem.as_bytes().to_vec()))
}
