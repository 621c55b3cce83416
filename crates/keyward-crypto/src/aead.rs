//! AEAD primitives: AES-GCM and ChaCha20-Poly1305.
//!
//! GCM wire format (also used by the master-key wrapper):
//! [12 bytes: nonce][16 bytes: tag][N bytes: ciphertext]
//!
//! ChaCha20-Poly1305 wire format:
//! [12 bytes: nonce][N bytes: ciphertext + tag]
//!
//! No associated data is bound in either format.

use aes_gcm::aead::consts::{U12, U16};
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, AeadInPlace, KeyInit};
use chacha20poly1305::ChaCha20Poly1305;

use crate::error::CryptoError;
use crate::generate::fill_random;
use crate::types::{AEAD_NONCE_LENGTH, AEAD_TAG_LENGTH};

/// Generate a random 12-byte nonce.
pub fn generate_nonce() -> Result<[u8; AEAD_NONCE_LENGTH], CryptoError> {
    let mut nonce = [0u8; AEAD_NONCE_LENGTH];
    fill_random(&mut nonce)?;
    Ok(nonce)
}

fn cipher_for<C: KeyInit>(key: &[u8]) -> Result<C, CryptoError> {
    C::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
        expected: C::key_size(),
        got: key.len(),
    })
}

/// Encrypt with an AES-GCM variant, writing `nonce || tag || ciphertext`.
pub fn gcm_seal<C>(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>
where
    C: KeyInit + AeadInPlace<NonceSize = U12, TagSize = U16>,
{
    let cipher: C = cipher_for(key)?;
    let nonce = generate_nonce()?;

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(&nonce), b"", &mut buffer)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut result = Vec::with_capacity(AEAD_NONCE_LENGTH + AEAD_TAG_LENGTH + buffer.len());
    result.extend_from_slice(&nonce);
    result.extend_from_slice(&tag);
    result.extend_from_slice(&buffer);
    Ok(result)
}

/// Decrypt an AES-GCM `nonce || tag || ciphertext` frame.
pub fn gcm_open<C>(key: &[u8], sealed: &[u8]) -> Result<Vec<u8>, CryptoError>
where
    C: KeyInit + AeadInPlace<NonceSize = U12, TagSize = U16>,
{
    let min_length = AEAD_NONCE_LENGTH + AEAD_TAG_LENGTH;
    if sealed.len() < min_length {
        return Err(CryptoError::MalformedInput(format!(
            "GCM frame too short: {} bytes, need at least {}",
            sealed.len(),
            min_length
        )));
    }
    let cipher: C = cipher_for(key)?;

    let nonce = &sealed[..AEAD_NONCE_LENGTH];
    let tag = &sealed[AEAD_NONCE_LENGTH..min_length];
    let mut buffer = sealed[min_length..].to_vec();

    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(nonce),
            b"",
            &mut buffer,
            GenericArray::from_slice(tag),
        )
        .map_err(|_| CryptoError::Integrity("GCM authentication failed".into()))?;
    Ok(buffer)
}

/// Encrypt with ChaCha20-Poly1305, writing `nonce || ciphertext+tag`.
pub fn chacha_seal(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher: ChaCha20Poly1305 = cipher_for(key)?;
    let nonce = generate_nonce()?;

    let ciphertext = cipher
        .encrypt(GenericArray::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut result = Vec::with_capacity(AEAD_NONCE_LENGTH + ciphertext.len());
    result.extend_from_slice(&nonce);
    result.extend_from_slice(&ciphertext);
    Ok(result)
}

/// Decrypt a ChaCha20-Poly1305 `nonce || ciphertext+tag` frame.
pub fn chacha_open(key: &[u8], sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let min_length = AEAD_NONCE_LENGTH + AEAD_TAG_LENGTH;
    if sealed.len() < min_length {
        return Err(CryptoError::MalformedInput(format!(
            "ChaCha20-Poly1305 frame too short: {} bytes, need at least {}",
            sealed.len(),
            min_length
        )));
    }
    let cipher: ChaCha20Poly1305 = cipher_for(key)?;

    let nonce = &sealed[..AEAD_NONCE_LENGTH];
    cipher
        .decrypt(GenericArray::from_slice(nonce), &sealed[AEAD_NONCE_LENGTH..])
        .map_err(|_| CryptoError::Integrity("Poly1305 authentication failed".into()))
}
