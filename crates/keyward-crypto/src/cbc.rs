//! AES-256-CBC with PKCS#7 padding.
//!
//! Wire format: [16 bytes: IV][N*16 bytes: ciphertext]
//!
//! CBC is unauthenticated. A corrupted frame usually fails the padding
//! check, but corruption that leaves valid padding decrypts to garbage.

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::error::CryptoError;
use crate::generate::fill_random;
use crate::types::AES_BLOCK_LENGTH;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

const AES256_KEY_LENGTH: usize = 32;

fn check_key(key: &[u8]) -> Result<(), CryptoError> {
    if key.len() != AES256_KEY_LENGTH {
        return Err(CryptoError::InvalidKeyLength {
            expected: AES256_KEY_LENGTH,
            got: key.len(),
        });
    }
    Ok(())
}

/// Pad and encrypt under a fresh random IV.
pub fn cbc_seal(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    check_key(key)?;
    let mut iv = [0u8; AES_BLOCK_LENGTH];
    fill_random(&mut iv)?;

    let cipher = Aes256CbcEnc::new_from_slices(key, &iv)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut result = Vec::with_capacity(AES_BLOCK_LENGTH + ciphertext.len());
    result.extend_from_slice(&iv);
    result.extend_from_slice(&ciphertext);
    Ok(result)
}

/// Decrypt and strip PKCS#7 padding.
pub fn cbc_open(key: &[u8], sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
    check_key(key)?;
    if sealed.len() < 2 * AES_BLOCK_LENGTH {
        return Err(CryptoError::MalformedInput(format!(
            "CBC frame too short: {} bytes, need IV and at least one block",
            sealed.len()
        )));
    }
    if sealed.len() % AES_BLOCK_LENGTH != 0 {
        return Err(CryptoError::MalformedInput(format!(
            "CBC ciphertext is not a whole number of blocks: {} bytes",
            sealed.len() - AES_BLOCK_LENGTH
        )));
    }

    let (iv, ciphertext) = sealed.split_at(AES_BLOCK_LENGTH);
    let cipher = Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|e| CryptoError::MalformedInput(e.to_string()))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::Padding)
}
