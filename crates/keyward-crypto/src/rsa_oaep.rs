//! RSA-OAEP (SHA-256, MGF1-SHA-256) encryption with PKCS#8 PEM private keys.
//!
//! Wire format: raw OAEP ciphertext (modulus-sized).

use rand_core::OsRng;
use rsa::pkcs8::DecodePrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::error::CryptoError;

/// SHA-256 OAEP overhead: 2 * hash length + 2.
const OAEP_SHA256_OVERHEAD: usize = 2 * 32 + 2;

fn load_private_key(pem: &[u8]) -> Result<RsaPrivateKey, CryptoError> {
    let text = std::str::from_utf8(pem).map_err(|_| CryptoError::InvalidKeyMaterial {
        algorithm: "RSA",
        reason: "key is not UTF-8 PEM".into(),
    })?;
    RsaPrivateKey::from_pkcs8_pem(text).map_err(|e| CryptoError::InvalidKeyMaterial {
        algorithm: "RSA",
        reason: e.to_string(),
    })
}

/// Largest plaintext OAEP-SHA256 can carry for this key.
pub fn max_plaintext_length(public: &RsaPublicKey) -> usize {
    public.size().saturating_sub(OAEP_SHA256_OVERHEAD)
}

/// Encrypt under the public half of the stored private key.
pub fn rsa_seal(private_pem: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let private = load_private_key(private_pem)?;
    let public = RsaPublicKey::from(&private);

    let limit = max_plaintext_length(&public);
    if plaintext.len() > limit {
        return Err(CryptoError::MalformedInput(format!(
            "plaintext of {} bytes exceeds RSA-OAEP limit of {} bytes",
            plaintext.len(),
            limit
        )));
    }

    public
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
}

/// Decrypt with the stored private key.
pub fn rsa_open(private_pem: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let private = load_private_key(private_pem)?;
    if ciphertext.len() != private.size() {
        return Err(CryptoError::MalformedInput(format!(
            "RSA ciphertext is {} bytes, expected {}",
            ciphertext.len(),
            private.size()
        )));
    }
    private
        .decrypt(Oaep::new::<Sha256>(), ciphertext)
        .map_err(|_| CryptoError::Integrity("RSA-OAEP decryption failed".into()))
}
