//! ECDSA (P-256, P-384) and Ed25519 signing seals.
//!
//! ECDSA signatures are IEEE P1363 format (raw r||s): 64 bytes for P-256
//! with SHA-256, 96 bytes for P-384 with SHA-384. Ed25519 signatures are
//! 64 bytes. A signing "seal" leaves the plaintext readable:
//! `[plaintext][marker][len:2][signature]`.

use ecdsa::signature::{Signer, Verifier};
use ed25519_dalek::pkcs8::DecodePrivateKey as _;
use p256::pkcs8::DecodePrivateKey;

use crate::error::CryptoError;
use crate::frame::{attach_proof, split_proof, ECC_MARKER, ED25519_MARKER};

/// Curves and schemes usable for signing seals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    EcdsaP256,
    EcdsaP384,
    Ed25519,
}

impl SignatureScheme {
    /// Fixed signature length in bytes.
    pub fn signature_length(&self) -> usize {
        match self {
            Self::EcdsaP256 => 64,
            Self::EcdsaP384 => 96,
            Self::Ed25519 => ed25519_dalek::SIGNATURE_LENGTH,
        }
    }

    fn marker(&self) -> &'static [u8] {
        match self {
            Self::EcdsaP256 | Self::EcdsaP384 => ECC_MARKER,
            Self::Ed25519 => ED25519_MARKER,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::EcdsaP256 => "ECC256",
            Self::EcdsaP384 => "ECC384",
            Self::Ed25519 => "Ed25519",
        }
    }
}

fn pem_text(scheme: SignatureScheme, pem: &[u8]) -> Result<&str, CryptoError> {
    std::str::from_utf8(pem).map_err(|_| CryptoError::InvalidKeyMaterial {
        algorithm: scheme.name(),
        reason: "key is not UTF-8 PEM".into(),
    })
}

fn invalid_key(scheme: SignatureScheme, e: impl std::fmt::Display) -> CryptoError {
    CryptoError::InvalidKeyMaterial {
        algorithm: scheme.name(),
        reason: e.to_string(),
    }
}

/// Sign `message` with a PKCS#8 PEM private key.
pub fn sign(
    scheme: SignatureScheme,
    private_pem: &[u8],
    message: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let pem = pem_text(scheme, private_pem)?;
    let signature = match scheme {
        SignatureScheme::EcdsaP256 => {
            let key = p256::ecdsa::SigningKey::from_pkcs8_pem(pem)
                .map_err(|e| invalid_key(scheme, e))?;
            let signature: p256::ecdsa::Signature = key
                .try_sign(message)
                .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
            signature.to_bytes().to_vec()
        }
        SignatureScheme::EcdsaP384 => {
            let key = p384::ecdsa::SigningKey::from_pkcs8_pem(pem)
                .map_err(|e| invalid_key(scheme, e))?;
            let signature: p384::ecdsa::Signature = key
                .try_sign(message)
                .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
            signature.to_bytes().to_vec()
        }
        SignatureScheme::Ed25519 => {
            let key = ed25519_dalek::SigningKey::from_pkcs8_pem(pem)
                .map_err(|e| invalid_key(scheme, e))?;
            key.sign(message).to_bytes().to_vec()
        }
    };
    Ok(signature)
}

/// Verify `signature` over `message` with the public half of a PKCS#8 PEM
/// private key.
pub fn verify(
    scheme: SignatureScheme,
    private_pem: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    let pem = pem_text(scheme, private_pem)?;
    let failed = || {
        CryptoError::Integrity(format!(
            "{} signature verification failed",
            scheme.name()
        ))
    };
    match scheme {
        SignatureScheme::EcdsaP256 => {
            let key = p256::ecdsa::SigningKey::from_pkcs8_pem(pem)
                .map_err(|e| invalid_key(scheme, e))?;
            let signature = p256::ecdsa::Signature::from_slice(signature).map_err(|_| failed())?;
            key.verifying_key()
                .verify(message, &signature)
                .map_err(|_| failed())
        }
        SignatureScheme::EcdsaP384 => {
            let key = p384::ecdsa::SigningKey::from_pkcs8_pem(pem)
                .map_err(|e| invalid_key(scheme, e))?;
            let signature = p384::ecdsa::Signature::from_slice(signature).map_err(|_| failed())?;
            key.verifying_key()
                .verify(message, &signature)
                .map_err(|_| failed())
        }
        SignatureScheme::Ed25519 => {
            let key = ed25519_dalek::SigningKey::from_pkcs8_pem(pem)
                .map_err(|e| invalid_key(scheme, e))?;
            let signature = ed25519_dalek::Signature::from_slice(signature).map_err(|_| failed())?;
            key.verifying_key()
                .verify_strict(message, &signature)
                .map_err(|_| failed())
        }
    }
}

/// Sign `plaintext` and attach the signature.
pub fn sign_seal(
    scheme: SignatureScheme,
    private_pem: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let signature = sign(scheme, private_pem, plaintext)?;
    attach_proof(plaintext, scheme.marker(), &signature)
}

/// Verify an attached signature and return the original plaintext.
pub fn sign_open(
    scheme: SignatureScheme,
    private_pem: &[u8],
    sealed: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let (plaintext, signature) = split_proof(sealed, scheme.marker(), scheme.signature_length())?;
    verify(scheme, private_pem, plaintext, signature)?;
    Ok(plaintext.to_vec())
}
