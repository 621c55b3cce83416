use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Integrity check failed: {0}")]
    Integrity(String),

    #[error("Invalid block-cipher padding")]
    Padding,

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Invalid key material for {algorithm}: {reason}")]
    InvalidKeyMaterial {
        algorithm: &'static str,
        reason: String,
    },

    #[error("Invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Random number generation failed: {0}")]
    RngFailed(String),
}

impl CryptoError {
    /// True for failures that indicate tampering, corruption, or a wrong key.
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity(_))
    }
}
