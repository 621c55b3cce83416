use keyward_crypto::CryptoError;
use serde::Serialize;
use thiserror::Error;

/// Failures reported by a [`KeyStore`](crate::store::KeyStore) or
/// [`AuditSink`](crate::store::AuditSink) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    #[error("Concurrent modification of key {id}: expected version {expected_version}")]
    Conflict { id: String, expected_version: u32 },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum KmsError {
    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Invalid key state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Stable, machine-readable error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnsupportedAlgorithm,
    Integrity,
    Padding,
    MalformedInput,
    NotFound,
    InvalidState,
    Configuration,
    Forbidden,
    InvalidInput,
    Conflict,
    Internal,
}

impl KmsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Crypto(e) => match e {
                CryptoError::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
                CryptoError::Integrity(_) => ErrorKind::Integrity,
                CryptoError::Padding => ErrorKind::Padding,
                CryptoError::MalformedInput(_) => ErrorKind::MalformedInput,
                CryptoError::InvalidKeyMaterial { .. }
                | CryptoError::InvalidKeyLength { .. }
                | CryptoError::KeyGeneration(_)
                | CryptoError::EncryptionFailed(_)
                | CryptoError::RngFailed(_) => ErrorKind::Internal,
            },
            Self::Store(e) => match e {
                StoreError::AlreadyExists(_) | StoreError::Conflict { .. } => ErrorKind::Conflict,
                StoreError::Backend(_) => ErrorKind::Internal,
            },
        }
    }
}

pub type Result<T, E = KmsError> = std::result::Result<T, E>;
