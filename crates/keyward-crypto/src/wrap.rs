//! Master-key envelope wrapping.
//!
//! Every stored key is wrapped under a single AES-256-GCM master key.
//!
//! Wrapped key wire format: [nonce:12][tag:16][ciphertext:N]

use aes_gcm::Aes256Gcm;
use zeroize::Zeroizing;

use crate::aead::{gcm_open, gcm_seal};
use crate::error::CryptoError;
use crate::types::{MASTER_KEY_LENGTH, WRAPPED_KEY_MIN_LENGTH};

/// Wraps and unwraps key material under the process master key.
///
/// Holds its own copy of the master key, zeroized on drop. Immutable after
/// construction, so it can be shared freely across threads.
pub struct MasterKeyWrapper {
    master_key: Zeroizing<[u8; MASTER_KEY_LENGTH]>,
}

impl MasterKeyWrapper {
    /// Create a wrapper from a master secret of at least 32 bytes.
    ///
    /// Only the first 32 bytes are used as the AES-256 key.
    pub fn new(master_secret: &[u8]) -> Result<Self, CryptoError> {
        if master_secret.len() < MASTER_KEY_LENGTH {
            return Err(CryptoError::InvalidKeyLength {
                expected: MASTER_KEY_LENGTH,
                got: master_secret.len(),
            });
        }
        let mut master_key = Zeroizing::new([0u8; MASTER_KEY_LENGTH]);
        master_key.copy_from_slice(&master_secret[..MASTER_KEY_LENGTH]);
        Ok(Self { master_key })
    }

    /// Wrap raw key material. A fresh nonce is drawn on every call.
    pub fn wrap(&self, plain_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        gcm_seal::<Aes256Gcm>(self.master_key.as_slice(), plain_key)
    }

    /// Unwrap key material produced by [`MasterKeyWrapper::wrap`].
    ///
    /// Any authentication failure (wrong master key, corruption) and any
    /// buffer shorter than nonce + tag is reported as an integrity failure.
    pub fn unwrap(&self, wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        if wrapped.len() < WRAPPED_KEY_MIN_LENGTH {
            return Err(CryptoError::Integrity(format!(
                "wrapped key too short: {} bytes",
                wrapped.len()
            )));
        }
        gcm_open::<Aes256Gcm>(self.master_key.as_slice(), wrapped)
            .map(Zeroizing::new)
            .map_err(|_| CryptoError::Integrity("wrapped key failed authentication".into()))
    }
}

impl std::fmt::Debug for MasterKeyWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKeyWrapper")
            .field("master_key", &"<redacted>")
            .finish()
    }
}
