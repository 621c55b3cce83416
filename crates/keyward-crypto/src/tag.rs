//! Keyed tamper-evidence tags (HMAC-SHA256, hex encoded).

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::CryptoError;

type HmacSha256 = Hmac<Sha256>;

/// Shortest secret accepted for tamper-evidence tags.
pub const MIN_TAG_SECRET_LENGTH: usize = 32;

/// Computes and checks hex HMAC-SHA256 tags under a fixed secret.
#[derive(Clone)]
pub struct TamperSeal {
    keyed: HmacSha256,
}

impl TamperSeal {
    pub fn new(secret: &[u8]) -> Result<Self, CryptoError> {
        if secret.len() < MIN_TAG_SECRET_LENGTH {
            return Err(CryptoError::InvalidKeyLength {
                expected: MIN_TAG_SECRET_LENGTH,
                got: secret.len(),
            });
        }
        let keyed = <HmacSha256 as Mac>::new_from_slice(secret)
            .map_err(|e| CryptoError::MalformedInput(e.to_string()))?;
        Ok(Self { keyed })
    }

    /// Hex-encoded tag over `message`.
    pub fn tag(&self, message: &[u8]) -> String {
        let mut mac = self.keyed.clone();
        mac.update(message);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Constant-time check of a hex tag. Malformed hex never verifies.
    pub fn check(&self, message: &[u8], tag_hex: &str) -> bool {
        let Ok(tag) = hex::decode(tag_hex) else {
            return false;
        };
        let mut mac = self.keyed.clone();
        mac.update(message);
        mac.verify_slice(&tag).is_ok()
    }
}

impl std::fmt::Debug for TamperSeal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TamperSeal")
            .field("secret", &"<redacted>")
            .finish()
    }
}
