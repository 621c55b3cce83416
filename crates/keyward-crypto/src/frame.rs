//! Attached-proof framing for MAC and signature seals.
//!
//! Format: `[plaintext][marker][2 bytes: proof length (u16 BE)][proof]`
//!
//! Every proof has a fixed length for its algorithm, so the frame is split
//! from the end. Plaintext that happens to contain the marker bytes is
//! never ambiguous.

use crate::error::CryptoError;

/// Proof length prefix size (2 bytes, u16 BE).
const LENGTH_PREFIX_SIZE: usize = 2;

/// Marker for HMAC proofs.
pub const HMAC_MARKER: &[u8] = b"|HMAC|";

/// Marker for ECDSA proofs.
pub const ECC_MARKER: &[u8] = b"|ECC|";

/// Marker for Ed25519 proofs.
pub const ED25519_MARKER: &[u8] = b"|Ed25519|";

/// Attach `proof` to `plaintext`.
pub fn attach_proof(
    plaintext: &[u8],
    marker: &[u8],
    proof: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let proof_len = u16::try_from(proof.len()).map_err(|_| {
        CryptoError::MalformedInput(format!("proof too long: {} bytes", proof.len()))
    })?;

    let mut framed =
        Vec::with_capacity(plaintext.len() + marker.len() + LENGTH_PREFIX_SIZE + proof.len());
    framed.extend_from_slice(plaintext);
    framed.extend_from_slice(marker);
    framed.extend_from_slice(&proof_len.to_be_bytes());
    framed.extend_from_slice(proof);
    Ok(framed)
}

/// Split a framed buffer into `(plaintext, proof)`.
///
/// `proof_len` is the fixed proof size for the algorithm. The embedded
/// length and marker must both match, else the frame is malformed.
pub fn split_proof<'a>(
    framed: &'a [u8],
    marker: &[u8],
    proof_len: usize,
) -> Result<(&'a [u8], &'a [u8]), CryptoError> {
    let trailer_len = marker.len() + LENGTH_PREFIX_SIZE + proof_len;
    if framed.len() < trailer_len {
        return Err(CryptoError::MalformedInput(format!(
            "sealed frame too short: {} bytes, need at least {}",
            framed.len(),
            trailer_len
        )));
    }

    let proof_start = framed.len() - proof_len;
    let len_start = proof_start - LENGTH_PREFIX_SIZE;
    let marker_start = len_start - marker.len();

    let embedded_len = u16::from_be_bytes([framed[len_start], framed[len_start + 1]]) as usize;
    if embedded_len != proof_len {
        return Err(CryptoError::MalformedInput(format!(
            "proof length field is {}, expected {}",
            embedded_len, proof_len
        )));
    }
    if &framed[marker_start..len_start] != marker {
        return Err(CryptoError::MalformedInput("proof marker not found".into()));
    }

    Ok((&framed[..marker_start], &framed[proof_start..]))
}
