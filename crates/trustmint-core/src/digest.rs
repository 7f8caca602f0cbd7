//! # Claim Digest
//!
//! Content-addressed claim IDs. A claim ID is SHA-512/256 over the
//! canonical bytes of the claims (with the ID itself blank), rendered as
//! unpadded base32, 52 characters.
//!
//! ## Invariant
//!
//! `claim_digest()` accepts only `&CanonicalBytes`, so every ID in the
//! system is computed over sorted-key JSON and two logically identical
//! claim sets always share an ID.

use sha2::{Digest, Sha512_256};

use crate::canonical::CanonicalBytes;
use crate::encoding::base32_encode;

/// A 32-byte SHA-512/256 digest of canonical claim bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClaimDigest([u8; 32]);

impl ClaimDigest {
    /// The raw digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as unpadded base32; this is the form stored in `jti`.
    pub fn to_base32(&self) -> String {
        base32_encode(&self.0)
    }

    /// Render as lowercase hex, for diagnostics.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ClaimDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base32())
    }
}

/// Compute the claim digest of canonical bytes.
pub fn claim_digest(data: &CanonicalBytes) -> ClaimDigest {
    let hash = Sha512_256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ClaimDigest(bytes)
}
