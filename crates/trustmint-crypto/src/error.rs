//! Errors for key handling and signature operations.

use thiserror::Error;
use trustmint_core::{SeedError, Tier};

/// Error in a cryptographic operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Key entropy was not exactly 32 bytes.
    #[error("malformed key entropy: expected 32 bytes, got {0}")]
    MalformedEntropy(usize),

    /// Seed or public identifier text could not be decoded.
    #[error("invalid key text: {0}")]
    InvalidKey(#[from] SeedError),

    /// Keys can only be generated for the three hierarchy tiers.
    #[error("cannot generate a key for tier {0}")]
    UnsupportedTier(Tier),

    /// The public key bytes are not a valid Ed25519 point.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Signature bytes were malformed.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// The signature does not match the message and key.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),
}
