//! # Error Types
//!
//! Leaf-level errors for the codecs in this crate. All errors use
//! `thiserror`; higher crates wrap them into their own taxonomies.

use thiserror::Error;

/// Error decoding a seed or public identifier from its textual form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeedError {
    /// The text is not valid unpadded base32.
    #[error("invalid base32 encoding: {0}")]
    Encoding(String),

    /// The decoded payload has the wrong number of bytes.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    Length {
        /// Byte length required by the encoding.
        expected: usize,
        /// Byte length actually decoded.
        actual: usize,
    },

    /// The trailing CRC-16 does not match the payload.
    #[error("checksum mismatch")]
    Checksum,

    /// The leading byte does not carry the seed marker.
    #[error("not a seed: prefix byte {0:#04x}")]
    NotSeed(u8),

    /// The embedded tier byte is not one of the recognized tiers.
    #[error("unrecognized tier prefix byte {0:#04x}")]
    UnrecognizedTier(u8),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error decoding a base64url token segment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentError {
    /// The segment is empty.
    #[error("segment is empty")]
    Empty,

    /// The segment is not valid unpadded base64url.
    #[error("invalid base64url segment: {0}")]
    Encoding(String),
}
