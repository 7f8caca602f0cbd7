//! # Canonical Serialization
//!
//! `CanonicalBytes` is the sole construction path for bytes that are hashed
//! into a claim ID or embedded in a signed token segment.
//!
//! ## Invariant
//!
//! The inner field is private. The only constructor serializes with
//! `serde_jcs` (RFC 8785): object keys sorted at every depth, compact
//! separators, no whitespace, and numbers in ECMAScript shortest form.
//! Any function that hashes or signs claim data takes `&CanonicalBytes`, so
//! map iteration order in the caller can never leak into an ID or a
//! signature.

use serde::Serialize;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// `SerializationFailed` if serde cannot represent the value as JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
