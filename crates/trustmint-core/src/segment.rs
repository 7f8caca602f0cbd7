//! # Token Segments
//!
//! A token is three base64url (unpadded) segments joined by `.`. The
//! base64url alphabet has no `.`, so a segment can never contain the
//! separator.
//!
//! `SigningInput` is the exact byte sequence a token signature covers:
//! `header + "." + payload`. It can only be built from two segments, so a
//! signature is never computed over anything else.

use crate::canonical::CanonicalBytes;
use crate::encoding::{base64url_decode, base64url_encode};
use crate::error::SegmentError;

/// One base64url segment of a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment(String);

impl Segment {
    /// Encode canonical JSON as a header or payload segment.
    pub fn encode(data: &CanonicalBytes) -> Self {
        Self(base64url_encode(data.as_bytes()))
    }

    /// Encode raw bytes (a signature) as a segment.
    pub fn encode_raw(bytes: &[u8]) -> Self {
        Self(base64url_encode(bytes))
    }

    /// Validate segment text taken from an existing token.
    pub fn parse(text: &str) -> Result<Self, SegmentError> {
        if text.is_empty() {
            return Err(SegmentError::Empty);
        }
        base64url_decode(text).map_err(|e| SegmentError::Encoding(e.to_string()))?;
        Ok(Self(text.to_string()))
    }

    /// Decode back to bytes.
    pub fn decode(&self) -> Result<Vec<u8>, SegmentError> {
        base64url_decode(&self.0).map_err(|e| SegmentError::Encoding(e.to_string()))
    }

    /// The segment text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// `header.payload`, the bytes covered by a token signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningInput(String);

impl SigningInput {
    /// Join header and payload segments.
    pub fn new(header: &Segment, payload: &Segment) -> Self {
        Self(format!("{}.{}", header.as_str(), payload.as_str()))
    }

    /// The bytes to sign or verify.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// The signing input as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
