//! # Error Types
//!
//! `IssueError` is the issuance taxonomy. Every variant aborts issuance and
//! none is worth retrying: the engine is a pure function of its input, so
//! the same input fails the same way. Variants that concern one input field
//! name it, so an adapter can attach the diagnostic to the right attribute.

use thiserror::Error;
use trustmint_core::{CanonicalizationError, Tier};

/// Error while building claims or issuing a token.
#[derive(Error, Debug)]
pub enum IssueError {
    /// Seed or public identifier text failed to decode.
    #[error("invalid key in `{field}`: {reason}")]
    InvalidSeed {
        /// The input field holding the key.
        field: String,
        /// Why decoding failed.
        reason: String,
    },

    /// A required input field was absent or empty.
    #[error("missing required field `{field}`")]
    MissingRequiredField {
        /// The missing field.
        field: &'static str,
    },

    /// An optional field was present but unusable.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidField {
        /// The offending field.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The subject key decoded, but its tier cannot hold claims.
    #[error("subject has unknown tier; only top, org, and user subjects can be issued")]
    UnknownSubjectTier,

    /// Extension JSON was malformed or does not fit the subject's payload.
    #[error("extension payload could not be decoded: {0}")]
    ExtensionDecode(String),

    /// A delegated signing key belongs to the wrong tier.
    #[error("delegated signing key {key} has tier {actual}, expected {expected}")]
    DelegatedKeyTier {
        /// The offending key, in public identifier form when decodable.
        key: String,
        /// Tier required for this payload's signing keys.
        expected: Tier,
        /// Tier the key actually has.
        actual: Tier,
    },

    /// The issuer's tier may not issue for the subject's tier.
    #[error("a {issuer} issuer may not issue claims for a {subject} subject")]
    IssuerHierarchyViolation {
        /// Subject tier.
        subject: Tier,
        /// Issuer tier.
        issuer: Tier,
    },

    /// Raw entropy could not become a signing key pair
    /// (`Issuer::issue_with_entropy`).
    #[error("signing failed: {0}")]
    Signing(String),

    /// Claims could not be canonicalized.
    #[error("serialization failed: {0}")]
    Serialization(#[from] CanonicalizationError),
}

impl IssueError {
    /// The input field this error is about, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidSeed { field, .. } | Self::InvalidField { field, .. } => Some(field),
            Self::MissingRequiredField { field } => Some(field),
            Self::UnknownSubjectTier => Some("sub"),
            Self::IssuerHierarchyViolation { .. } => Some("iss"),
            Self::ExtensionDecode(_) | Self::DelegatedKeyTier { .. } => Some("nats"),
            Self::Signing(_) | Self::Serialization(_) => None,
        }
    }
}

/// Error splitting or decoding an existing token for display.
#[derive(Error, Debug)]
pub enum TokenDecodeError {
    /// A token has exactly three segments.
    #[error("expected 3 dot-separated segments, found {0}")]
    SegmentCount(usize),

    /// A segment is not valid base64url.
    #[error("{part} segment: {reason}")]
    Segment {
        /// Which segment.
        part: &'static str,
        /// Decoding failure.
        reason: String,
    },

    /// A segment does not hold JSON.
    #[error("{part} segment is not JSON: {source}")]
    Json {
        /// Which segment.
        part: &'static str,
        /// Parser error.
        source: serde_json::Error,
    },
}

/// Error loading engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config file is not valid YAML for `EngineConfig`.
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
