//! # Claims
//!
//! The envelope shared by every token plus exactly one tier payload. Field
//! names on the wire are the short JWT forms (`jti`, `iss`, `sub`, `iat`,
//! `exp`, `nbf`, `aud`) with the payload under `nats`.
//!
//! Claims are only constructed through [`ClaimsBuilder`], which picks the
//! payload variant from the subject's tier, so a `Claims` value always has
//! a payload matching its subject.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use trustmint_core::{claim_digest, CanonicalBytes, PublicIdentifier};

use crate::error::IssueError;
use crate::payload::Payload;

/// A complete set of claims, ready for issuance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Claims {
    #[serde(rename = "jti", skip_serializing_if = "String::is_empty")]
    id: String,
    #[serde(rename = "iat")]
    issued_at: i64,
    #[serde(rename = "iss")]
    issuer: PublicIdentifier,
    name: String,
    #[serde(rename = "sub")]
    subject: PublicIdentifier,
    #[serde(rename = "aud", skip_serializing_if = "Option::is_none")]
    audience: Option<String>,
    #[serde(rename = "exp", skip_serializing_if = "Option::is_none")]
    expires: Option<i64>,
    #[serde(rename = "nbf", skip_serializing_if = "Option::is_none")]
    not_before: Option<i64>,
    #[serde(rename = "nats")]
    payload: Payload,
}

impl Claims {
    /// The claim ID. Empty until issued.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn issued_at(&self) -> i64 {
        self.issued_at
    }

    pub fn issuer(&self) -> &PublicIdentifier {
        &self.issuer
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subject(&self) -> &PublicIdentifier {
        &self.subject
    }

    pub fn audience(&self) -> Option<&str> {
        self.audience.as_deref()
    }

    pub fn expires(&self) -> Option<i64> {
        self.expires
    }

    pub fn not_before(&self) -> Option<i64> {
        self.not_before
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Compute the claim ID: SHA-512/256 over the canonical JSON of these
    /// claims with the ID omitted, base32 without padding.
    ///
    /// The current ID is ignored, so the result is the same whether or not
    /// the claims have already been issued.
    pub fn compute_id(&self) -> Result<String, IssueError> {
        let mut blank = self.clone();
        blank.id.clear();
        let canonical = CanonicalBytes::new(&blank)?;
        Ok(claim_digest(&canonical).to_base32())
    }

    /// Canonical JSON bytes of the claims as they stand.
    pub fn canonical_bytes(&self) -> Result<CanonicalBytes, IssueError> {
        Ok(CanonicalBytes::new(self)?)
    }

    pub(crate) fn set_issuer(&mut self, issuer: PublicIdentifier) {
        self.issuer = issuer;
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Builder for [`Claims`].
#[derive(Debug, Clone)]
pub struct ClaimsBuilder {
    subject: PublicIdentifier,
    issuer: PublicIdentifier,
    name: String,
    audience: Option<String>,
    expires: Option<i64>,
    not_before: Option<i64>,
    issued_at: Option<i64>,
    extension: Option<Value>,
}

impl ClaimsBuilder {
    /// Start claims for `subject`, to be issued by `issuer`.
    pub fn new(
        subject: PublicIdentifier,
        issuer: PublicIdentifier,
        name: impl Into<String>,
    ) -> Self {
        Self {
            subject,
            issuer,
            name: name.into(),
            audience: None,
            expires: None,
            not_before: None,
            issued_at: None,
            extension: None,
        }
    }

    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Expiry, unix seconds.
    pub fn expires(mut self, at: i64) -> Self {
        self.expires = Some(at);
        self
    }

    /// Not-before, unix seconds.
    pub fn not_before(mut self, at: i64) -> Self {
        self.not_before = Some(at);
        self
    }

    /// Issue time, unix seconds. Defaults to now.
    pub fn issued_at(mut self, at: i64) -> Self {
        self.issued_at = Some(at);
        self
    }

    /// Extension JSON for the subject's payload.
    pub fn extension(mut self, extension: Value) -> Self {
        self.extension = Some(extension);
        self
    }

    /// Build the claims, decoding the extension into the subject tier's
    /// payload variant.
    ///
    /// # Errors
    ///
    /// `UnknownSubjectTier` when the subject is not a top, org, or user key;
    /// `ExtensionDecode`, `DelegatedKeyTier`, or `InvalidSeed` when the
    /// extension does not fit the payload.
    pub fn build(self) -> Result<Claims, IssueError> {
        let payload = Payload::decode(self.subject.tier(), self.extension.as_ref())?;
        Ok(Claims {
            id: String::new(),
            issued_at: self.issued_at.unwrap_or_else(|| Utc::now().timestamp()),
            issuer: self.issuer,
            name: self.name,
            subject: self.subject,
            audience: self.audience,
            expires: self.expires,
            not_before: self.not_before,
            payload,
        })
    }
}
