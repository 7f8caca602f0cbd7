//! # Issue Requests
//!
//! The external input to issuance. Adapters hand over either a flat
//! string map (every value a string, as configuration tooling produces) or
//! a structured JSON object. Both land in the same [`IssueRequest`].
//!
//! Fields: `iss` (issuer seed), `sub` (subject seed or public identifier),
//! `name`, and optionally `aud`, `exp`, `nbf`, `iat`, `nats`. Empty strings
//! count as absent. Timestamps are unix seconds, numeric strings, or
//! RFC 3339 text. `nats` is extension JSON, either as a string or inline.

use std::collections::BTreeMap;

use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;
use trustmint_core::{PublicIdentifier, Seed};
use trustmint_crypto::{public_identifier_of, KeyPair};
use zeroize::Zeroizing;

use crate::error::IssueError;

/// A resolved issuance request.
#[derive(Clone)]
pub struct IssueRequest {
    /// Issuer seed text. Secret.
    pub issuer: Zeroizing<String>,
    /// Subject seed or public identifier text.
    pub subject: String,
    pub name: String,
    pub audience: Option<String>,
    pub expires: Option<i64>,
    pub not_before: Option<i64>,
    pub issued_at: Option<i64>,
    /// Extension JSON for the subject's payload.
    pub extension: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRequest {
    iss: Option<String>,
    sub: Option<String>,
    name: Option<String>,
    aud: Option<String>,
    exp: Option<Value>,
    nbf: Option<Value>,
    iat: Option<Value>,
    nats: Option<ExtensionInput>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExtensionInput {
    Text(String),
    Inline(Value),
}

impl IssueRequest {
    /// Build a request from a flat string map. Unrecognized keys are
    /// ignored.
    pub fn from_flat_map(map: &BTreeMap<String, String>) -> Result<Self, IssueError> {
        let get = |key: &str| map.get(key).cloned();
        RawRequest {
            iss: get("iss"),
            sub: get("sub"),
            name: get("name"),
            aud: get("aud"),
            exp: get("exp").map(Value::String),
            nbf: get("nbf").map(Value::String),
            iat: get("iat").map(Value::String),
            nats: get("nats").map(ExtensionInput::Text),
        }
        .resolve()
    }

    /// Build a request from a JSON object. Unrecognized keys are ignored.
    pub fn from_json(value: &Value) -> Result<Self, IssueError> {
        let raw = RawRequest::deserialize(value).map_err(|e| IssueError::InvalidField {
            field: "request".to_string(),
            reason: e.to_string(),
        })?;
        raw.resolve()
    }

    /// Parse JSON text, then [`IssueRequest::from_json`].
    pub fn from_json_str(text: &str) -> Result<Self, IssueError> {
        let value: Value = serde_json::from_str(text).map_err(|e| IssueError::InvalidField {
            field: "request".to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&value)
    }

    /// Decode the issuer seed into its key pair.
    ///
    /// # Errors
    ///
    /// `InvalidSeed { field: "iss" }` when `iss` is not valid seed text. A
    /// public identifier is rejected: signing needs the private half.
    pub fn issuer_key(&self) -> Result<KeyPair, IssueError> {
        if !Seed::looks_like_seed(&self.issuer) {
            return Err(IssueError::InvalidSeed {
                field: "iss".to_string(),
                reason: "issuer must be a seed".to_string(),
            });
        }
        KeyPair::from_seed_text(&self.issuer).map_err(|e| IssueError::InvalidSeed {
            field: "iss".to_string(),
            reason: e.to_string(),
        })
    }

    /// Resolve the subject to its public identifier.
    pub fn subject(&self) -> Result<PublicIdentifier, IssueError> {
        public_identifier_of(&self.subject).map_err(|e| IssueError::InvalidSeed {
            field: "sub".to_string(),
            reason: e.to_string(),
        })
    }
}

impl std::fmt::Debug for IssueRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssueRequest")
            .field("issuer", &"<secret>")
            .field("subject", &self.subject)
            .field("name", &self.name)
            .field("audience", &self.audience)
            .field("expires", &self.expires)
            .field("not_before", &self.not_before)
            .field("issued_at", &self.issued_at)
            .field("extension", &self.extension)
            .finish()
    }
}

impl RawRequest {
    fn resolve(self) -> Result<IssueRequest, IssueError> {
        Ok(IssueRequest {
            issuer: Zeroizing::new(required("iss", self.iss)?),
            subject: required("sub", self.sub)?,
            name: required("name", self.name)?,
            audience: self.aud.filter(|s| !s.is_empty()),
            expires: timestamp("exp", self.exp)?,
            not_before: timestamp("nbf", self.nbf)?,
            issued_at: timestamp("iat", self.iat)?,
            extension: extension(self.nats)?,
        })
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, IssueError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(IssueError::MissingRequiredField { field }),
    }
}

/// Timestamps stay untyped until here so a bad value is reported under
/// its own field name.
fn timestamp(field: &str, input: Option<Value>) -> Result<Option<i64>, IssueError> {
    let invalid = |detail: String| IssueError::InvalidField {
        field: field.to_string(),
        reason: format!("expected unix seconds or an RFC 3339 timestamp: {detail}"),
    };
    let text = match input {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => {
            return n
                .as_i64()
                .map(Some)
                .ok_or_else(|| invalid(format!("{n} is not a whole number of seconds")))
        }
        Some(Value::String(text)) => text,
        Some(other) => return Err(invalid(format!("found {other}"))),
    };
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    if let Ok(secs) = text.parse::<i64>() {
        return Ok(Some(secs));
    }
    DateTime::parse_from_rfc3339(text)
        .map(|dt| Some(dt.timestamp()))
        .map_err(|e| invalid(e.to_string()))
}

fn extension(input: Option<ExtensionInput>) -> Result<Option<Value>, IssueError> {
    match input {
        None | Some(ExtensionInput::Inline(Value::Null)) => Ok(None),
        Some(ExtensionInput::Inline(value)) => Ok(Some(value)),
        Some(ExtensionInput::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(ExtensionInput::Text(text)) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| IssueError::ExtensionDecode(format!("malformed JSON: {e}"))),
    }
}
