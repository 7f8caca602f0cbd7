//! # Tier Payloads
//!
//! The claims payload lives under the `nats` key and is one of three
//! variants, chosen by the subject's tier. The set is closed: a subject of
//! any other tier has no payload and cannot be issued.
//!
//! | Variant | `type` | Delegated keys |
//! |---|---|---|
//! | `TopPayload` | `operator` | list of top-tier identifiers |
//! | `OrgPayload` | `account` | map of org-tier identifier to scope |
//! | `UserPayload` | `user` | none |
//!
//! Org signing keys are also accepted as a list whose entries are either
//! key text (unscoped) or a scope object naming its key under `key`.
//!
//! Every variant also carries an open extension map and serializes
//! `version: 2`. `type` and `version` are always written by the engine;
//! callers supplying them in extension JSON are overridden.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use trustmint_core::{PublicIdentifier, Tier};
use trustmint_crypto::public_identifier_of;

use crate::error::IssueError;

/// Payload schema version written into every token.
pub const PAYLOAD_VERSION: u64 = 2;

const SIGNING_KEYS: &str = "signing_keys";
const RESERVED_KEYS: [&str; 2] = ["type", "version"];

/// Payload for a top-tier subject.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopPayload {
    /// Delegated top-tier signing keys.
    pub signing_keys: BTreeSet<PublicIdentifier>,
    /// Free-form extension fields.
    pub extensions: BTreeMap<String, Value>,
}

/// Payload for an org-tier subject.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrgPayload {
    /// Delegated org-tier signing keys and their scopes. `Value::Null`
    /// means unscoped.
    pub signing_keys: BTreeMap<PublicIdentifier, Value>,
    /// Free-form extension fields.
    pub extensions: BTreeMap<String, Value>,
}

/// Payload for a user-tier subject.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPayload {
    /// Free-form extension fields.
    pub extensions: BTreeMap<String, Value>,
}

/// The tier-specific part of a set of claims.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Top-tier subject (`operator`).
    Top(TopPayload),
    /// Org-tier subject (`account`).
    Org(OrgPayload),
    /// User-tier subject (`user`).
    User(UserPayload),
}

impl Payload {
    /// An empty payload for `tier`.
    pub fn empty(tier: Tier) -> Result<Self, IssueError> {
        match tier {
            Tier::Top => Ok(Self::Top(TopPayload::default())),
            Tier::Org => Ok(Self::Org(OrgPayload::default())),
            Tier::User => Ok(Self::User(UserPayload::default())),
            Tier::Unknown => Err(IssueError::UnknownSubjectTier),
        }
    }

    /// Decode extension JSON into the payload variant for `tier`.
    ///
    /// `None` and JSON `null` give an empty payload. Anything else must be
    /// an object whose shape fits the variant. Delegated signing keys may
    /// be given as seeds or public identifiers and are stored as public
    /// identifiers after their tier is checked.
    pub fn decode(tier: Tier, extension: Option<&Value>) -> Result<Self, IssueError> {
        let mut fields = match extension {
            None | Some(Value::Null) => return Self::empty(tier),
            Some(Value::Object(map)) => map.clone(),
            Some(other) => {
                return Err(IssueError::ExtensionDecode(format!(
                    "expected a JSON object, found {}",
                    json_kind(other)
                )))
            }
        };
        for key in RESERVED_KEYS {
            fields.remove(key);
        }
        let signing_keys = fields.remove(SIGNING_KEYS);

        let payload = match tier {
            Tier::Top => Self::Top(TopPayload {
                signing_keys: decode_key_list(signing_keys, Tier::Top)?,
                extensions: into_btree(fields),
            }),
            Tier::Org => Self::Org(OrgPayload {
                signing_keys: decode_scoped_keys(signing_keys)?,
                extensions: into_btree(fields),
            }),
            Tier::User => {
                if signing_keys.is_some() {
                    return Err(IssueError::ExtensionDecode(
                        "user payloads do not carry signing_keys".to_string(),
                    ));
                }
                Self::User(UserPayload {
                    extensions: into_btree(fields),
                })
            }
            Tier::Unknown => return Err(IssueError::UnknownSubjectTier),
        };
        Ok(payload)
    }

    /// Parse extension JSON text, then [`Payload::decode`] it.
    pub fn decode_str(tier: Tier, text: &str) -> Result<Self, IssueError> {
        if text.trim().is_empty() {
            return Self::empty(tier);
        }
        let value: Value = serde_json::from_str(text)
            .map_err(|e| IssueError::ExtensionDecode(format!("malformed JSON: {e}")))?;
        Self::decode(tier, Some(&value))
    }

    /// The tier this payload belongs to.
    pub fn tier(&self) -> Tier {
        match self {
            Self::Top(_) => Tier::Top,
            Self::Org(_) => Tier::Org,
            Self::User(_) => Tier::User,
        }
    }

    /// The extension map of any variant.
    pub fn extensions(&self) -> &BTreeMap<String, Value> {
        match self {
            Self::Top(p) => &p.extensions,
            Self::Org(p) => &p.extensions,
            Self::User(p) => &p.extensions,
        }
    }

    /// The wire form: extensions, then delegated keys (when any), then the
    /// engine-owned `type` and `version`.
    pub fn to_value(&self) -> Value {
        let mut out: Map<String, Value> = self
            .extensions()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        match self {
            Self::Top(p) if !p.signing_keys.is_empty() => {
                let keys = p
                    .signing_keys
                    .iter()
                    .map(|id| Value::String(id.encode()))
                    .collect();
                out.insert(SIGNING_KEYS.to_string(), Value::Array(keys));
            }
            Self::Org(p) if !p.signing_keys.is_empty() => {
                let keys = p
                    .signing_keys
                    .iter()
                    .map(|(id, scope)| (id.encode(), scope.clone()))
                    .collect();
                out.insert(SIGNING_KEYS.to_string(), Value::Object(keys));
            }
            _ => {}
        }

        // Tier::claim_type is Some for every tier that has a payload.
        let kind = self.tier().claim_type().unwrap_or_default();
        out.insert("type".to_string(), Value::String(kind.to_string()));
        out.insert("version".to_string(), Value::from(PAYLOAD_VERSION));
        Value::Object(out)
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Delegated key decoding
// ---------------------------------------------------------------------------

fn decode_key_list(
    raw: Option<Value>,
    expected: Tier,
) -> Result<BTreeSet<PublicIdentifier>, IssueError> {
    match raw {
        None | Some(Value::Null) => Ok(BTreeSet::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => delegated_key(text, expected),
                other => Err(IssueError::ExtensionDecode(format!(
                    "signing_keys entries must be strings, found {}",
                    json_kind(other)
                ))),
            })
            .collect(),
        Some(other) => Err(IssueError::ExtensionDecode(format!(
            "{expected} signing_keys must be a list, found {}",
            json_kind(&other)
        ))),
    }
}

fn decode_scoped_keys(raw: Option<Value>) -> Result<BTreeMap<PublicIdentifier, Value>, IssueError> {
    match raw {
        None | Some(Value::Null) => Ok(BTreeMap::new()),
        Some(Value::Object(entries)) => entries
            .into_iter()
            .map(|(text, scope)| Ok((delegated_key(&text, Tier::Org)?, scope)))
            .collect(),
        Some(Value::Array(items)) => items.into_iter().map(decode_scoped_entry).collect(),
        Some(other) => Err(IssueError::ExtensionDecode(format!(
            "org signing_keys must be a map or a list, found {}",
            json_kind(&other)
        ))),
    }
}

/// One entry of the list form: key text, or a scope object carrying the
/// key under `key`. The scope's `key` is rewritten to public identifier
/// form so seed text never reaches the token.
fn decode_scoped_entry(entry: Value) -> Result<(PublicIdentifier, Value), IssueError> {
    match entry {
        Value::String(text) => Ok((delegated_key(&text, Tier::Org)?, Value::Null)),
        Value::Object(mut scope) => {
            let id = match scope.get("key") {
                Some(Value::String(text)) => delegated_key(text, Tier::Org)?,
                _ => {
                    return Err(IssueError::ExtensionDecode(
                        "signing_keys scope objects must carry a string `key`".to_string(),
                    ))
                }
            };
            scope.insert("key".to_string(), Value::String(id.encode()));
            Ok((id, Value::Object(scope)))
        }
        other => Err(IssueError::ExtensionDecode(format!(
            "signing_keys entries must be strings or scope objects, found {}",
            json_kind(&other)
        ))),
    }
}

fn delegated_key(text: &str, expected: Tier) -> Result<PublicIdentifier, IssueError> {
    let id = public_identifier_of(text).map_err(|e| IssueError::InvalidSeed {
        field: SIGNING_KEYS.to_string(),
        reason: e.to_string(),
    })?;
    if id.tier() != expected {
        return Err(IssueError::DelegatedKeyTier {
            key: id.encode(),
            expected,
            actual: id.tier(),
        });
    }
    Ok(id)
}

fn into_btree(map: Map<String, Value>) -> BTreeMap<String, Value> {
    map.into_iter().collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
