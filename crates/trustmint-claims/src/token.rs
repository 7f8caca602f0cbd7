//! # Token Assembly
//!
//! A token is `header.payload.signature`. Header and payload are canonical
//! JSON encoded as base64url segments; the signature is Ed25519 over the
//! exact text `header.payload`.
//!
//! [`Issuer::issue`] is the single issuance path:
//!
//! 1. Check the issuer/subject tiers against the hierarchy policy.
//! 2. Blank the ID and stamp the issuer's public identifier.
//! 3. Compute the ID over the canonical claims and store it.
//! 4. Encode the header and payload segments.
//! 5. Sign `header.payload` with the issuer key.
//! 6. Join the three segments.
//!
//! The claim ID therefore covers everything in the payload except itself,
//! and the signature covers the payload including the ID.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use trustmint_core::{CanonicalBytes, Segment, SigningInput, Tier};
use trustmint_crypto::{KeyPair, Signature};

use crate::claims::{Claims, ClaimsBuilder};
use crate::error::{IssueError, TokenDecodeError};
use crate::hierarchy::HierarchyPolicy;
use crate::request::IssueRequest;

/// Value of the header `alg` field.
pub const ALGORITHM: &str = "ed25519-nkey";

/// Value of the header `typ` field.
pub const TOKEN_TYPE: &str = "JWT";

/// The fixed token header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub typ: String,
    pub alg: String,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            typ: TOKEN_TYPE.to_string(),
            alg: ALGORITHM.to_string(),
        }
    }
}

/// Encode the fixed header as a segment.
pub fn encode_header() -> Result<Segment, IssueError> {
    Ok(Segment::encode(&CanonicalBytes::new(&Header::default())?))
}

/// Encode claims as the payload segment.
pub fn encode_payload(claims: &Claims) -> Result<Segment, IssueError> {
    Ok(Segment::encode(&claims.canonical_bytes()?))
}

/// An issued token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    header: Segment,
    payload: Segment,
    signature: Signature,
    id: String,
}

impl Token {
    /// The claim ID stamped into the payload.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn header(&self) -> &Segment {
        &self.header
    }

    pub fn payload(&self) -> &Segment {
        &self.payload
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The `header.payload` text the signature covers.
    pub fn signing_input(&self) -> SigningInput {
        SigningInput::new(&self.header, &self.payload)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.header,
            self.payload,
            self.signature.to_segment()
        )
    }
}

/// Issues tokens under a hierarchy policy.
///
/// Holds no mutable state; one `Issuer` can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Issuer {
    policy: HierarchyPolicy,
}

impl Issuer {
    pub fn new(policy: HierarchyPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &HierarchyPolicy {
        &self.policy
    }

    /// Sign `claims` with `issuer`.
    ///
    /// # Errors
    ///
    /// `IssuerHierarchyViolation` or `UnknownSubjectTier` when the tiers do
    /// not fit the policy; `Serialization` when the claims cannot be
    /// canonicalized. Nothing is returned on failure.
    pub fn issue(&self, mut claims: Claims, issuer: &KeyPair) -> Result<Token, IssueError> {
        let subject_tier = claims.subject().tier();
        self.policy.check(subject_tier, issuer.tier())?;

        claims.set_id(String::new());
        claims.set_issuer(issuer.public_identifier());

        let id = claims.compute_id()?;
        claims.set_id(id.clone());

        let header = encode_header()?;
        let payload = encode_payload(&claims)?;
        let signature = issuer.sign(&SigningInput::new(&header, &payload));

        tracing::debug!(
            subject_tier = %subject_tier,
            issuer_tier = %issuer.tier(),
            jti = %id,
            "issued token"
        );

        Ok(Token {
            header,
            payload,
            signature,
            id,
        })
    }

    /// Derive the issuer key pair from raw entropy, then [`issue`](Self::issue).
    ///
    /// # Errors
    ///
    /// `Signing` when `entropy` cannot become a key pair of `tier`, plus
    /// everything `issue` returns.
    pub fn issue_with_entropy(
        &self,
        claims: Claims,
        tier: Tier,
        entropy: &[u8],
    ) -> Result<Token, IssueError> {
        let issuer =
            KeyPair::derive(tier, entropy).map_err(|e| IssueError::Signing(e.to_string()))?;
        self.issue(claims, &issuer)
    }

    /// Resolve an external request and issue it.
    pub fn issue_request(&self, request: &IssueRequest) -> Result<Token, IssueError> {
        let issuer = request.issuer_key()?;
        let mut builder =
            ClaimsBuilder::new(request.subject()?, issuer.public_identifier(), &request.name);
        if let Some(aud) = &request.audience {
            builder = builder.audience(aud.clone());
        }
        if let Some(exp) = request.expires {
            builder = builder.expires(exp);
        }
        if let Some(nbf) = request.not_before {
            builder = builder.not_before(nbf);
        }
        if let Some(iat) = request.issued_at {
            builder = builder.issued_at(iat);
        }
        if let Some(ext) = &request.extension {
            builder = builder.extension(ext.clone());
        }
        self.issue(builder.build()?, &issuer)
    }
}

// ---------------------------------------------------------------------------
// Decoding for display
// ---------------------------------------------------------------------------

/// Header and payload JSON of an existing token. The signature is split
/// out but not checked.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    pub header: Value,
    pub payload: Value,
    pub signature: Segment,
}

impl DecodedToken {
    /// Split and decode token text.
    pub fn parse(text: &str) -> Result<Self, TokenDecodeError> {
        let parts: Vec<&str> = text.trim().split('.').collect();
        let [header, payload, signature] = parts.as_slice() else {
            return Err(TokenDecodeError::SegmentCount(parts.len()));
        };
        Ok(Self {
            header: decode_json("header", header)?,
            payload: decode_json("payload", payload)?,
            signature: parse_segment("signature", signature)?,
        })
    }

    /// The signing input of the original token.
    pub fn signing_input(text: &str) -> Result<(SigningInput, Segment), TokenDecodeError> {
        let parts: Vec<&str> = text.trim().split('.').collect();
        let [header, payload, signature] = parts.as_slice() else {
            return Err(TokenDecodeError::SegmentCount(parts.len()));
        };
        let input = SigningInput::new(
            &parse_segment("header", header)?,
            &parse_segment("payload", payload)?,
        );
        Ok((input, parse_segment("signature", signature)?))
    }
}

fn parse_segment(part: &'static str, text: &str) -> Result<Segment, TokenDecodeError> {
    Segment::parse(text).map_err(|e| TokenDecodeError::Segment {
        part,
        reason: e.to_string(),
    })
}

fn decode_json(part: &'static str, text: &str) -> Result<Value, TokenDecodeError> {
    let bytes = parse_segment(part, text)?
        .decode()
        .map_err(|e| TokenDecodeError::Segment {
            part,
            reason: e.to_string(),
        })?;
    serde_json::from_slice(&bytes).map_err(|source| TokenDecodeError::Json { part, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org_claims(top: &KeyPair) -> Claims {
        let subject = KeyPair::derive(Tier::Org, &[2u8; 32]).unwrap();
        ClaimsBuilder::new(subject.public_identifier(), top.public_identifier(), "acme")
            .issued_at(1_700_000_000)
            .build()
            .unwrap()
    }

    #[test]
    fn test_header_segment() {
        let header = encode_header().unwrap();
        let decoded = header.decode().unwrap();
        assert_eq!(decoded, br#"{"alg":"ed25519-nkey","typ":"JWT"}"#);
    }

    #[test]
    fn test_issue_is_deterministic() {
        let top = KeyPair::derive(Tier::Top, &[1u8; 32]).unwrap();
        let issuer = Issuer::default();
        let a = issuer.issue(org_claims(&top), &top).unwrap();
        let b = issuer.issue(org_claims(&top), &top).unwrap();
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_issuer_overrides_claimed_issuer() {
        let top = KeyPair::derive(Tier::Top, &[1u8; 32]).unwrap();
        let other = KeyPair::derive(Tier::Top, &[9u8; 32]).unwrap();
        let token = Issuer::default().issue(org_claims(&other), &top).unwrap();
        let decoded = DecodedToken::parse(&token.to_string()).unwrap();
        assert_eq!(decoded.payload["iss"], top.public_identifier().encode());
    }

    #[test]
    fn test_violation_returns_no_token() {
        let user = KeyPair::derive(Tier::User, &[3u8; 32]).unwrap();
        let top = KeyPair::derive(Tier::Top, &[1u8; 32]).unwrap();
        let result = Issuer::default().issue(org_claims(&top), &user);
        assert!(matches!(
            result,
            Err(IssueError::IssuerHierarchyViolation { subject: Tier::Org, issuer: Tier::User })
        ));
    }

    #[test]
    fn test_issue_with_entropy() {
        let top = KeyPair::derive(Tier::Top, &[1u8; 32]).unwrap();
        let issuer = Issuer::default();
        let derived = issuer.issue_with_entropy(org_claims(&top), Tier::Top, &[1u8; 32]).unwrap();
        let direct = issuer.issue(org_claims(&top), &top).unwrap();
        assert_eq!(derived.to_string(), direct.to_string());

        let result = issuer.issue_with_entropy(org_claims(&top), Tier::Top, &[1u8; 31]);
        assert!(matches!(result, Err(IssueError::Signing(_))));
    }

    #[test]
    fn test_decoded_token_roundtrip() {
        let top = KeyPair::derive(Tier::Top, &[1u8; 32]).unwrap();
        let token = Issuer::default().issue(org_claims(&top), &top).unwrap();
        let decoded = DecodedToken::parse(&token.to_string()).unwrap();
        assert_eq!(decoded.header["alg"], ALGORITHM);
        assert_eq!(decoded.payload["jti"], token.id());
        assert_eq!(decoded.signature, token.signature().to_segment());
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(matches!(
            DecodedToken::parse("a.b"),
            Err(TokenDecodeError::SegmentCount(2))
        ));
        assert!(matches!(
            DecodedToken::parse("a.b.c.d"),
            Err(TokenDecodeError::SegmentCount(4))
        ));
        assert!(matches!(
            DecodedToken::parse("!!!.e30.AA"),
            Err(TokenDecodeError::Segment { part: "header", .. })
        ));
        // "bm90anNvbg" is base64url for "notjson".
        assert!(matches!(
            DecodedToken::parse("e30.bm90anNvbg.AA"),
            Err(TokenDecodeError::Json { part: "payload", .. })
        ));
    }
}
