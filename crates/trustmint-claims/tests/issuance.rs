//! # End-to-End Issuance Tests
//!
//! Drive the full path from seeds and claim fields to a token string, then
//! take the token apart and check what a relying party would see:
//! segment shape, payload fields, claim ID, and the signature.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};
use trustmint_claims::{
    ClaimsBuilder, DecodedToken, EngineConfig, HierarchyPolicy, IssueError, IssueRequest, Issuer,
};
use trustmint_core::{claim_digest, CanonicalBytes, Segment, Tier};
use trustmint_crypto::{generate, verify, KeyPair, Signature};

fn key(tier: Tier, byte: u8) -> KeyPair {
    KeyPair::derive(tier, &[byte; 32]).expect("32-byte entropy")
}

fn issue(policy: HierarchyPolicy, subject: &KeyPair, issuer: &KeyPair) -> Result<String, IssueError> {
    let claims = ClaimsBuilder::new(subject.public_identifier(), issuer.public_identifier(), "n")
        .issued_at(1_700_000_000)
        .build()?;
    Ok(Issuer::new(policy).issue(claims, issuer)?.to_string())
}

fn is_base64url(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

// ---------------------------------------------------------------------------
// Concrete scenario
// ---------------------------------------------------------------------------

#[test]
fn top_issues_org_acme() {
    let top = key(Tier::Top, 1);
    let org = key(Tier::Org, 2);
    let subject = org.public_identifier().encode();

    let mut map = BTreeMap::new();
    map.insert("iss".to_string(), top.seed().encode().to_string());
    map.insert("sub".to_string(), org.seed().encode().to_string());
    map.insert("name".to_string(), "acme".to_string());
    let request = IssueRequest::from_flat_map(&map).unwrap();

    let token = Issuer::default().issue_request(&request).unwrap();
    let decoded = DecodedToken::parse(&token.to_string()).unwrap();
    let payload = &decoded.payload;

    assert_eq!(payload["sub"], subject.as_str());
    assert_eq!(payload["iss"], top.public_identifier().encode());
    assert_eq!(payload["name"], "acme");
    assert_eq!(payload["nats"], json!({"type": "account", "version": 2}));
    assert!(payload.get("aud").is_none());

    let jti = payload["jti"].as_str().unwrap().to_string();
    assert_eq!(jti.len(), 52);
    assert_eq!(jti, token.id());

    let mut without_id = payload.clone();
    without_id.as_object_mut().unwrap().remove("jti");
    let recomputed = claim_digest(&CanonicalBytes::new(&without_id).unwrap()).to_base32();
    assert_eq!(recomputed, jti);
}

// ---------------------------------------------------------------------------
// Token shape and signature
// ---------------------------------------------------------------------------

#[test]
fn token_has_three_base64url_segments() {
    let top = key(Tier::Top, 1);
    let token = issue(HierarchyPolicy::strict(), &key(Tier::Org, 2), &top).unwrap();
    assert_eq!(token.matches('.').count(), 2);
    for segment in token.split('.') {
        assert!(is_base64url(segment), "bad segment {segment:?}");
    }
}

#[test]
fn signature_verifies_against_issuer() {
    let top = key(Tier::Top, 1);
    let token = issue(HierarchyPolicy::strict(), &key(Tier::Org, 2), &top).unwrap();
    let (input, sig_segment) = DecodedToken::signing_input(&token).unwrap();
    let signature = Signature::from_segment(&sig_segment).unwrap();

    verify(&input, &signature, &top.public_identifier()).expect("issuer signature verifies");
    assert!(verify(&input, &signature, &key(Tier::Top, 9).public_identifier()).is_err());
}

#[test]
fn tampered_payload_fails_verification() {
    let top = key(Tier::Top, 1);
    let token = issue(HierarchyPolicy::strict(), &key(Tier::Org, 2), &top).unwrap();
    let parts: Vec<&str> = token.split('.').collect();

    let mut payload = Segment::parse(parts[1]).unwrap().decode().unwrap();
    let pos = payload.iter().position(|&b| b == b'n').unwrap();
    payload[pos] = b'm';
    let forged = format!(
        "{}.{}.{}",
        parts[0],
        Segment::encode_raw(&payload),
        parts[2]
    );

    let (input, sig_segment) = DecodedToken::signing_input(&forged).unwrap();
    let signature = Signature::from_segment(&sig_segment).unwrap();
    assert!(verify(&input, &signature, &top.public_identifier()).is_err());
}

// ---------------------------------------------------------------------------
// Hierarchy
// ---------------------------------------------------------------------------

#[test]
fn org_subject_requires_top_issuer() {
    let org = key(Tier::Org, 2);
    let user = key(Tier::User, 3);
    match issue(HierarchyPolicy::strict(), &org, &user) {
        Err(IssueError::IssuerHierarchyViolation { subject, issuer }) => {
            assert_eq!(subject, Tier::Org);
            assert_eq!(issuer, Tier::User);
        }
        other => panic!("expected IssuerHierarchyViolation, got {other:?}"),
    }
    assert!(issue(HierarchyPolicy::strict(), &org, &key(Tier::Top, 1)).is_ok());
}

#[test]
fn strict_table_end_to_end() {
    let keys = [key(Tier::Top, 1), key(Tier::Org, 2), key(Tier::User, 3)];
    for subject in &keys {
        for issuer in &keys {
            let allowed = HierarchyPolicy::strict().permits(subject.tier(), issuer.tier());
            let result = issue(HierarchyPolicy::strict(), subject, issuer);
            assert_eq!(
                result.is_ok(),
                allowed,
                "subject {}, issuer {}",
                subject.tier(),
                issuer.tier()
            );
        }
    }
}

#[test]
fn top_issuing_user_depends_on_policy() {
    let top = key(Tier::Top, 1);
    let user = key(Tier::User, 3);
    assert!(matches!(
        issue(HierarchyPolicy::strict(), &user, &top),
        Err(IssueError::IssuerHierarchyViolation { .. })
    ));

    let config =
        EngineConfig::from_yaml_str("hierarchy:\n  allow_direct_user_issuance: true\n").unwrap();
    let token = issue(config.policy(), &user, &top).unwrap();
    let decoded = DecodedToken::parse(&token).unwrap();
    assert_eq!(decoded.payload["nats"]["type"], "user");
}

#[test]
fn unknown_subject_tier_rejected() {
    let unknown = key(Tier::Unknown, 4);
    assert!(matches!(
        issue(HierarchyPolicy::strict(), &unknown, &key(Tier::Top, 1)),
        Err(IssueError::UnknownSubjectTier)
    ));
}

// ---------------------------------------------------------------------------
// Claim ID
// ---------------------------------------------------------------------------

#[test]
fn id_stable_across_input_order() {
    let top = key(Tier::Top, 1);
    let org = key(Tier::Org, 2);
    let issue_with = |ext: &str| {
        let value: Value = serde_json::from_str(ext).unwrap();
        let claims = ClaimsBuilder::new(org.public_identifier(), top.public_identifier(), "acme")
            .issued_at(1_700_000_000)
            .extension(value)
            .build()
            .unwrap();
        Issuer::default().issue(claims, &top).unwrap()
    };
    let a = issue_with(r#"{"limits": {"conn": 5, "subs": 10}, "tags": ["x"]}"#);
    let b = issue_with(r#"{"tags": ["x"], "limits": {"subs": 10, "conn": 5}}"#);
    assert_eq!(a.id(), b.id());
    assert_eq!(a.to_string(), b.to_string());
}

#[test]
fn id_stable_across_delegate_order() {
    let top = key(Tier::Top, 1);
    let org = key(Tier::Org, 2);
    let first = key(Tier::Org, 5).public_identifier().encode();
    let second = key(Tier::Org, 6).public_identifier().encode();
    let issue_with = |ext: Value| {
        let claims = ClaimsBuilder::new(org.public_identifier(), top.public_identifier(), "acme")
            .issued_at(1_700_000_000)
            .extension(ext)
            .build()
            .unwrap();
        Issuer::default().issue(claims, &top).unwrap()
    };
    let a = issue_with(json!({"signing_keys": [first, second]}));
    let b = issue_with(json!({"signing_keys": [second, first]}));
    let c = issue_with(json!({"signing_keys": {second.as_str(): null, first.as_str(): null}}));
    assert_eq!(a.id(), b.id());
    assert_eq!(a.to_string(), b.to_string());
    assert_eq!(a.id(), c.id());
}

#[test]
fn fractional_extension_values_issue() {
    let top = key(Tier::Top, 1);
    let org = key(Tier::Org, 2);
    let claims = ClaimsBuilder::new(org.public_identifier(), top.public_identifier(), "acme")
        .issued_at(1_700_000_000)
        .extension(json!({"ratio": 0.5}))
        .build()
        .unwrap();
    let token = Issuer::default().issue(claims, &top).unwrap().to_string();

    let decoded = DecodedToken::parse(&token).unwrap();
    assert_eq!(decoded.payload["nats"]["ratio"], 0.5);
    let mut payload = decoded.payload.clone();
    let jti = payload.as_object_mut().unwrap().remove("jti").unwrap();
    let recomputed = claim_digest(&CanonicalBytes::new(&payload).unwrap()).to_base32();
    assert_eq!(jti.as_str().unwrap(), recomputed.as_str());
}

// ---------------------------------------------------------------------------
// Delegated signing keys
// ---------------------------------------------------------------------------

#[test]
fn delegated_org_seed_reencoded() {
    let top = key(Tier::Top, 1);
    let delegate = generate(Tier::Org).unwrap();
    let request = IssueRequest::from_json(&json!({
        "iss": top.seed().encode().as_str(),
        "sub": key(Tier::Org, 2).public_identifier().encode(),
        "name": "acme",
        "nats": {"signing_keys": [delegate.seed]},
    }))
    .unwrap();

    let token = Issuer::default().issue_request(&request).unwrap().to_string();
    assert!(!token.contains(&delegate.seed));
    let decoded = DecodedToken::parse(&token).unwrap();
    let keys = decoded.payload["nats"]["signing_keys"].as_object().unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[&delegate.public_identifier], Value::Null);
}

#[test]
fn delegated_scope_object_kept() {
    let top = key(Tier::Top, 1);
    let delegate = generate(Tier::Org).unwrap();
    let scope = json!({
        "kind": "user_scope",
        "key": delegate.seed,
        "role": "ops",
        "template": {},
    });
    let request = IssueRequest::from_json(&json!({
        "iss": top.seed().encode().as_str(),
        "sub": key(Tier::Org, 2).public_identifier().encode(),
        "name": "acme",
        "nats": {"signing_keys": [scope]},
    }))
    .unwrap();

    let token = Issuer::default().issue_request(&request).unwrap().to_string();
    assert!(!token.contains(&delegate.seed));
    let decoded = DecodedToken::parse(&token).unwrap();
    let scope = &decoded.payload["nats"]["signing_keys"][&delegate.public_identifier];
    assert_eq!(scope["key"], delegate.public_identifier.as_str());
    assert_eq!(scope["role"], "ops");
    assert_eq!(scope["template"], json!({}));
}

#[test]
fn user_key_in_org_signing_keys_rejected() {
    let top = key(Tier::Top, 1);
    let user = key(Tier::User, 3);
    let org = key(Tier::Org, 2);
    let result = ClaimsBuilder::new(org.public_identifier(), top.public_identifier(), "acme")
        .extension(json!({"signing_keys": [user.public_identifier().encode()]}))
        .build();
    assert!(matches!(
        result,
        Err(IssueError::DelegatedKeyTier { expected: Tier::Org, actual: Tier::User, .. })
    ));
}

#[test]
fn signing_keys_on_user_rejected() {
    let org = key(Tier::Org, 2);
    let mut map = BTreeMap::new();
    map.insert("iss".to_string(), org.seed().encode().to_string());
    map.insert("sub".to_string(), key(Tier::User, 3).public_identifier().encode());
    map.insert("name".to_string(), "alice".to_string());
    map.insert(
        "nats".to_string(),
        json!({"signing_keys": [org.public_identifier().encode()]}).to_string(),
    );
    let request = IssueRequest::from_flat_map(&map).unwrap();
    let err = Issuer::default().issue_request(&request).unwrap_err();
    assert!(matches!(err, IssueError::ExtensionDecode(_)));
    assert_eq!(err.field(), Some("nats"));
}

// ---------------------------------------------------------------------------
// Request errors
// ---------------------------------------------------------------------------

#[test]
fn corrupted_issuer_seed_names_field() {
    let mut seed = key(Tier::Top, 1).seed().encode().to_string();
    let last = seed.pop().unwrap();
    seed.push(if last == 'A' { 'B' } else { 'A' });

    let request = IssueRequest::from_json(&json!({
        "iss": seed,
        "sub": key(Tier::Org, 2).public_identifier().encode(),
        "name": "acme",
    }))
    .unwrap();
    let err = Issuer::default().issue_request(&request).unwrap_err();
    assert!(matches!(err, IssueError::InvalidSeed { .. }));
    assert_eq!(err.field(), Some("iss"));
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_issuance_matches_serial() {
    let issuer = Arc::new(Issuer::default());
    let top = Arc::new(key(Tier::Top, 1));

    let handles: Vec<_> = (0u8..8)
        .map(|i| {
            let issuer = Arc::clone(&issuer);
            let top = Arc::clone(&top);
            std::thread::spawn(move || {
                let org = key(Tier::Org, 10 + i);
                let claims = ClaimsBuilder::new(org.public_identifier(), top.public_identifier(), "n")
                    .issued_at(1_700_000_000)
                    .build()
                    .unwrap();
                (i, issuer.issue(claims, &top).unwrap().to_string())
            })
        })
        .collect();

    for handle in handles {
        let (i, token) = handle.join().unwrap();
        let expected = issue(HierarchyPolicy::strict(), &key(Tier::Org, 10 + i), &top).unwrap();
        assert_eq!(token, expected);
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn issued_tokens_verify_and_id_recomputes(
            name in "[a-z][a-z0-9-]{0,20}",
            iat in 0i64..4_000_000_000,
            tags in proptest::collection::btree_map("[a-z]{1,8}", 0i32..1000, 0..6),
        ) {
            let top = key(Tier::Top, 1);
            let org = key(Tier::Org, 2);
            let claims = ClaimsBuilder::new(org.public_identifier(), top.public_identifier(), name.as_str())
                .issued_at(iat)
                .extension(json!({"tags": tags}))
                .build()
                .unwrap();
            let token = Issuer::default().issue(claims, &top).unwrap().to_string();

            let (input, sig_segment) = DecodedToken::signing_input(&token).unwrap();
            let signature = Signature::from_segment(&sig_segment).unwrap();
            prop_assert!(verify(&input, &signature, &top.public_identifier()).is_ok());

            let decoded = DecodedToken::parse(&token).unwrap();
            let mut payload = decoded.payload.clone();
            let jti = payload.as_object_mut().unwrap().remove("jti").unwrap();
            let recomputed = claim_digest(&CanonicalBytes::new(&payload).unwrap()).to_base32();
            prop_assert_eq!(jti.as_str().unwrap(), recomputed.as_str());
            prop_assert_eq!(decoded.payload["name"].as_str().unwrap(), name.as_str());
        }
    }
}
