//! # Key Derivation and Signing
//!
//! `KeyPair::derive` turns a tier and 32 bytes of seed entropy into an
//! Ed25519 signing key. The entropy is used directly as the RFC 8032 secret
//! seed, so derivation is deterministic and matches any other Ed25519
//! implementation fed the same seed.
//!
//! ## Invariants
//!
//! - Signing input MUST be a `&SigningInput` (`header.payload`). There is no
//!   way to sign arbitrary bytes through this API.
//! - `KeyPair` does not implement `Serialize`; raw private bytes leave only
//!   through the explicit `private_key_b64()` export.

use ed25519_dalek::{Signer, Verifier};
use trustmint_core::encoding::base64_encode;
use trustmint_core::{PublicIdentifier, Seed, Segment, SigningInput, Tier, ENTROPY_LEN};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// An Ed25519 signature (64 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature([u8; 64]);

/// A tier-tagged Ed25519 key pair derived from seed entropy.
pub struct KeyPair {
    tier: Tier,
    signing_key: ed25519_dalek::SigningKey,
}

// ---------------------------------------------------------------------------
// Signature impls
// ---------------------------------------------------------------------------

impl Signature {
    /// Create a signature from raw 64 bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Return the raw 64-byte signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Encode as the third token segment.
    pub fn to_segment(&self) -> Segment {
        Segment::encode_raw(&self.0)
    }

    /// Decode from a token's signature segment.
    pub fn from_segment(segment: &Segment) -> Result<Self, CryptoError> {
        let bytes = segment
            .decode()
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
        let arr: [u8; 64] = bytes.as_slice().try_into().map_err(|_| {
            CryptoError::InvalidSignature(format!(
                "signature must be 64 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.0.iter().take(4).map(|b| format!("{b:02x}")).collect();
        write!(f, "Signature({prefix}...)")
    }
}

// ---------------------------------------------------------------------------
// KeyPair impls
// ---------------------------------------------------------------------------

impl KeyPair {
    /// Derive a key pair from raw entropy.
    ///
    /// # Errors
    ///
    /// `MalformedEntropy` unless `entropy` is exactly 32 bytes.
    pub fn derive(tier: Tier, entropy: &[u8]) -> Result<Self, CryptoError> {
        let secret: &[u8; ENTROPY_LEN] = entropy
            .try_into()
            .map_err(|_| CryptoError::MalformedEntropy(entropy.len()))?;
        Ok(Self {
            tier,
            signing_key: ed25519_dalek::SigningKey::from_bytes(secret),
        })
    }

    /// Derive a key pair from a decoded seed.
    pub fn from_seed(seed: &Seed) -> Self {
        Self {
            tier: seed.tier(),
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed.entropy()),
        }
    }

    /// Decode seed text and derive its key pair.
    pub fn from_seed_text(text: &str) -> Result<Self, CryptoError> {
        let seed = Seed::decode(text)?;
        Ok(Self::from_seed(&seed))
    }

    /// The tier this key pair belongs to.
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// The tier-tagged public identifier.
    pub fn public_identifier(&self) -> PublicIdentifier {
        PublicIdentifier::new(self.tier, self.signing_key.verifying_key().to_bytes())
    }

    /// Re-encode the seed this key pair was derived from.
    pub fn seed(&self) -> Seed {
        Seed::new(self.tier, self.signing_key.to_bytes())
    }

    /// Sign a token's `header.payload`.
    pub fn sign(&self, input: &SigningInput) -> Signature {
        let sig = self.signing_key.sign(input.as_bytes());
        Signature(sig.to_bytes())
    }

    /// Raw 32-byte public key, unpadded standard base64.
    pub fn public_key_b64(&self) -> String {
        base64_encode(self.signing_key.verifying_key().as_bytes())
    }

    /// Expanded 64-byte private key (secret seed followed by public key),
    /// unpadded standard base64.
    pub fn private_key_b64(&self) -> Zeroizing<String> {
        let bytes = Zeroizing::new(self.signing_key.to_keypair_bytes());
        Zeroizing::new(base64_encode(bytes.as_slice()))
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyPair({}, <private>)", self.tier)
    }
}

// ---------------------------------------------------------------------------
// Reference resolution and verification
// ---------------------------------------------------------------------------

/// Resolve a key reference to its public identifier.
///
/// Accepts either seed text (the key pair is derived and its public half
/// returned) or public identifier text.
pub fn public_identifier_of(text: &str) -> Result<PublicIdentifier, CryptoError> {
    if Seed::looks_like_seed(text) {
        Ok(KeyPair::from_seed_text(text)?.public_identifier())
    } else {
        Ok(PublicIdentifier::parse(text)?)
    }
}

/// Check an Ed25519 signature over a signing input.
///
/// This checks one signature against one known key. It does not walk a
/// chain of issuers.
pub fn verify(
    input: &SigningInput,
    signature: &Signature,
    signer: &PublicIdentifier,
) -> Result<(), CryptoError> {
    let vk = ed25519_dalek::VerifyingKey::from_bytes(signer.key_bytes())
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    vk.verify(input.as_bytes(), &sig)
        .map_err(|e| CryptoError::VerificationFailed(format!("Ed25519 verification failed: {e}")))
}
