//! # Seed Generation
//!
//! Produces fresh seeds for a requested tier and the exported view a caller
//! needs to store them: seed text, public identifier, and the raw Ed25519
//! key bytes (unpadded standard base64).
//!
//! `GeneratedKey::from_seed` rebuilds the same view from an existing seed,
//! which is what a caller does when re-reading or importing a stored key.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use trustmint_core::{Seed, Tier, ENTROPY_LEN};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::keys::KeyPair;

/// Exported key material for one seed.
#[derive(Clone, Serialize)]
pub struct GeneratedKey {
    /// Tier of the key.
    pub tier: Tier,
    /// Seed text. Secret.
    pub seed: String,
    /// Public identifier text.
    pub public_identifier: String,
    /// Raw 32-byte public key, base64 without padding.
    pub public_key: String,
    /// Expanded 64-byte private key, base64 without padding. Secret.
    pub private_key: String,
}

impl GeneratedKey {
    /// Rebuild the exported view from existing seed text.
    pub fn from_seed(text: &str) -> Result<Self, CryptoError> {
        let keypair = KeyPair::from_seed_text(text)?;
        if keypair.tier() == Tier::Unknown {
            return Err(CryptoError::UnsupportedTier(Tier::Unknown));
        }
        Ok(Self::from_keypair(&keypair))
    }

    fn from_keypair(keypair: &KeyPair) -> Self {
        Self {
            tier: keypair.tier(),
            seed: keypair.seed().encode().to_string(),
            public_identifier: keypair.public_identifier().to_string(),
            public_key: keypair.public_key_b64(),
            private_key: keypair.private_key_b64().to_string(),
        }
    }
}

impl Drop for GeneratedKey {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.seed.zeroize();
        self.private_key.zeroize();
    }
}

impl std::fmt::Debug for GeneratedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedKey")
            .field("tier", &self.tier)
            .field("public_identifier", &self.public_identifier)
            .field("seed", &"<secret>")
            .field("private_key", &"<secret>")
            .finish()
    }
}

/// Generate a fresh seed for `tier` from the OS random source.
///
/// # Errors
///
/// `UnsupportedTier` for `Tier::Unknown`.
pub fn generate(tier: Tier) -> Result<GeneratedKey, CryptoError> {
    if tier == Tier::Unknown {
        return Err(CryptoError::UnsupportedTier(tier));
    }
    let mut entropy = Zeroizing::new([0u8; ENTROPY_LEN]);
    OsRng.fill_bytes(&mut entropy[..]);
    let keypair = KeyPair::from_seed(&Seed::new(tier, *entropy));
    let key = GeneratedKey::from_keypair(&keypair);
    tracing::debug!(tier = %tier, public_identifier = %key.public_identifier, "generated seed");
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_each_tier() {
        for (tier, tag) in [(Tier::Top, "SO"), (Tier::Org, "SA"), (Tier::User, "SU")] {
            let key = generate(tier).unwrap();
            assert_eq!(key.tier, tier);
            assert!(key.seed.starts_with(tag));
            assert!(key.public_identifier.starts_with(tier.tag()));
            assert_eq!(key.public_key.len(), 43);
            assert_eq!(key.private_key.len(), 86);
        }
    }

    #[test]
    fn test_generate_unknown_rejected() {
        assert_eq!(
            generate(Tier::Unknown).unwrap_err(),
            CryptoError::UnsupportedTier(Tier::Unknown)
        );
    }

    #[test]
    fn test_generated_seeds_differ() {
        let a = generate(Tier::User).unwrap();
        let b = generate(Tier::User).unwrap();
        assert_ne!(a.seed, b.seed);
    }

    #[test]
    fn test_from_seed_reproduces_view() {
        let key = generate(Tier::Org).unwrap();
        let again = GeneratedKey::from_seed(&key.seed).unwrap();
        assert_eq!(again.public_identifier, key.public_identifier);
        assert_eq!(again.public_key, key.public_key);
        assert_eq!(again.private_key, key.private_key);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let key = generate(Tier::User).unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains(&key.seed));
        assert!(!debug.contains(&key.private_key));
        assert!(debug.contains(&key.public_identifier));
    }

    #[test]
    fn test_serializes_all_fields() {
        let key = generate(Tier::Org).unwrap();
        let json = serde_json::to_value(&key).unwrap();
        assert_eq!(json["tier"], "org");
        assert_eq!(json["seed"], key.seed.as_str());
        assert_eq!(json["public_identifier"], key.public_identifier.as_str());
    }
}
