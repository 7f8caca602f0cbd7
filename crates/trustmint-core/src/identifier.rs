//! # Public Identifiers
//!
//! The public half of a key, as it appears in the `sub` and `iss` claims and
//! in delegated signing-key lists. Text form is base32 over
//! `[tier byte, public key[32], crc16-le]`, 56 characters, starting with the
//! tier tag.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::encoding::{append_checksum, base32_decode, base32_encode, strip_checksum};
use crate::error::SeedError;
use crate::tier::Tier;

/// Length of the raw public key.
pub const PUBLIC_KEY_LEN: usize = 32;

const IDENTIFIER_RAW_LEN: usize = 1 + PUBLIC_KEY_LEN + 2;

/// A tier-tagged public key.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicIdentifier {
    tier: Tier,
    key: [u8; PUBLIC_KEY_LEN],
}

impl PublicIdentifier {
    /// Tag a raw public key with its tier.
    pub fn new(tier: Tier, key: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self { tier, key }
    }

    /// Parse the textual form.
    pub fn parse(text: &str) -> Result<Self, SeedError> {
        let raw = base32_decode(text.trim()).map_err(SeedError::Encoding)?;
        if raw.len() != IDENTIFIER_RAW_LEN {
            return Err(SeedError::Length {
                expected: IDENTIFIER_RAW_LEN,
                actual: raw.len(),
            });
        }
        let payload = strip_checksum(&raw).ok_or(SeedError::Checksum)?;
        let tier = Tier::from_prefix_byte(payload[0])
            .ok_or(SeedError::UnrecognizedTier(payload[0]))?;
        let mut key = [0u8; PUBLIC_KEY_LEN];
        key.copy_from_slice(&payload[1..]);
        Ok(Self { tier, key })
    }

    /// Render the textual form.
    pub fn encode(&self) -> String {
        let mut raw = Vec::with_capacity(IDENTIFIER_RAW_LEN);
        raw.push(self.tier.prefix_byte());
        raw.extend_from_slice(&self.key);
        append_checksum(&mut raw);
        base32_encode(&raw)
    }

    /// The tier of the key.
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// The raw 32-byte public key.
    pub fn key_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.key
    }
}

impl std::str::FromStr for PublicIdentifier {
    type Err = SeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for PublicIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

impl std::fmt::Debug for PublicIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicIdentifier({})", self.encode())
    }
}

impl Serialize for PublicIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for PublicIdentifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
