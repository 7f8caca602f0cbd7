//! # Seed Codec
//!
//! A seed is 32 bytes of key entropy tagged with its tier. Its text form is
//! base32 over `[marker | tier-hi, tier-lo, entropy[32], crc16-le]`:
//!
//! - The first byte carries the seed marker (`18 << 3`, so every seed starts
//!   with `S`) in its top five bits and the top three bits of the tier byte
//!   in its low three.
//! - The second byte carries the low five bits of the tier byte, shifted
//!   into its top five.
//! - The CRC-16/XMODEM of the first 34 bytes follows, little-endian.
//!
//! Decoding fails unless the checksum, the marker and the tier all agree.
//! Seeds hold secret material; the entropy is zeroized on drop and never
//! printed by `Debug`.

use zeroize::Zeroizing;

use crate::encoding::{append_checksum, base32_decode, base32_encode, strip_checksum};
use crate::error::SeedError;
use crate::tier::Tier;

/// Number of entropy bytes in a seed.
pub const ENTROPY_LEN: usize = 32;

/// Prefix marker shared by all seeds.
const SEED_MARKER: u8 = 18 << 3;

/// Decoded length: two prefix bytes, entropy, two checksum bytes.
const SEED_RAW_LEN: usize = 2 + ENTROPY_LEN + 2;

/// Tier-tagged key entropy.
#[derive(Clone, PartialEq, Eq)]
pub struct Seed {
    tier: Tier,
    entropy: Zeroizing<[u8; ENTROPY_LEN]>,
}

impl Seed {
    /// Wrap raw entropy with its tier.
    pub fn new(tier: Tier, entropy: [u8; ENTROPY_LEN]) -> Self {
        Self {
            tier,
            entropy: Zeroizing::new(entropy),
        }
    }

    /// Parse the textual form.
    pub fn decode(text: &str) -> Result<Self, SeedError> {
        let (tier, entropy) = decode_seed(text)?;
        Ok(Self::new(tier, entropy))
    }

    /// Render the textual form.
    pub fn encode(&self) -> Zeroizing<String> {
        Zeroizing::new(encode_seed(self.tier, &self.entropy))
    }

    /// The tier this seed belongs to.
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// The raw key entropy.
    pub fn entropy(&self) -> &[u8; ENTROPY_LEN] {
        &self.entropy
    }

    /// Cheap syntactic test used to tell seeds from public identifiers
    /// before decoding. A `true` result does not mean the text is valid.
    pub fn looks_like_seed(text: &str) -> bool {
        text.trim_start().starts_with('S')
    }
}

impl std::str::FromStr for Seed {
    type Err = SeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Seed({}, <entropy>)", self.tier)
    }
}

/// Encode a tier and its raw entropy as seed text.
pub fn encode_seed(tier: Tier, entropy: &[u8; ENTROPY_LEN]) -> String {
    let tier_byte = tier.prefix_byte();
    let mut raw = Zeroizing::new(Vec::with_capacity(SEED_RAW_LEN));
    raw.push(SEED_MARKER | (tier_byte >> 5));
    raw.push((tier_byte & 0x1f) << 3);
    raw.extend_from_slice(entropy);
    append_checksum(&mut raw);
    base32_encode(&raw)
}

/// Decode seed text into its tier and raw entropy.
pub fn decode_seed(text: &str) -> Result<(Tier, [u8; ENTROPY_LEN]), SeedError> {
    let raw = Zeroizing::new(base32_decode(text.trim()).map_err(SeedError::Encoding)?);
    if raw.len() != SEED_RAW_LEN {
        return Err(SeedError::Length {
            expected: SEED_RAW_LEN,
            actual: raw.len(),
        });
    }
    let payload = strip_checksum(&raw).ok_or(SeedError::Checksum)?;

    let marker = payload[0] & 0xf8;
    if marker != SEED_MARKER {
        return Err(SeedError::NotSeed(payload[0]));
    }
    let tier_byte = ((payload[0] & 0x07) << 5) | ((payload[1] & 0xf8) >> 3);
    let tier = Tier::from_prefix_byte(tier_byte).ok_or(SeedError::UnrecognizedTier(tier_byte))?;

    let mut entropy = [0u8; ENTROPY_LEN];
    entropy.copy_from_slice(&payload[2..]);
    Ok((tier, entropy))
}
