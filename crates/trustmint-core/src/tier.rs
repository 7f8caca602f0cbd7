//! # Trust Tiers
//!
//! The issuance hierarchy is a strict chain: a top-level authority issues
//! organizational accounts, and organizations issue users. Each tier has a
//! prefix byte that is embedded in every seed and public identifier, so the
//! tier of any key can be read from its text alone.
//!
//! The prefix bytes are chosen so that the first base32 character of a
//! public identifier names its tier: `O` (top), `A` (org), `U` (user),
//! `Z` (unknown).

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A position in the trust hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// Top-level authority ("operator"). Issues top and org claims.
    Top,
    /// Organizational account. Issues user claims.
    Org,
    /// Individual user. Never issues.
    User,
    /// A validly encoded key whose tier has no place in the hierarchy.
    Unknown,
}

impl Tier {
    /// The three tiers that can be the subject of a claim.
    pub const ISSUABLE: [Tier; 3] = [Tier::Top, Tier::Org, Tier::User];

    /// Prefix byte embedded in seeds and public identifiers.
    pub const fn prefix_byte(self) -> u8 {
        match self {
            Self::Top => 14 << 3,
            Self::Org => 0,
            Self::User => 20 << 3,
            Self::Unknown => 25 << 3,
        }
    }

    /// Resolve a prefix byte back to its tier.
    pub fn from_prefix_byte(byte: u8) -> Option<Self> {
        [Self::Top, Self::Org, Self::User, Self::Unknown]
            .into_iter()
            .find(|tier| tier.prefix_byte() == byte)
    }

    /// Leading character of a public identifier of this tier.
    pub const fn tag(self) -> char {
        match self {
            Self::Top => 'O',
            Self::Org => 'A',
            Self::User => 'U',
            Self::Unknown => 'Z',
        }
    }

    /// Lowercase name used in configuration and diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Org => "org",
            Self::User => "user",
            Self::Unknown => "unknown",
        }
    }

    /// The `type` value written into a claim payload of this tier.
    pub const fn claim_type(self) -> Option<&'static str> {
        match self {
            Self::Top => Some("operator"),
            Self::Org => Some("account"),
            Self::User => Some("user"),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    /// Accepts the tier names and the legacy role names
    /// (`operator`, `account`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" | "operator" => Ok(Self::Top),
            "org" | "account" => Ok(Self::Org),
            "user" => Ok(Self::User),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!(
                "unknown tier \"{other}\" (expected top, org, or user)"
            )),
        }
    }
}

impl Serialize for Tier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Tier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::base32_encode;

    #[test]
    fn test_prefix_byte_roundtrip() {
        for tier in [Tier::Top, Tier::Org, Tier::User, Tier::Unknown] {
            assert_eq!(Tier::from_prefix_byte(tier.prefix_byte()), Some(tier));
        }
        assert_eq!(Tier::from_prefix_byte(18 << 3), None);
        assert_eq!(Tier::from_prefix_byte(1), None);
    }

    #[test]
    fn test_tag_matches_first_base32_character() {
        for tier in [Tier::Top, Tier::Org, Tier::User, Tier::Unknown] {
            let encoded = base32_encode(&[tier.prefix_byte(), 0]);
            assert_eq!(encoded.chars().next(), Some(tier.tag()));
        }
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("top".parse::<Tier>().unwrap(), Tier::Top);
        assert_eq!("Operator".parse::<Tier>().unwrap(), Tier::Top);
        assert_eq!("account".parse::<Tier>().unwrap(), Tier::Org);
        assert_eq!(" USER ".parse::<Tier>().unwrap(), Tier::User);
        assert!("server".parse::<Tier>().is_err());
    }

    #[test]
    fn test_serde_as_lowercase_string() {
        let json = serde_json::to_string(&Tier::Org).unwrap();
        assert_eq!(json, "\"org\"");
        let back: Tier = serde_json::from_str("\"operator\"").unwrap();
        assert_eq!(back, Tier::Top);
    }

    #[test]
    fn test_claim_type() {
        assert_eq!(Tier::Top.claim_type(), Some("operator"));
        assert_eq!(Tier::Org.claim_type(), Some("account"));
        assert_eq!(Tier::User.claim_type(), Some("user"));
        assert_eq!(Tier::Unknown.claim_type(), None);
    }
}
