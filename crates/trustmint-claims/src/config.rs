//! # Engine Configuration
//!
//! YAML configuration for the issuance engine. Everything has a default,
//! so an absent file and an empty file both give the strict hierarchy.
//!
//! ```yaml
//! hierarchy:
//!   allow_direct_user_issuance: true
//!   extra_rules:
//!     - subject: org
//!       issuer: org
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use trustmint_core::Tier;

use crate::error::ConfigError;
use crate::hierarchy::HierarchyPolicy;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub hierarchy: HierarchyConfig,
}

/// Issuance hierarchy settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HierarchyConfig {
    /// Let top-tier issuers sign user claims.
    #[serde(default)]
    pub allow_direct_user_issuance: bool,
    /// Additional permitted pairs on top of the strict table.
    #[serde(default)]
    pub extra_rules: Vec<IssuanceRule>,
}

/// One permitted (subject, issuer) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IssuanceRule {
    pub subject: Tier,
    pub issuer: Tier,
}

impl EngineConfig {
    /// Parse configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load configuration from `path`. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        Self::from_yaml_str(&text)
    }

    /// The hierarchy policy this configuration describes.
    pub fn policy(&self) -> HierarchyPolicy {
        let base = if self.hierarchy.allow_direct_user_issuance {
            HierarchyPolicy::with_direct_user_issuance()
        } else {
            HierarchyPolicy::strict()
        };
        self.hierarchy
            .extra_rules
            .iter()
            .fold(base, |policy, rule| policy.allow(rule.subject, rule.issuer))
    }
}
