//! # Issuance Hierarchy
//!
//! Which issuer tier may sign claims for which subject tier. The default
//! table is strict:
//!
//! | Subject | Issuer |
//! |---|---|
//! | top | top |
//! | org | top |
//! | user | org |
//!
//! Deployments that let the top authority issue user claims directly opt
//! in with [`HierarchyPolicy::with_direct_user_issuance`] or the matching
//! config flag.

use std::collections::{BTreeMap, BTreeSet};

use trustmint_core::Tier;

use crate::error::IssueError;

/// Table of permitted (subject tier, issuer tier) pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyPolicy {
    rules: BTreeMap<Tier, BTreeSet<Tier>>,
}

impl HierarchyPolicy {
    /// The strict three-rule table.
    pub fn strict() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
        .allow(Tier::Top, Tier::Top)
        .allow(Tier::Org, Tier::Top)
        .allow(Tier::User, Tier::Org)
    }

    /// The strict table plus top-tier issuers for user subjects.
    pub fn with_direct_user_issuance() -> Self {
        Self::strict().allow(Tier::User, Tier::Top)
    }

    /// Add a permitted pair.
    pub fn allow(mut self, subject: Tier, issuer: Tier) -> Self {
        self.rules.entry(subject).or_default().insert(issuer);
        self
    }

    /// Whether `issuer` may issue for `subject`.
    pub fn permits(&self, subject: Tier, issuer: Tier) -> bool {
        self.rules
            .get(&subject)
            .is_some_and(|issuers| issuers.contains(&issuer))
    }

    /// Issuer tiers permitted for `subject`, in tier order.
    pub fn issuers_for(&self, subject: Tier) -> impl Iterator<Item = Tier> + '_ {
        self.rules.get(&subject).into_iter().flatten().copied()
    }

    /// Check a pair, naming both tiers on failure.
    ///
    /// # Errors
    ///
    /// `UnknownSubjectTier` for an unknown subject regardless of rules;
    /// `IssuerHierarchyViolation` for any other unpermitted pair.
    pub fn check(&self, subject: Tier, issuer: Tier) -> Result<(), IssueError> {
        if subject == Tier::Unknown {
            return Err(IssueError::UnknownSubjectTier);
        }
        if !self.permits(subject, issuer) {
            return Err(IssueError::IssuerHierarchyViolation { subject, issuer });
        }
        Ok(())
    }
}

impl Default for HierarchyPolicy {
    fn default() -> Self {
        Self::strict()
    }
}
