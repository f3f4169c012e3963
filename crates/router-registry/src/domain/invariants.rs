//! # Domain Invariants
//!
//! Properties every committed registry snapshot must satisfy:
//!
//! - Routers are absent or non-empty, never present-but-empty
//! - The admin is a real address, never the sentinel
//!
//! A single `next_admin` field means there is never more than one pending
//! transfer, so that property needs no runtime check.

use crate::codec::Maybe;
use crate::domain::entities::Registry;
use std::fmt;

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// The router store collapses to absent when empty.
#[must_use]
pub fn check_routers_canonical_invariant(registry: &Registry) -> bool {
    match registry.routers.as_maybe() {
        Maybe::Nothing => true,
        Maybe::Just(dict) => !dict.is_empty(),
    }
}

/// The admin is never the sentinel.
#[must_use]
pub fn check_admin_invariant(registry: &Registry) -> bool {
    !registry.admin().is_sentinel()
}

/// Check all invariants at once.
#[must_use]
pub fn check_all_invariants(registry: &Registry) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_routers_canonical_invariant(registry) {
        violations.push(InvariantViolation::RoutersPresentButEmpty);
    }

    if !check_admin_invariant(registry) {
        violations.push(InvariantViolation::AdminIsSentinel);
    }

    InvariantCheckResult { violations }
}

// =============================================================================
// RESULT TYPES
// =============================================================================

/// A broken snapshot invariant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// `routers` is `Just` an empty map.
    RoutersPresentButEmpty,
    /// `admin` is the sentinel address.
    AdminIsSentinel,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoutersPresentButEmpty => write!(f, "routers present but empty"),
            Self::AdminIsSentinel => write!(f, "admin is the sentinel address"),
        }
    }
}

/// Outcome of [`check_all_invariants`].
#[derive(Clone, Debug, Default)]
pub struct InvariantCheckResult {
    /// Every violation found.
    pub violations: Vec<InvariantViolation>,
}

impl InvariantCheckResult {
    /// Returns true if nothing was violated.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for InvariantCheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.violations.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(", "))
    }
}

// =============================================================================
// TESTS
// =============================================================================
