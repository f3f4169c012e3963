//! # Access Guard
//!
//! Admin ownership with a two-phase transfer: the admin nominates a candidate,
//! and only that candidate can accept.

use crate::domain::value_objects::Address;
use crate::errors::AccessDenied;
use serde::{Deserialize, Serialize};

/// Current admin and the pending candidate ([`Address::SENTINEL`] if none).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGuard {
    /// Current admin.
    pub admin: Address,
    /// Pending admin, or the sentinel.
    pub next_admin: Address,
}

impl AccessGuard {
    /// A guard with no pending transfer.
    #[must_use]
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            next_admin: Address::SENTINEL,
        }
    }

    /// Returns true if a transfer is pending.
    #[must_use]
    pub fn has_pending_transfer(&self) -> bool {
        !self.next_admin.is_sentinel()
    }

    /// Fails unless `caller` is the admin.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied::NotAdmin` on mismatch.
    pub fn ensure_admin(&self, caller: &Address) -> Result<(), AccessDenied> {
        if *caller == self.admin {
            Ok(())
        } else {
            Err(AccessDenied::NotAdmin)
        }
    }

    /// Nominates `candidate`; replaces any earlier nomination.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied::NotAdmin` if `caller` is not the admin.
    pub fn give_ownership(&mut self, caller: &Address, candidate: Address) -> Result<(), AccessDenied> {
        self.ensure_admin(caller)?;
        self.next_admin = candidate;
        Ok(())
    }

    /// Completes a pending transfer.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied::NotNextAdmin` if no transfer is pending or
    /// `caller` is not the candidate.
    pub fn take_ownership(&mut self, caller: &Address) -> Result<(), AccessDenied> {
        if !self.has_pending_transfer() || *caller != self.next_admin {
            return Err(AccessDenied::NotNextAdmin);
        }
        self.admin = self.next_admin;
        self.next_admin = Address::SENTINEL;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::basechain([byte; 32])
    }

    #[test]
    fn test_give_then_take() {
        let mut guard = AccessGuard::new(addr(1));
        guard.give_ownership(&addr(1), addr(2)).unwrap();
        assert_eq!(guard.admin, addr(1));
        assert_eq!(guard.next_admin, addr(2));

        guard.take_ownership(&addr(2)).unwrap();
        assert_eq!(guard.admin, addr(2));
        assert!(!guard.has_pending_transfer());
    }

    #[test]
    fn test_give_requires_admin() {
        let mut guard = AccessGuard::new(addr(1));
        assert_eq!(
            guard.give_ownership(&addr(3), addr(3)),
            Err(AccessDenied::NotAdmin)
        );
        assert_eq!(guard, AccessGuard::new(addr(1)));
    }

    #[test]
    fn test_take_without_pending_transfer() {
        let mut guard = AccessGuard::new(addr(1));
        assert_eq!(guard.take_ownership(&addr(1)), Err(AccessDenied::NotNextAdmin));
        // The sentinel itself can never complete a transfer.
        assert_eq!(
            guard.take_ownership(&Address::SENTINEL),
            Err(AccessDenied::NotNextAdmin)
        );
    }

    #[test]
    fn test_only_candidate_can_take() {
        let mut guard = AccessGuard::new(addr(1));
        guard.give_ownership(&addr(1), addr(2)).unwrap();
        assert_eq!(guard.take_ownership(&addr(1)), Err(AccessDenied::NotNextAdmin));
        assert_eq!(guard.take_ownership(&addr(9)), Err(AccessDenied::NotNextAdmin));
        assert_eq!(guard.next_admin, addr(2));
    }

    #[test]
    fn test_renomination_replaces_candidate() {
        let mut guard = AccessGuard::new(addr(1));
        guard.give_ownership(&addr(1), addr(2)).unwrap();
        guard.give_ownership(&addr(1), addr(3)).unwrap();
        assert_eq!(guard.take_ownership(&addr(2)), Err(AccessDenied::NotNextAdmin));
        guard.take_ownership(&addr(3)).unwrap();
        assert_eq!(guard.admin, addr(3));
    }
}
