//! # Memory Store
//!
//! In-memory account store.

use crate::errors::StoreError;
use crate::ports::outbound::{AccountSnapshot, AccountStore};

/// Account kept in process memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAccountStore {
    account: Option<AccountSnapshot>,
    commits: u64,
}

impl InMemoryAccountStore {
    /// Creates an empty (undeployed) store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commits so far, deployment included.
    #[must_use]
    pub fn commits(&self) -> u64 {
        self.commits
    }
}

impl AccountStore for InMemoryAccountStore {
    fn load(&self) -> Result<AccountSnapshot, StoreError> {
        self.account.clone().ok_or(StoreError::NotDeployed)
    }

    fn commit(&mut self, snapshot: AccountSnapshot) {
        self.account = Some(snapshot);
        self.commits += 1;
    }
}

// =============================================================================
// TESTS
// =============================================================================
