//! # Driven Ports (SPI - Outbound)
//!
//! What the registry needs from its host:
//! - Persisted account (code + data snapshot)
//! - Delivery of outbound messages

use crate::codec::BitString;
use crate::domain::entities::OutboundMessage;
use crate::errors::StoreError;

/// Code and data of the actor's account.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountSnapshot {
    /// Executable code.
    pub code: BitString,
    /// Encoded registry snapshot.
    pub data: BitString,
}

/// Persisted account state.
///
/// `load` is called once per invocation; `commit` only after the handler
/// succeeded, with the complete new snapshot.
pub trait AccountStore {
    /// Reads the current account.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotDeployed` before the first commit.
    fn load(&self) -> Result<AccountSnapshot, StoreError>;

    /// Replaces the account atomically.
    fn commit(&mut self, snapshot: AccountSnapshot);
}

/// Fire-and-forget queue of outbound messages.
pub trait MessageSink {
    /// Queues one message; delivery is the host's concern.
    fn enqueue(&mut self, message: OutboundMessage);
}
