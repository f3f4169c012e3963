//! # Driving Ports (API - Inbound)
//!
//! The interface the hosting environment uses to run the registry: deliver a
//! message, read the getters.

use crate::domain::entities::{ContractVersion, InboundMessage, Registry};
use crate::errors::RegistryError;

/// Outcome of one invocation as seen by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionReceipt {
    /// `0` on success, otherwise the error's exit code.
    pub exit_code: u32,
    /// Messages queued for delivery.
    pub messages_sent: usize,
    /// Whether the code was replaced.
    pub code_updated: bool,
}

impl ExecutionReceipt {
    /// Returns true if the invocation committed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code == crate::errors::exit_codes::SUCCESS
    }
}

/// Primary API of the registry actor.
///
/// Invocations never overlap: `handle_message` takes `&mut self`, so exclusive
/// access comes from the borrow, not from a lock.
pub trait RegistryApi {
    /// Runs one inbound message to completion and commits or aborts it.
    fn handle_message(&mut self, message: InboundMessage) -> ExecutionReceipt;

    /// Getter: the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Store` if the snapshot cannot be read.
    fn registry_data(&self) -> Result<Registry, RegistryError>;

    /// Getter: the contract version.
    fn version(&self) -> ContractVersion;
}
