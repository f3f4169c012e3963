//! # Registry Service
//!
//! Host-side wrapper that runs one invocation at a time:
//!
//! 1. Load the account and decode the snapshot
//! 2. Decode the inbound body and dispatch it
//! 3. On success, commit code + data and queue outbound messages
//! 4. On failure, commit nothing and report the exit code
//!
//! The snapshot is only ever replaced as a whole, so a failed invocation
//! leaves no trace in the store.

use crate::codec::{decode, encode, BitString};
use crate::config::RegistryConfig;
use crate::domain::entities::{Action, ContractVersion, InboundMessage, Registry, Transition};
use crate::domain::invariants::check_all_invariants;
use crate::domain::value_objects::Address;
use crate::errors::{exit_codes, RegistryError, StoreError};
use crate::messages::InboundBody;
use crate::ports::inbound::{ExecutionReceipt, RegistryApi};
use crate::ports::outbound::{AccountSnapshot, AccountStore, MessageSink};
use crate::state_machine::{self, InvocationContext};

use tracing::{debug, info, instrument, warn};

/// Statistics for the Registry Service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Total inbound messages handled.
    pub messages_processed: u64,
    /// Invocations that committed.
    pub successful: u64,
    /// Invocations that aborted.
    pub failed: u64,
    /// Aborts caused by the ownership guard.
    pub rejected_access: u64,
    /// Outbound messages queued.
    pub outbound_sent: u64,
    /// Code replacements.
    pub code_updates: u64,
}

/// The registry actor bound to a store and a message sink.
pub struct RegistryService<S: AccountStore, M: MessageSink> {
    /// Service configuration.
    config: RegistryConfig,
    /// Persisted account.
    store: S,
    /// Outbound queue.
    sink: M,
    /// Service statistics.
    stats: ServiceStats,
}

impl<S: AccountStore, M: MessageSink> RegistryService<S, M> {
    /// Attaches to an already deployed account.
    pub fn new(store: S, sink: M, config: RegistryConfig) -> Self {
        Self {
            config,
            store,
            sink,
            stats: ServiceStats::default(),
        }
    }

    /// Writes the initial account `{admin, sentinel, no routers}` and attaches to it.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvariantViolated` if `admin` is the sentinel.
    pub fn deploy(
        admin: Address,
        code: BitString,
        mut store: S,
        sink: M,
        config: RegistryConfig,
    ) -> Result<Self, RegistryError> {
        let registry = Registry::new(admin);
        let check = check_all_invariants(&registry);
        if !check.is_ok() {
            return Err(RegistryError::InvariantViolated(check.to_string()));
        }
        store.commit(AccountSnapshot {
            code,
            data: encode(&registry)?,
        });
        info!(admin = %admin, "Registry deployed");
        Ok(Self::new(store, sink, config))
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> &ServiceStats {
        &self.stats
    }

    /// Service configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The account store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The message sink.
    #[must_use]
    pub fn sink(&self) -> &M {
        &self.sink
    }

    /// Mutable access to the message sink, e.g. to drain it.
    pub fn sink_mut(&mut self) -> &mut M {
        &mut self.sink
    }

    /// Current account code.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Store` if the account cannot be read.
    pub fn code(&self) -> Result<BitString, RegistryError> {
        Ok(self.store.load()?.code)
    }

    fn load_registry(&self) -> Result<(AccountSnapshot, Registry), RegistryError> {
        let account = self.store.load()?;
        let registry = decode(&account.data).map_err(StoreError::Corrupted)?;
        Ok((account, registry))
    }

    /// Runs the handler without touching the store.
    fn execute(
        &self,
        message: &InboundMessage,
    ) -> Result<(AccountSnapshot, Transition), RegistryError> {
        let (account, registry) = self.load_registry()?;
        let body = InboundBody::decode(&message.body)?;
        match &body {
            InboundBody::Message(m) => debug!(
                op = m.name(),
                opcode = m.opcode(),
                query_id = m.query_id(),
                "Dispatching registry message"
            ),
            InboundBody::Empty => debug!("Empty body, nothing to do"),
            InboundBody::Unknown { opcode } => debug!(opcode = *opcode, "Unknown opcode"),
        }

        let ctx = InvocationContext {
            sender: message.sender,
            value: message.value,
        };
        let transition = state_machine::apply(registry, &ctx, body, &self.config)?;

        if self.config.check_invariants {
            let check = check_all_invariants(&transition.registry);
            if !check.is_ok() {
                return Err(RegistryError::InvariantViolated(check.to_string()));
            }
        }

        let next = AccountSnapshot {
            code: account.code,
            data: encode(&transition.registry)?,
        };
        Ok((next, transition))
    }

    /// Applies the actions, commits, then queues outbound messages.
    fn commit(&mut self, mut account: AccountSnapshot, transition: Transition) -> ExecutionReceipt {
        let mut outbound = Vec::new();
        let mut code_updated = false;
        for action in transition.actions {
            match action {
                Action::SetCode(code) => {
                    account.code = code;
                    code_updated = true;
                }
                Action::SendMessage(message) => outbound.push(message),
            }
        }

        self.store.commit(account);

        let messages_sent = outbound.len();
        for message in outbound {
            debug!(destination = %message.destination, "Queueing outbound message");
            self.sink.enqueue(message);
        }

        self.stats.successful += 1;
        self.stats.outbound_sent += messages_sent as u64;
        if code_updated {
            self.stats.code_updates += 1;
            info!("Registry code replaced");
        }

        ExecutionReceipt {
            exit_code: exit_codes::SUCCESS,
            messages_sent,
            code_updated,
        }
    }
}

impl<S: AccountStore, M: MessageSink> RegistryApi for RegistryService<S, M> {
    #[instrument(skip(self, message), fields(sender = %message.sender, value = message.value))]
    fn handle_message(&mut self, message: InboundMessage) -> ExecutionReceipt {
        self.stats.messages_processed += 1;

        if message.bounced {
            debug!("Ignoring bounced message");
            self.stats.successful += 1;
            return ExecutionReceipt {
                exit_code: exit_codes::SUCCESS,
                messages_sent: 0,
                code_updated: false,
            };
        }

        match self.execute(&message) {
            Ok((account, transition)) => {
                let receipt = self.commit(account, transition);
                debug!(messages_sent = receipt.messages_sent, "Invocation committed");
                receipt
            }
            Err(err) => {
                let exit_code = err.exit_code();
                if err.is_access_denied() {
                    self.stats.rejected_access += 1;
                }
                warn!(error = %err, exit_code, "Invocation aborted");
                self.stats.failed += 1;
                ExecutionReceipt {
                    exit_code,
                    messages_sent: 0,
                    code_updated: false,
                }
            }
        }
    }

    fn registry_data(&self) -> Result<Registry, RegistryError> {
        self.load_registry().map(|(_, registry)| registry)
    }

    fn version(&self) -> ContractVersion {
        ContractVersion::current()
    }
}

// =============================================================================
// TESTS
// =============================================================================
