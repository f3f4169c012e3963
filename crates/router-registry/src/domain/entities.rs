//! # Core Domain Entities
//!
//! The persisted registry snapshot and the envelopes that flow in and out of
//! a single invocation.

use crate::codec::{BitString, Maybe};
use crate::domain::access::AccessGuard;
use crate::domain::dictionary::{RouterDict, RouterStore};
use crate::domain::value_objects::{Address, RouterDescription};
use serde::{Deserialize, Serialize};

// =============================================================================
// REGISTRY SNAPSHOT
// =============================================================================

/// Complete persisted state of the registry actor.
///
/// Handlers take a snapshot by value and return a new one; the host commits
/// it only when the handler succeeds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registry {
    /// Admin and pending admin.
    pub access: AccessGuard,
    /// Registered routers.
    pub routers: RouterStore,
}

impl Registry {
    /// Initial deployment state: no pending transfer, no routers.
    #[must_use]
    pub fn new(admin: Address) -> Self {
        Self {
            access: AccessGuard::new(admin),
            routers: RouterStore::absent(),
        }
    }

    /// Rebuilds a snapshot from its three persisted fields.
    #[must_use]
    pub fn from_parts(admin: Address, next_admin: Address, routers: Maybe<RouterDict>) -> Self {
        Self {
            access: AccessGuard { admin, next_admin },
            routers: RouterStore::from_maybe(routers),
        }
    }

    /// Current admin.
    #[must_use]
    pub fn admin(&self) -> Address {
        self.access.admin
    }

    /// Pending admin, or the sentinel.
    #[must_use]
    pub fn next_admin(&self) -> Address {
        self.access.next_admin
    }

    /// Looks up a router by address hash.
    #[must_use]
    pub fn router(&self, address: &Address) -> Option<&RouterDescription> {
        self.routers.get(&address.dict_key())
    }
}

// =============================================================================
// CONTRACT VERSION
// =============================================================================

/// Version reported by the `version` getter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractVersion {
    /// Major version.
    pub major: u8,
    /// Minor version.
    pub minor: u8,
    /// Pre-release tag, `"release"`, or `"patch<N>"`.
    pub development: String,
}

impl ContractVersion {
    /// Builds a version from semver parts.
    ///
    /// The development string is the pre-release tag when present, otherwise
    /// `"release"` for patch 0 and `"patch<N>"` for any other patch.
    #[must_use]
    pub fn from_parts(major: u8, minor: u8, patch: u32, pre: &str) -> Self {
        let development = if !pre.is_empty() {
            pre.to_string()
        } else if patch == 0 {
            "release".to_string()
        } else {
            format!("patch{patch}")
        };
        Self {
            major,
            minor,
            development,
        }
    }

    /// Version of this build.
    #[must_use]
    pub fn current() -> Self {
        Self::from_parts(
            env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0),
            env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0),
            env!("CARGO_PKG_VERSION_PATCH").parse().unwrap_or(0),
            env!("CARGO_PKG_VERSION_PRE"),
        )
    }
}

// =============================================================================
// ENVELOPES
// =============================================================================

/// One message delivered to the actor by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    /// Sender address as authenticated by the host.
    pub sender: Address,
    /// Value attached to the message.
    pub value: u64,
    /// Set by the host when this is a bounce of an earlier outbound message.
    pub bounced: bool,
    /// Message body.
    pub body: BitString,
}

impl InboundMessage {
    /// A regular (non-bounced) message.
    #[must_use]
    pub fn new(sender: Address, value: u64, body: BitString) -> Self {
        Self {
            sender,
            value,
            bounced: false,
            body,
        }
    }
}

/// Fire-and-forget message queued for the host to deliver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Recipient.
    pub destination: Address,
    /// Remaining inbound value carried along; fees are the host's concern.
    pub value: u64,
    /// Message body.
    pub body: BitString,
}

/// Side effect requested by a successful transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Queue a message.
    SendMessage(OutboundMessage),
    /// Replace the actor's code.
    SetCode(BitString),
}

/// Result of a successful handler: the new snapshot and its actions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    /// Snapshot to commit.
    pub registry: Registry,
    /// Actions to perform after the commit, in order.
    pub actions: Vec<Action>,
}

impl Transition {
    /// A transition with no actions.
    #[must_use]
    pub fn state_only(registry: Registry) -> Self {
        Self {
            registry,
            actions: Vec::new(),
        }
    }

    /// Outbound messages among the actions.
    pub fn messages(&self) -> impl Iterator<Item = &OutboundMessage> {
        self.actions.iter().filter_map(|action| match action {
            Action::SendMessage(msg) => Some(msg),
            Action::SetCode(_) => None,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
