//! # Router Registry - Admin-Controlled Router Directory
//!
//! A single message-driven actor that keeps a persistent map from router
//! address to router description, guarded by a two-step ownership transfer.
//!
//! ## Purpose
//!
//! Other actors ask the registry whether an address is a known router
//! (`ValidateRouter`) or for the full set (`GetAllRouters`). The admin adds,
//! removes and replaces routers, hands over ownership, and can replace the
//! actor's code.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Router set is absent, never present-but-empty | `domain/dictionary.rs` - `RouterStore` |
//! | Admin is never the sentinel | `domain/invariants.rs` - `check_admin_invariant()` |
//! | Failed invocations change nothing | `service.rs` - commit only on success |
//! | Only basechain routers via `AddRouter` | `state_machine.rs` - `add_router()` |
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 9 | Malformed message or snapshot |
//! | 123 | Router not found |
//! | 124 | Not admin |
//! | 125 | Invalid router workchain |
//! | 126 | Not next admin |
//! | 127 | Not enough value for the response |
//! | `0xFFFF` | Unknown operation |
//!
//! ## Layout
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Codec | `codec/` | Bit strings, references, dictionaries |
//! | Messages | `messages.rs` | Opcodes and message records |
//! | State machine | `state_machine.rs` | One handler per message |
//! | Service | `service.rs` | Load, dispatch, commit |
//! | Adapters | `adapters/` | In-memory store and outbox |
//!
//! ## Usage Example
//!
//! ```ignore
//! use router_registry::prelude::*;
//!
//! let mut registry = RegistryService::deploy(
//!     admin,
//!     code,
//!     InMemoryAccountStore::new(),
//!     RecordingOutbox::new(),
//!     RegistryConfig::default(),
//! )?;
//!
//! let body = encode(&RegistryMessage::AddRouter(add))?;
//! let receipt = registry.handle_message(InboundMessage::new(admin, 50_000_000, body));
//! assert!(receipt.is_success());
//! ```

// Crate-level lints
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::missing_errors_doc)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod codec;
pub mod config;
pub mod domain;
pub mod errors;
pub mod messages;
pub mod ports;
pub mod service;
pub mod state_machine;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Codec
    pub use crate::codec::{
        decode, encode, BitReader, BitString, BitWriter, Load, Maybe, PackedRouterDict, Store,
    };

    // Domain
    pub use crate::domain::dictionary::{RouterDict, RouterStore};
    pub use crate::domain::entities::{
        Action, ContractVersion, InboundMessage, OutboundMessage, Registry, Transition,
    };
    pub use crate::domain::invariants::{
        check_all_invariants, InvariantCheckResult, InvariantViolation,
    };
    pub use crate::domain::value_objects::{
        Address, DevelopmentTag, QueryId, RouterDescription, RouterVersion, U256,
    };

    // Messages
    pub use crate::messages::{
        opcodes, AddRouter, AddRouterBatch, AllRoutersMessage, GetAllRouters, GiveOwnership,
        InboundBody, RegistryMessage, RemoveRouter, RemoveRouterBatch, RouterValidatedMessage,
        SetCode, SetRouters, TakeOwnership, ValidateRouter,
    };

    // Ports
    pub use crate::ports::inbound::{ExecutionReceipt, RegistryApi};
    pub use crate::ports::outbound::{AccountSnapshot, AccountStore, MessageSink};

    // Errors
    pub use crate::errors::{exit_codes, AccessDenied, CodecError, RegistryError, StoreError};

    // Adapters
    pub use crate::adapters::{InMemoryAccountStore, RecordingOutbox};

    // Service
    pub use crate::config::RegistryConfig;
    pub use crate::service::{RegistryService, ServiceStats};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_exports() {
        use prelude::*;
        let _ = RegistryConfig::default();
        let _ = Address::SENTINEL;
        assert_eq!(opcodes::ADD_ROUTER, 0x5265_6701);
    }

    #[test]
    fn test_contract_version_follows_package() {
        let version = prelude::ContractVersion::current();
        let mut parts = VERSION.split('.');
        assert_eq!(parts.next().map(str::parse::<u8>), Some(Ok(version.major)));
        assert_eq!(parts.next().map(str::parse::<u8>), Some(Ok(version.minor)));
    }
}
