//! # Error Types
//!
//! All error types for the registry actor.
//!
//! Every failure aborts the whole invocation. The host sees only the numeric
//! exit code returned by [`RegistryError::exit_code`].

use crate::domain::value_objects::Address;
use thiserror::Error;

// =============================================================================
// EXIT CODES
// =============================================================================

/// Stable, externally visible exit codes.
pub mod exit_codes {
    /// Invocation committed.
    pub const SUCCESS: u32 = 0;
    /// A known message (or the persisted snapshot) could not be fully read.
    pub const CELL_UNDERFLOW: u32 = 9;
    /// Router not found in the registry.
    pub const ROUTER_NOT_FOUND: u32 = 123;
    /// Sender is not the admin.
    pub const NOT_ADMIN: u32 = 124;
    /// Router address is not in basechain (workchain != 0).
    pub const INVALID_ROUTER_WORKCHAIN: u32 = 125;
    /// Sender is not the pending next admin.
    pub const NOT_NEXT_ADMIN: u32 = 126;
    /// Attached value does not cover the response.
    pub const NOT_ENOUGH_GAS: u32 = 127;
    /// Unknown operation code.
    pub const UNKNOWN_OPERATION: u32 = 0xFFFF;
    /// Host-side failure outside the message protocol (missing account, broken invariant).
    pub const INTERNAL_ERROR: u32 = 0xFFFE;
}

// =============================================================================
// REGISTRY ERRORS
// =============================================================================

/// Access-control failures raised by the ownership guard.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    /// Caller is not the current admin.
    #[error("sender is not the admin")]
    NotAdmin,

    /// Caller is not the pending next admin, or no transfer is pending.
    #[error("sender is not the next admin")]
    NotNextAdmin,
}

/// Errors that abort a registry invocation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Ownership check failed.
    #[error("access denied: {0}")]
    AccessDenied(#[from] AccessDenied),

    /// Router key is absent from the store.
    #[error("router not found: {0}")]
    RouterNotFound(Address),

    /// Router address is outside the basechain.
    #[error("invalid router workchain: {workchain}")]
    InvalidWorkchain { workchain: i8 },

    /// Attached value below the configured response budget.
    #[error("not enough value attached: required {required}, attached {attached}")]
    InsufficientBudget { required: u64, attached: u64 },

    /// Opcode matches no registry message.
    #[error("unknown operation: 0x{0:08x}")]
    UnknownOperation(u32),

    /// Message body or persisted snapshot could not be decoded.
    #[error("malformed input: {0}")]
    Malformed(#[from] CodecError),

    /// Persisted snapshot could not be read or written.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A transition produced a snapshot that breaks a domain invariant.
    #[error("invariant violated: {0}")]
    InvariantViolated(String),
}

impl RegistryError {
    /// Numeric exit code reported to the invoking environment.
    #[must_use]
    pub fn exit_code(&self) -> u32 {
        match self {
            Self::AccessDenied(AccessDenied::NotAdmin) => exit_codes::NOT_ADMIN,
            Self::AccessDenied(AccessDenied::NotNextAdmin) => exit_codes::NOT_NEXT_ADMIN,
            Self::RouterNotFound(_) => exit_codes::ROUTER_NOT_FOUND,
            Self::InvalidWorkchain { .. } => exit_codes::INVALID_ROUTER_WORKCHAIN,
            Self::InsufficientBudget { .. } => exit_codes::NOT_ENOUGH_GAS,
            Self::UnknownOperation(_) => exit_codes::UNKNOWN_OPERATION,
            Self::Malformed(_) | Self::Store(StoreError::Corrupted(_)) => {
                exit_codes::CELL_UNDERFLOW
            }
            Self::Store(_) | Self::InvariantViolated(_) => exit_codes::INTERNAL_ERROR,
        }
    }

    /// Returns true if the failure came from the ownership guard.
    #[must_use]
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied(_))
    }
}

// =============================================================================
// CODEC ERRORS
// =============================================================================

/// Errors from the bit-level codec.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Not enough bits left to read a field.
    #[error("bit underflow: needed {needed}, available {available}")]
    Underflow { needed: usize, available: usize },

    /// Dictionary keys are not strictly ascending.
    #[error("dictionary keys out of order")]
    NonCanonicalDictionary,

    /// A referenced payload is longer than the 32-bit length prefix allows.
    #[error("reference too large: {bits} bits")]
    ReferenceTooLarge { bits: usize },

    /// Development text exceeds its fixed width.
    #[error("text too long: {len} > {max} bytes")]
    TextTooLong { len: usize, max: usize },

    /// A response record starts with the wrong opcode.
    #[error("unexpected opcode: expected 0x{expected:08x}, found 0x{found:08x}")]
    UnexpectedOpcode { expected: u32, found: u32 },

    /// Address text is not `<workchain>:<64 hex digits>`.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

// =============================================================================
// STORE ERRORS
// =============================================================================

/// Errors from the persisted account store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No account has been deployed yet.
    #[error("account not deployed")]
    NotDeployed,

    /// Persisted data does not decode as a registry snapshot.
    #[error("snapshot corrupted: {0}")]
    Corrupted(CodecError),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_stable() {
        assert_eq!(RegistryError::from(AccessDenied::NotAdmin).exit_code(), 124);
        assert_eq!(
            RegistryError::from(AccessDenied::NotNextAdmin).exit_code(),
            126
        );
        assert_eq!(
            RegistryError::RouterNotFound(Address::SENTINEL).exit_code(),
            123
        );
        assert_eq!(
            RegistryError::InvalidWorkchain { workchain: -1 }.exit_code(),
            125
        );
        assert_eq!(
            RegistryError::InsufficientBudget {
                required: 10,
                attached: 1
            }
            .exit_code(),
            127
        );
        assert_eq!(
            RegistryError::UnknownOperation(0x1234_5678).exit_code(),
            0xFFFF
        );
    }

    #[test]
    fn test_malformed_maps_to_underflow() {
        let err = RegistryError::from(CodecError::Underflow {
            needed: 64,
            available: 3,
        });
        assert_eq!(err.exit_code(), exit_codes::CELL_UNDERFLOW);

        let err = RegistryError::from(StoreError::Corrupted(CodecError::NonCanonicalDictionary));
        assert_eq!(err.exit_code(), exit_codes::CELL_UNDERFLOW);
    }

    #[test]
    fn test_error_display() {
        let err = RegistryError::UnknownOperation(0x1234_5678);
        assert_eq!(err.to_string(), "unknown operation: 0x12345678");

        let err = RegistryError::from(AccessDenied::NotAdmin);
        assert_eq!(err.to_string(), "access denied: sender is not the admin");
        assert!(err.is_access_denied());
    }
}
