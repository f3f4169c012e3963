//! # Value Objects
//!
//! Immutable domain primitives for the router registry.
//! These types represent concepts that are defined by their value, not identity.

use crate::errors::CodecError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export U256 from primitive-types for 256-bit keys and router ids
pub use primitive_types::U256;

/// Request/response correlation id, echoed unmodified.
pub type QueryId = u64;

/// The only workchain routers may live in.
pub const BASECHAIN: i8 = 0;

// =============================================================================
// ADDRESS (workchain + 32-byte hash)
// =============================================================================

/// A ledger account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address {
    /// Partition identifier.
    pub workchain: i8,
    /// Account hash within the workchain.
    pub hash: [u8; 32],
}

impl Address {
    /// The all-zero address, meaning "unset".
    pub const SENTINEL: Self = Self {
        workchain: BASECHAIN,
        hash: [0u8; 32],
    };

    /// Creates an address.
    #[must_use]
    pub const fn new(workchain: i8, hash: [u8; 32]) -> Self {
        Self { workchain, hash }
    }

    /// Creates a basechain address.
    #[must_use]
    pub const fn basechain(hash: [u8; 32]) -> Self {
        Self::new(BASECHAIN, hash)
    }

    /// Returns true if this is the sentinel.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }

    /// Returns true if the address lives in the basechain.
    #[must_use]
    pub fn is_basechain(&self) -> bool {
        self.workchain == BASECHAIN
    }

    /// Dictionary key: the hash read as a big-endian integer.
    #[must_use]
    pub fn dict_key(&self) -> U256 {
        U256::from_big_endian(&self.hash)
    }

    /// Rebuilds a basechain address from a dictionary key.
    #[must_use]
    pub fn from_dict_key(key: &U256) -> Self {
        let mut hash = [0u8; 32];
        key.to_big_endian(&mut hash);
        Self::basechain(hash)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.workchain, hex::encode(self.hash))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = hex::encode(self.hash);
        write!(f, "{}:{}...{}", self.workchain, &hex[..8], &hex[60..])
    }
}

impl FromStr for Address {
    type Err = CodecError;

    /// Parses `"<workchain>:<64 hex digits>"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CodecError::InvalidAddress(s.to_string());
        let (wc, hash_hex) = s.split_once(':').ok_or_else(invalid)?;
        let workchain = wc.parse::<i8>().map_err(|_| invalid())?;
        let mut hash = [0u8; 32];
        hex::decode_to_slice(hash_hex, &mut hash).map_err(|_| invalid())?;
        Ok(Self::new(workchain, hash))
    }
}

// =============================================================================
// DEVELOPMENT TAG (32 bytes, zero-padded text)
// =============================================================================

/// Fixed 32-byte, zero-padded UTF-8 development text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DevelopmentTag(pub [u8; 32]);

impl DevelopmentTag {
    /// Width in bytes.
    pub const LEN: usize = 32;

    /// Pads `text` with zeros.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::TextTooLong` if `text` exceeds 32 bytes.
    pub fn from_text(text: &str) -> Result<Self, CodecError> {
        let raw = text.as_bytes();
        if raw.len() > Self::LEN {
            return Err(CodecError::TextTooLong {
                len: raw.len(),
                max: Self::LEN,
            });
        }
        let mut bytes = [0u8; Self::LEN];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self(bytes))
    }

    /// Text up to the first zero byte, lossily decoded.
    #[must_use]
    pub fn text(&self) -> String {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(Self::LEN);
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }
}

impl fmt::Debug for DevelopmentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.text())
    }
}

// =============================================================================
// ROUTER RECORDS
// =============================================================================

/// Router semantic version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RouterVersion {
    /// Major version.
    pub major: u8,
    /// Minor version.
    pub minor: u8,
    /// Development tag.
    pub development: DevelopmentTag,
}

/// Registry entry describing one router.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RouterDescription {
    /// Router id reported by the router itself.
    pub router_id: U256,
    /// Router type tag.
    pub router_type: u32,
    /// Router version.
    pub version: RouterVersion,
}

// =============================================================================
// TESTS
// =============================================================================
