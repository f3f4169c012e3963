//! # Record Layouts
//!
//! | Record | Layout |
//! |--------|--------|
//! | `Address` | `workchain:int8 hash:bits256` |
//! | `RouterVersion` | `major:uint8 minor:uint8 development:bits256` |
//! | `RouterDescription` | `router_id:uint256 router_type:uint32 version:RouterVersion` |
//! | `RouterDict` | `{key:uint256 value:RouterDescription}*` ascending, until exhaustion |
//! | `PackedRouterDict` | raw `RouterDict` body, parsed on demand |
//! | `Registry` | `admin:Address next_admin:Address routers:Maybe ^RouterDict` |

use crate::codec::bits::{BitReader, BitString, BitWriter};
use crate::codec::{Load, Maybe, Referenced, Store};
use crate::domain::dictionary::RouterDict;
use crate::domain::entities::Registry;
use crate::domain::value_objects::{
    Address, DevelopmentTag, RouterDescription, RouterVersion, U256,
};
use crate::errors::CodecError;

impl Store for Address {
    fn store(&self, w: &mut BitWriter) -> Result<(), CodecError> {
        w.store_i8(self.workchain).store_bytes(&self.hash);
        Ok(())
    }
}

impl Load for Address {
    fn load(r: &mut BitReader<'_>) -> Result<Self, CodecError> {
        let workchain = r.load_i8()?;
        let hash = r.load_array()?;
        Ok(Self::new(workchain, hash))
    }
}

impl Store for RouterVersion {
    fn store(&self, w: &mut BitWriter) -> Result<(), CodecError> {
        w.store_uint(u64::from(self.major), 8)
            .store_uint(u64::from(self.minor), 8)
            .store_bytes(&self.development.0);
        Ok(())
    }
}

impl Load for RouterVersion {
    fn load(r: &mut BitReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            major: r.load_u8()?,
            minor: r.load_u8()?,
            development: DevelopmentTag(r.load_array()?),
        })
    }
}

impl Store for RouterDescription {
    fn store(&self, w: &mut BitWriter) -> Result<(), CodecError> {
        w.store_u256(&self.router_id)
            .store_uint(u64::from(self.router_type), 32);
        self.version.store(w)
    }
}

impl Load for RouterDescription {
    fn load(r: &mut BitReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            router_id: r.load_u256()?,
            router_type: r.load_u32()?,
            version: RouterVersion::load(r)?,
        })
    }
}

// =============================================================================
// DICTIONARY
// =============================================================================

/// Direct form: entries back to back with no length prefix.
impl Referenced for RouterDict {
    fn store_body(&self, w: &mut BitWriter) -> Result<(), CodecError> {
        for (key, value) in self {
            w.store_u256(key);
            value.store(w)?;
        }
        Ok(())
    }

    fn load_body(mut r: BitReader<'_>) -> Result<Self, CodecError> {
        let mut dict = RouterDict::new();
        let mut last: Option<U256> = None;
        while !r.is_exhausted() {
            let key = r.load_u256()?;
            if last.is_some_and(|prev| key <= prev) {
                return Err(CodecError::NonCanonicalDictionary);
            }
            dict.upsert(key, RouterDescription::load(&mut r)?);
            last = Some(key);
        }
        Ok(dict)
    }
}

/// A dictionary as it arrives in a request: the raw reference body, parsed
/// only once the handler has authorised the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackedRouterDict(pub BitString);

impl PackedRouterDict {
    /// Encodes `dict` in direct form.
    ///
    /// # Errors
    ///
    /// Propagates the entry encoding error.
    pub fn pack(dict: &RouterDict) -> Result<Self, CodecError> {
        let mut w = BitWriter::new();
        dict.store_body(&mut w)?;
        Ok(Self(w.finish()))
    }

    /// Parses the body into a dictionary.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::NonCanonicalDictionary` for out-of-order keys and
    /// `CodecError::Underflow` for a truncated entry.
    pub fn unpack(&self) -> Result<RouterDict, CodecError> {
        RouterDict::load_body(self.0.reader())
    }
}

impl Referenced for PackedRouterDict {
    fn store_body(&self, w: &mut BitWriter) -> Result<(), CodecError> {
        w.store_bits(&self.0);
        Ok(())
    }

    fn load_body(r: BitReader<'_>) -> Result<Self, CodecError> {
        Ok(Self(r.rest()))
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

impl Store for Registry {
    fn store(&self, w: &mut BitWriter) -> Result<(), CodecError> {
        self.admin().store(w)?;
        self.next_admin().store(w)?;
        self.routers.as_maybe().store(w)
    }
}

impl Load for Registry {
    fn load(r: &mut BitReader<'_>) -> Result<Self, CodecError> {
        let admin = Address::load(r)?;
        let next_admin = Address::load(r)?;
        let routers = Maybe::<RouterDict>::load(r)?;
        Ok(Self::from_parts(admin, next_admin, routers))
    }
}

// =============================================================================
// TESTS
// =============================================================================
