//! # Codec
//!
//! Lossless mapping between in-memory records and their bit-exact wire form.
//! The persisted snapshot uses the same layouts as the messages.
//!
//! - [`bits`]: bit-level builder and reader
//! - [`records`]: layouts of addresses, router records, dictionaries and the snapshot

pub mod bits;
pub mod records;

pub use bits::{BitReader, BitString, BitWriter, REF_LEN_BITS};
pub use records::PackedRouterDict;

use crate::errors::CodecError;

// =============================================================================
// TRAITS
// =============================================================================

/// A record that can be appended to a [`BitWriter`].
pub trait Store {
    /// Appends the wire form of `self`.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::ReferenceTooLarge` if a nested reference overflows its prefix.
    fn store(&self, w: &mut BitWriter) -> Result<(), CodecError>;
}

/// A record that can be read back from a [`BitReader`].
pub trait Load: Sized {
    /// Reads one record, advancing the reader.
    ///
    /// # Errors
    ///
    /// Returns a `CodecError` if the bits do not hold a complete record.
    fn load(r: &mut BitReader<'_>) -> Result<Self, CodecError>;
}

/// Encodes a record into a fresh bit string.
///
/// # Errors
///
/// Propagates the record's [`Store`] error.
pub fn encode<T: Store>(value: &T) -> Result<BitString, CodecError> {
    let mut w = BitWriter::new();
    value.store(&mut w)?;
    Ok(w.finish())
}

/// Decodes one record from the start of `bits`; trailing bits are ignored.
///
/// # Errors
///
/// Propagates the record's [`Load`] error.
pub fn decode<T: Load>(bits: &BitString) -> Result<T, CodecError> {
    T::load(&mut bits.reader())
}

// =============================================================================
// MAYBE
// =============================================================================

/// Explicit two-case optional with a one-bit wire tag.
///
/// `Just` of an empty value is distinct from `Nothing` on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Maybe<T> {
    /// Tag bit `0`.
    Nothing,
    /// Tag bit `1`, followed by the value in a reference.
    Just(T),
}

impl<T> Maybe<T> {
    /// Returns true for `Just`.
    #[must_use]
    pub fn is_just(&self) -> bool {
        matches!(self, Self::Just(_))
    }

    /// Returns true for `Nothing`.
    #[must_use]
    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }

    /// Borrows the payload.
    #[must_use]
    pub fn as_ref(&self) -> Maybe<&T> {
        match self {
            Self::Nothing => Maybe::Nothing,
            Self::Just(value) => Maybe::Just(value),
        }
    }

    /// Converts into a standard option.
    #[must_use]
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Nothing => None,
            Self::Just(value) => Some(value),
        }
    }
}

impl<T> Default for Maybe<T> {
    fn default() -> Self {
        Self::Nothing
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Nothing, Self::Just)
    }
}

/// Payloads held behind a reference: the value's own encoding is wrapped in a
/// length-prefixed reference after the tag bit.
pub trait Referenced {
    /// Writes the reference body.
    fn store_body(&self, w: &mut BitWriter) -> Result<(), CodecError>;

    /// Reads the reference body until it is exhausted.
    fn load_body(r: BitReader<'_>) -> Result<Self, CodecError>
    where
        Self: Sized;
}

impl Referenced for BitString {
    fn store_body(&self, w: &mut BitWriter) -> Result<(), CodecError> {
        w.store_bits(self);
        Ok(())
    }

    fn load_body(r: BitReader<'_>) -> Result<Self, CodecError> {
        Ok(r.rest())
    }
}

impl<T: Referenced> Store for Maybe<T> {
    fn store(&self, w: &mut BitWriter) -> Result<(), CodecError> {
        match self {
            Self::Nothing => {
                w.store_bit(false);
            }
            Self::Just(value) => {
                let mut body = BitWriter::new();
                value.store_body(&mut body)?;
                w.store_bit(true).store_ref(&body.finish())?;
            }
        }
        Ok(())
    }
}

impl<T: Referenced> Load for Maybe<T> {
    fn load(r: &mut BitReader<'_>) -> Result<Self, CodecError> {
        if r.load_bit()? {
            Ok(Self::Just(T::load_body(r.load_ref()?)?))
        } else {
            Ok(Self::Nothing)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
