//! # Bit Strings
//!
//! Bit-granular builder and reader used by every record encoding.
//!
//! Integers are written most-significant bit first. A *reference* is a 32-bit
//! bit length followed by exactly that many bits; readers hand out a bounded
//! sub-reader for it so that nested structures can be parsed until exhaustion.

use crate::errors::CodecError;
use primitive_types::U256;
use std::fmt;

/// Width of the length prefix in front of every reference.
pub const REF_LEN_BITS: u32 = 32;

// =============================================================================
// BIT STRING
// =============================================================================

/// An exact-length sequence of bits.
///
/// Bits past `len` in the last byte are always zero, so derived equality is
/// bit-exact.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitString {
    bytes: Vec<u8>,
    len: usize,
}

impl BitString {
    /// Creates an empty bit string.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a byte-aligned bit string.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            len: bytes.len() * 8,
        }
    }

    /// Number of bits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the string holds no bits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Backing bytes; the last one is zero-padded.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Bit at `index`, or `None` past the end.
    #[must_use]
    pub fn bit(&self, index: usize) -> Option<bool> {
        (index < self.len).then(|| self.bytes[index / 8] & (0x80 >> (index % 8)) != 0)
    }

    /// Reader over the whole string.
    #[must_use]
    pub fn reader(&self) -> BitReader<'_> {
        BitReader {
            bits: self,
            pos: 0,
            end: self.len,
        }
    }

    fn push_bit(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            self.bytes[self.len / 8] |= 0x80 >> (self.len % 8);
        }
        self.len += 1;
    }
}

impl fmt::Debug for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{{{}", hex::encode(&self.bytes))?;
        if self.len % 8 != 0 {
            write!(f, "/{}", self.len)?;
        }
        write!(f, "}}")
    }
}

// =============================================================================
// WRITER
// =============================================================================

/// Append-only bit builder.
#[derive(Debug, Default)]
pub struct BitWriter {
    bits: BitString,
}

impl BitWriter {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bits written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Finishes the writer.
    #[must_use]
    pub fn finish(self) -> BitString {
        self.bits
    }

    /// Writes one bit.
    pub fn store_bit(&mut self, bit: bool) -> &mut Self {
        self.bits.push_bit(bit);
        self
    }

    /// Writes the low `width` bits of `value` (`width <= 64`).
    pub fn store_uint(&mut self, value: u64, width: u32) -> &mut Self {
        debug_assert!(width <= 64);
        debug_assert!(width == 64 || value >> width == 0);
        for shift in (0..width).rev() {
            self.bits.push_bit((value >> shift) & 1 == 1);
        }
        self
    }

    /// Writes an 8-bit two's complement integer.
    pub fn store_i8(&mut self, value: i8) -> &mut Self {
        self.store_uint(u64::from(value as u8), 8)
    }

    /// Writes a 256-bit unsigned integer.
    pub fn store_u256(&mut self, value: &U256) -> &mut Self {
        let mut buf = [0u8; 32];
        value.to_big_endian(&mut buf);
        self.store_bytes(&buf)
    }

    /// Writes raw bytes.
    pub fn store_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        if self.bits.len % 8 == 0 {
            self.bits.bytes.extend_from_slice(bytes);
            self.bits.len += bytes.len() * 8;
        } else {
            for byte in bytes {
                self.store_uint(u64::from(*byte), 8);
            }
        }
        self
    }

    /// Appends another bit string inline.
    pub fn store_bits(&mut self, bits: &BitString) -> &mut Self {
        for index in 0..bits.len() {
            self.bits.push_bit(bits.bytes[index / 8] & (0x80 >> (index % 8)) != 0);
        }
        self
    }

    /// Writes `bits` as a length-prefixed reference.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::ReferenceTooLarge` if the length does not fit the prefix.
    pub fn store_ref(&mut self, bits: &BitString) -> Result<&mut Self, CodecError> {
        let len = u32::try_from(bits.len())
            .map_err(|_| CodecError::ReferenceTooLarge { bits: bits.len() })?;
        self.store_uint(u64::from(len), REF_LEN_BITS);
        Ok(self.store_bits(bits))
    }
}

// =============================================================================
// READER
// =============================================================================

/// Cursor over a bounded window of a [`BitString`].
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bits: &'a BitString,
    pos: usize,
    end: usize,
}

impl<'a> BitReader<'a> {
    /// Bits left in this window.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    /// Returns true once every bit in the window has been consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.pos == self.end
    }

    fn ensure(&self, needed: usize) -> Result<(), CodecError> {
        if self.remaining() < needed {
            return Err(CodecError::Underflow {
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    fn take_bit(&mut self) -> bool {
        let bit = self.bits.bytes[self.pos / 8] & (0x80 >> (self.pos % 8)) != 0;
        self.pos += 1;
        bit
    }

    /// Reads one bit.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Underflow` if the window is exhausted.
    pub fn load_bit(&mut self) -> Result<bool, CodecError> {
        self.ensure(1)?;
        Ok(self.take_bit())
    }

    /// Reads a `width`-bit unsigned integer (`width <= 64`).
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Underflow` if fewer than `width` bits remain.
    pub fn load_uint(&mut self, width: u32) -> Result<u64, CodecError> {
        debug_assert!(width <= 64);
        self.ensure(width as usize)?;
        let mut value = 0u64;
        for _ in 0..width {
            value = (value << 1) | u64::from(self.take_bit());
        }
        Ok(value)
    }

    /// Reads an 8-bit unsigned integer.
    pub fn load_u8(&mut self) -> Result<u8, CodecError> {
        self.load_uint(8).map(|v| v as u8)
    }

    /// Reads a 32-bit unsigned integer.
    pub fn load_u32(&mut self) -> Result<u32, CodecError> {
        self.load_uint(32).map(|v| v as u32)
    }

    /// Reads a 64-bit unsigned integer.
    pub fn load_u64(&mut self) -> Result<u64, CodecError> {
        self.load_uint(64)
    }

    /// Reads an 8-bit two's complement integer.
    pub fn load_i8(&mut self) -> Result<i8, CodecError> {
        self.load_u8().map(|v| v as i8)
    }

    /// Reads `N` raw bytes.
    pub fn load_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        self.ensure(N * 8)?;
        let mut out = [0u8; N];
        for byte in &mut out {
            *byte = self.load_uint(8)? as u8;
        }
        Ok(out)
    }

    /// Reads a 256-bit unsigned integer.
    pub fn load_u256(&mut self) -> Result<U256, CodecError> {
        let bytes: [u8; 32] = self.load_array()?;
        Ok(U256::from_big_endian(&bytes))
    }

    /// Reads a length-prefixed reference and returns a reader bounded to it.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Underflow` if the prefix or the body is truncated.
    pub fn load_ref(&mut self) -> Result<BitReader<'a>, CodecError> {
        let len = self.load_uint(REF_LEN_BITS)? as usize;
        self.ensure(len)?;
        let sub = BitReader {
            bits: self.bits,
            pos: self.pos,
            end: self.pos + len,
        };
        self.pos += len;
        Ok(sub)
    }

    /// Copies out the unread bits of this window.
    #[must_use]
    pub fn rest(mut self) -> BitString {
        let mut out = BitString::new();
        while !self.is_exhausted() {
            out.push_bit(self.take_bit());
        }
        out
    }
}

// =============================================================================
// TESTS
// =============================================================================
