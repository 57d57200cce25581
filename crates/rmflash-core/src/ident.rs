//! Device identifiers
//!
//! An identifier is a millisecond timestamp rendered in a 32-symbol alphabet
//! with the look-alike characters `i`, `l`, `o` and `5` removed. The value is
//! packed as 10 big-endian bytes (two zero bytes followed by the 64-bit
//! timestamp), split into 5-bit groups as in RFC 4648 base-32, and every group
//! is written as the alphabet symbol of the same value. Leading zero symbols
//! are dropped, which keeps the encoding compact.
//!
//! Stored identifiers are always [`IDENT_LEN`] characters long. A short
//! encoding is left-padded with the zero symbol, which changes neither the
//! value nor the ordering; an encoding that does not fit is rejected.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// Length of a stored identifier
pub const IDENT_LEN: usize = 9;

/// Identifier alphabet, indexed by symbol value
///
/// Symbol `n` replaces base-32 digit `n` (`A`..`Z`, `2`..`7`).
pub const ALPHABET: &[u8; 32] = b"0abcdefghjkmnpqrstuvwxyz12346789";

/// Symbol representing the value zero
pub const ZERO_SYMBOL: u8 = ALPHABET[0];

/// Number of 5-bit symbols in a 10-byte value
const SYMBOLS: usize = 16;

/// Value of an alphabet symbol, if it is one
fn symbol_value(c: u8) -> Option<u8> {
    ALPHABET.iter().position(|&s| s == c).map(|v| v as u8)
}

/// Encode a millisecond timestamp, without padding
///
/// Returns an empty string for zero. The result is at most 13 symbols long,
/// because the two leading zero bytes always produce three zero symbols.
pub fn encode(ms: u64) -> String {
    // Two zero bytes followed by the big-endian timestamp: an 80-bit value
    let value = ms as u128;

    let mut out = String::with_capacity(SYMBOLS);
    for i in 0..SYMBOLS {
        let shift = 5 * (SYMBOLS - 1 - i);
        let digit = ((value >> shift) & 0x1f) as usize;
        if out.is_empty() && digit == 0 {
            continue;
        }
        out.push(ALPHABET[digit] as char);
    }
    out
}

/// Check that a candidate is a well-formed stored identifier
pub fn validate(candidate: &str) -> bool {
    candidate.len() == IDENT_LEN && candidate.bytes().all(|c| symbol_value(c).is_some())
}

/// Generate an identifier for the given millisecond timestamp
///
/// Fails with [`Error::MalformedField`] once the timestamp no longer fits in
/// nine symbols (2^45 ms, roughly the year 3084).
pub fn generate_at(ms: u64) -> Result<Identifier> {
    let raw = encode(ms);
    if raw.len() > IDENT_LEN {
        return Err(Error::MalformedField(format!(
            "timestamp {} does not fit in a {} character device id",
            ms, IDENT_LEN
        )));
    }

    let mut bytes = [ZERO_SYMBOL; IDENT_LEN];
    bytes[IDENT_LEN - raw.len()..].copy_from_slice(raw.as_bytes());
    Ok(Identifier(bytes))
}

/// Generate an identifier from the current time
pub fn generate() -> Result<Identifier> {
    let ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let ident = generate_at(ms)?;
    log::debug!("Generated device id {} from timestamp {}", ident, ms);
    Ok(ident)
}

/// A validated 9-character device identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identifier([u8; IDENT_LEN]);

impl Identifier {
    /// Parse and validate an identifier
    pub fn parse(s: &str) -> Result<Self> {
        if !validate(s) {
            return Err(Error::MalformedField(format!(
                "the device id {} is invalid, a valid device id must be {} chars from [{}]",
                s,
                IDENT_LEN,
                // ALPHABET is ASCII
                core::str::from_utf8(ALPHABET).unwrap_or_default()
            )));
        }
        let mut bytes = [0u8; IDENT_LEN];
        bytes.copy_from_slice(s.as_bytes());
        Ok(Self(bytes))
    }

    /// Decode an identifier from a raw image field
    ///
    /// Returns `None` for fields that hold anything other than a valid
    /// identifier, such as an unprogrammed (0xFF) area.
    pub fn from_field(field: &[u8; IDENT_LEN]) -> Option<Self> {
        if field.iter().all(|&c| symbol_value(c).is_some()) {
            Some(Self(*field))
        } else {
            None
        }
    }

    /// Bytes as stored in the image
    pub fn as_bytes(&self) -> &[u8; IDENT_LEN] {
        &self.0
    }

    /// Identifier as a string slice
    pub fn as_str(&self) -> &str {
        // Only alphabet bytes are ever stored
        core::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Numeric value of the identifier (the timestamp it encodes)
    pub fn value(&self) -> u64 {
        self.0.iter().fold(0u64, |acc, &c| {
            (acc << 5) | u64::from(symbol_value(c).unwrap_or(0))
        })
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .iter()
            .map(|&c| symbol_value(c))
            .cmp(other.0.iter().map(|&c| symbol_value(c)))
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.as_str())
    }
}

impl FromStr for Identifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
