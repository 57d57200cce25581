//! MAC addresses

use core::fmt;
use core::str::FromStr;

use crate::error::{Error, Result};

/// Largest value representable in 48 bits
const MAC_MASK: u64 = (1 << 48) - 1;

/// A 48-bit MAC address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Parse 12 hex digits, optionally separated by `:`, `-` or spaces
    pub fn parse(s: &str) -> Result<Self> {
        let digits: String = s
            .chars()
            .filter(|c| !matches!(c, ':' | '-' | ' '))
            .collect();

        if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::MalformedField(format!(
                "mac address {} is invalid, a valid mac address must be 12 hex chars: aabbccddeeff",
                s
            )));
        }

        let mut bytes = [0u8; 6];
        for (i, byte) in bytes.iter_mut().enumerate() {
            // All digits were checked above
            *byte = u8::from_str_radix(&digits[2 * i..2 * i + 2], 16)
                .map_err(|e| Error::MalformedField(format!("invalid mac address: {}", e)))?;
        }
        Ok(Self(bytes))
    }

    /// Address as a 48-bit big-endian integer
    pub fn to_u64(self) -> u64 {
        let mut buf = [0u8; 8];
        buf[2..].copy_from_slice(&self.0);
        u64::from_be_bytes(buf)
    }

    /// Build an address from the low 48 bits of an integer
    pub fn from_u64(value: u64) -> Self {
        let buf = (value & MAC_MASK).to_be_bytes();
        let mut bytes = [0u8; 6];
        bytes.copy_from_slice(&buf[2..]);
        Self(bytes)
    }

    /// The following address, wrapping at 2^48
    ///
    /// The second interface of a device always uses the address right after
    /// the first one.
    pub fn next(self) -> Self {
        Self::from_u64(self.to_u64().wrapping_add(1))
    }

    /// Lowercase hex without separators, as used in file names
    pub fn to_plain(self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Raw bytes
    pub fn octets(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(
            f,
            "{:02x}-{:02x}-{:02x}-{:02x}-{:02x}-{:02x}",
            a, b, c, d, e, g
        )
    }
}

impl FromStr for MacAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        let expected = MacAddress([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        assert_eq!(MacAddress::parse("aabbccddeeff").unwrap(), expected);
        assert_eq!(MacAddress::parse("AA:BB:CC:DD:EE:FF").unwrap(), expected);
        assert_eq!(MacAddress::parse("aa-bb-cc-dd-ee-ff").unwrap(), expected);
        assert_eq!(MacAddress::parse("aabb ccdd eeff").unwrap(), expected);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "aabbccddee", "aabbccddeeff00", "gabbccddeeff", "aa.bb.cc.dd.ee.ff"] {
            assert!(
                matches!(MacAddress::parse(bad), Err(Error::MalformedField(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_next() {
        let mac = MacAddress::parse("001122334455").unwrap();
        assert_eq!(mac.next().to_plain(), "001122334456");

        let carry = MacAddress::parse("0011223344ff").unwrap();
        assert_eq!(carry.next().to_plain(), "001122334500");

        let wrap = MacAddress([0xff; 6]);
        assert_eq!(wrap.next(), MacAddress([0; 6]));
    }

    #[test]
    fn test_next_matches_integer_increment() {
        for value in [0u64, 1, 0xff, 0x00ff_ffff_ffff, 0x1234_5678_9abc, MAC_MASK] {
            let mac = MacAddress::from_u64(value);
            assert_eq!(mac.next().to_u64(), (value + 1) & MAC_MASK);
        }
    }

    #[test]
    fn test_display_roundtrip() {
        let mac = MacAddress([0x00, 0x0c, 0x43, 0x30, 0x52, 0x77]);
        assert_eq!(mac.to_string(), "00-0c-43-30-52-77");
        assert_eq!(mac.to_plain(), "000c43305277");
        assert_eq!(mac.to_string().parse::<MacAddress>().unwrap(), mac);
    }
}
