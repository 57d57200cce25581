//! Known flash parts

use core::fmt;

use crate::error::{Error, Result};

/// A supported flash part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlashPart {
    /// 24-bit device ID (manufacturer byte followed by the 16-bit device code)
    pub id: u32,
    /// Part name as understood by the programmer tool
    pub name: &'static str,
}

impl FlashPart {
    const fn new(id: u32, name: &'static str) -> Self {
        Self { id, name }
    }
}

impl fmt::Display for FlashPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:06x})", self.name, self.id)
    }
}

/// Parts fitted to HLK-RM04 boards
pub const KNOWN_PARTS: &[FlashPart] = &[
    FlashPart::new(0x9d467f, "PM25LQ032C"),
    FlashPart::new(0xc22016, "MX25L3206E"),
    FlashPart::new(0xef4016, "W25Q32BV"),
];

/// Read-only lookup table of flash parts
#[derive(Debug, Clone, Copy)]
pub struct FlashCatalog {
    parts: &'static [FlashPart],
}

impl Default for FlashCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashCatalog {
    /// Catalog of the known parts
    pub const fn new() -> Self {
        Self { parts: KNOWN_PARTS }
    }

    /// All parts in the catalog
    pub fn parts(&self) -> &'static [FlashPart] {
        self.parts
    }

    /// Comma separated part names, for messages
    pub fn names(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Find the part with the given device ID
    pub fn lookup(&self, id: u32) -> Result<FlashPart> {
        self.parts
            .iter()
            .find(|p| p.id == id)
            .copied()
            .ok_or_else(|| Error::LookupFailure { known: self.names() })
    }

    /// Find a part by name (case-insensitive)
    pub fn find_by_name(&self, name: &str) -> Option<FlashPart> {
        self.parts
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let catalog = FlashCatalog::new();
        assert_eq!(catalog.lookup(0x9d467f).unwrap().name, "PM25LQ032C");
        assert_eq!(catalog.lookup(0xc22016).unwrap().name, "MX25L3206E");
        assert_eq!(catalog.lookup(0xef4016).unwrap().name, "W25Q32BV");
    }

    #[test]
    fn test_lookup_unknown() {
        let catalog = FlashCatalog::new();
        let err = catalog.lookup(0x000000).unwrap_err();
        assert!(matches!(err, Error::LookupFailure { .. }));
        assert_eq!(
            err.to_string(),
            "flash name lookup failed (flash is not one of: PM25LQ032C, MX25L3206E, W25Q32BV)"
        );
    }

    #[test]
    fn test_find_by_name() {
        let catalog = FlashCatalog::new();
        assert_eq!(catalog.find_by_name("w25q32bv").unwrap().id, 0xef4016);
        assert!(catalog.find_by_name("W25Q64").is_none());
    }

    #[test]
    fn test_display() {
        let part = FlashCatalog::new().lookup(0xef4016).unwrap();
        assert_eq!(part.to_string(), "W25Q32BV (0xef4016)");
    }
}
