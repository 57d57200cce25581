//! Firmware image fields
//!
//! The firmware image reserves a handful of fixed byte ranges for per-device
//! data. This module reads and patches those ranges in place and keeps the
//! image file name in sync with what is stored inside it.
//!
//! | Field             | Offset    | Width |
//! |-------------------|-----------|-------|
//! | mac1 (primary)    | `0x40004` | 6     |
//! | mac1 (mirror)     | `0x40028` | 6     |
//! | mac2              | `0x4002e` | 6     |
//! | serial            | `0x40400` | 9     |

mod fields;
mod naming;

pub use fields::*;
pub use naming::*;

use crate::ident::IDENT_LEN;

/// Width of a MAC address field
pub const MAC_LEN: usize = 6;

/// Size of a complete image as written to flash (4 MiB)
pub const DEFAULT_IMAGE_SIZE: u64 = 0x40_0000;

/// A fixed byte range within the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Name used in log messages
    pub name: &'static str,
    /// Byte offset from the start of the image
    pub offset: u64,
    /// Width in bytes
    pub len: usize,
}

impl Field {
    const fn new(name: &'static str, offset: u64, len: usize) -> Self {
        Self { name, offset, len }
    }

    /// Offset one past the last byte of the field
    pub const fn end(&self) -> u64 {
        self.offset + self.len as u64
    }
}

/// Offsets of the per-device fields inside an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageLayout {
    /// Primary copy of the first MAC address
    pub mac1_a: Field,
    /// Mirror copy of the first MAC address
    pub mac1_b: Field,
    /// Second MAC address (always mac1 + 1)
    pub mac2: Field,
    /// Device identifier
    pub serial: Field,
}

impl ImageLayout {
    /// Layout of the HLK-RM04 firmware image
    pub const RM04: ImageLayout = ImageLayout {
        mac1_a: Field::new("mac1", 0x40004, MAC_LEN),
        mac1_b: Field::new("mac1 mirror", 0x40028, MAC_LEN),
        mac2: Field::new("mac2", 0x4002e, MAC_LEN),
        serial: Field::new("serial", 0x40400, IDENT_LEN),
    };

    /// All fields of the layout
    pub fn fields(&self) -> [Field; 4] {
        [self.mac1_a, self.mac1_b, self.mac2, self.serial]
    }

    /// Smallest image length that contains every field
    pub fn min_image_len(&self) -> u64 {
        self.fields().iter().map(Field::end).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_image_len() {
        assert_eq!(ImageLayout::RM04.min_image_len(), 0x40409);
    }

    #[test]
    fn test_fields_do_not_overlap() {
        let fields = ImageLayout::RM04.fields();
        for (i, a) in fields.iter().enumerate() {
            for b in &fields[i + 1..] {
                assert!(
                    a.end() <= b.offset || b.end() <= a.offset,
                    "{} overlaps {}",
                    a.name,
                    b.name
                );
            }
        }
    }

    #[test]
    fn test_fields_fit_in_image() {
        assert!(ImageLayout::RM04.min_image_len() <= DEFAULT_IMAGE_SIZE);
    }
}
