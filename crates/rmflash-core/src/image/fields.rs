//! Reading and patching image fields

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use super::{Field, ImageLayout, MAC_LEN};
use crate::error::{Error, Result};
use crate::ident::{Identifier, IDENT_LEN};
use crate::mac::MacAddress;

/// Per-device fields read from an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFields {
    /// First MAC address (primary copy)
    pub mac1: MacAddress,
    /// First MAC address (mirror copy)
    pub mac1_mirror: MacAddress,
    /// Second MAC address
    pub mac2: MacAddress,
    /// Raw serial field
    pub serial: [u8; IDENT_LEN],
}

impl ImageFields {
    /// Serial field as an identifier, if it holds a valid one
    pub fn identifier(&self) -> Option<Identifier> {
        Identifier::from_field(&self.serial)
    }

    /// Serial field as text, with invalid bytes replaced
    pub fn serial_text(&self) -> String {
        String::from_utf8_lossy(&self.serial).into_owned()
    }

    /// Whether both copies of mac1 agree
    pub fn mirror_matches(&self) -> bool {
        self.mac1 == self.mac1_mirror
    }

    /// Whether mac2 follows mac1
    pub fn mac2_matches(&self) -> bool {
        self.mac1.next() == self.mac2
    }
}

/// Values written by [`write_fields`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldUpdate {
    /// First MAC address, if updated
    pub mac1: Option<MacAddress>,
    /// Derived second MAC address, if updated
    pub mac2: Option<MacAddress>,
    /// Identifier, if updated
    pub serial: Option<Identifier>,
}

/// Check that `path` is an existing image large enough for the layout
///
/// Returns the image length.
pub fn check_image(layout: &ImageLayout, path: &Path) -> Result<u64> {
    let meta = std::fs::metadata(path).map_err(|e| {
        Error::UnknownImage(format!(
            "cannot find the binary image file specified: {} ({})",
            path.display(),
            e
        ))
    })?;

    if !meta.is_file() {
        return Err(Error::UnknownImage(format!(
            "not a binary image file: {}",
            path.display()
        )));
    }

    let min = layout.min_image_len();
    if meta.len() < min {
        return Err(Error::InvalidImage(format!(
            "{} is not a valid image file (expected at least {} bytes, got {})",
            path.display(),
            min,
            meta.len()
        )));
    }

    Ok(meta.len())
}

fn open_image(layout: &ImageLayout, path: &Path, write: bool) -> Result<File> {
    check_image(layout, path)?;
    OpenOptions::new()
        .read(true)
        .write(write)
        .open(path)
        .map_err(|e| {
            Error::UnknownImage(format!("cannot open image file {}: {}", path.display(), e))
        })
}

fn read_field<const N: usize>(file: &mut File, field: &Field) -> Result<[u8; N]> {
    debug_assert_eq!(field.len, N);
    let mut buf = [0u8; N];
    file.seek(SeekFrom::Start(field.offset))?;
    file.read_exact(&mut buf)?;
    Ok(buf)
}

fn write_field(file: &mut File, field: &Field, data: &[u8]) -> Result<()> {
    debug_assert_eq!(field.len, data.len());
    file.seek(SeekFrom::Start(field.offset))?;
    file.write_all(data)?;
    log::debug!(
        "Wrote {} ({} bytes) at 0x{:05X}",
        field.name,
        data.len(),
        field.offset
    );
    Ok(())
}

/// Read the per-device fields of an image
pub fn read_fields(layout: &ImageLayout, path: &Path) -> Result<ImageFields> {
    let mut file = open_image(layout, path, false)?;

    let mac1: [u8; MAC_LEN] = read_field(&mut file, &layout.mac1_a)?;
    let mac1_mirror: [u8; MAC_LEN] = read_field(&mut file, &layout.mac1_b)?;
    let mac2: [u8; MAC_LEN] = read_field(&mut file, &layout.mac2)?;
    let serial: [u8; IDENT_LEN] = read_field(&mut file, &layout.serial)?;

    Ok(ImageFields {
        mac1: MacAddress(mac1),
        mac1_mirror: MacAddress(mac1_mirror),
        mac2: MacAddress(mac2),
        serial,
    })
}

/// Write both copies of mac1 and the derived mac2
///
/// Returns the derived mac2.
pub fn write_mac(layout: &ImageLayout, path: &Path, mac1: MacAddress) -> Result<MacAddress> {
    let mac2 = mac1.next();
    let mut file = open_image(layout, path, true)?;

    write_field(&mut file, &layout.mac1_a, mac1.octets())?;
    write_field(&mut file, &layout.mac1_b, mac1.octets())?;
    write_field(&mut file, &layout.mac2, mac2.octets())?;
    file.flush()?;

    Ok(mac2)
}

/// Write the identifier field
pub fn write_serial(layout: &ImageLayout, path: &Path, serial: &Identifier) -> Result<()> {
    let mut file = open_image(layout, path, true)?;
    write_field(&mut file, &layout.serial, serial.as_bytes())?;
    file.flush()?;
    Ok(())
}

/// Patch the MAC addresses and/or the identifier of an image
///
/// Every supplied value is validated before the image is opened, so a
/// malformed value never modifies the file. The MAC group and the serial
/// group are written independently, each with its own open and close.
pub fn write_fields(
    layout: &ImageLayout,
    path: &Path,
    mac: Option<&str>,
    serial: Option<&str>,
) -> Result<FieldUpdate> {
    let mac1 = mac.map(MacAddress::parse).transpose()?;
    let serial = serial.map(Identifier::parse).transpose()?;

    let mut update = FieldUpdate::default();

    if let Some(mac1) = mac1 {
        let mac2 = write_mac(layout, path, mac1)?;
        update.mac1 = Some(mac1);
        update.mac2 = Some(mac2);
    }

    if let Some(serial) = serial {
        write_serial(layout, path, &serial)?;
        update.serial = Some(serial);
    }

    Ok(update)
}
