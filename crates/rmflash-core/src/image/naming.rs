//! Canonical image file names
//!
//! A patched image is named `{base}_{mac1}_{serial}.bin`, where `base` is the
//! part of the current file name before the first underscore. Renaming is
//! advisory: a name clash is logged and the image stays where it is.

use std::fs;
use std::path::{Path, PathBuf};

use super::{read_fields, write_mac, write_serial, FieldUpdate, ImageLayout};
use crate::error::Result;
use crate::ident::{self, Identifier};
use crate::mac::MacAddress;

/// Product prefix used when the file name carries none
pub const DEFAULT_PREFIX: &str = "a140808";

/// Placeholder for an image whose serial field holds no valid identifier
const UNSET_SERIAL: &str = "unset";

/// Outcome of an identifier or MAC update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    /// Where the image lives after the update
    pub path: PathBuf,
    /// Values written to the image
    pub fields: FieldUpdate,
}

impl Update {
    /// Whether the image was renamed
    pub fn renamed(&self, original: &Path) -> bool {
        self.path != original
    }
}

/// Product prefix of an image file name
fn base_name<'a>(path: &'a Path, default_prefix: &'a str) -> &'a str {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split_once('_'))
        .map(|(base, _)| base)
        .filter(|base| !base.is_empty())
        .unwrap_or(default_prefix)
}

/// Derive the canonical file name of an image from its contents
///
/// The returned path is in the same directory as `path`.
pub fn derive_filename(
    layout: &ImageLayout,
    path: &Path,
    default_prefix: &str,
) -> Result<PathBuf> {
    let fields = read_fields(layout, path)?;
    let serial = fields
        .identifier()
        .map(|id| id.to_string())
        .unwrap_or_else(|| UNSET_SERIAL.to_string());

    let name = format!(
        "{}_{}_{}.bin",
        base_name(path, default_prefix),
        fields.mac1.to_plain(),
        serial
    );

    Ok(match path.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    })
}

/// Rename an image to its canonical name
///
/// Returns the path the image lives at afterwards. An existing file at the
/// destination, or a failed rename, is logged and leaves the image in place.
pub fn sync_filename(layout: &ImageLayout, path: &Path, default_prefix: &str) -> Result<PathBuf> {
    let target = derive_filename(layout, path, default_prefix)?;
    if target == path {
        return Ok(target);
    }

    if target.exists() {
        log::warn!(
            "Not renaming {}: {} already exists",
            path.display(),
            target.display()
        );
        return Ok(path.to_path_buf());
    }

    match fs::rename(path, &target) {
        Ok(()) => {
            log::info!("Renamed {} to {}", path.display(), target.display());
            Ok(target)
        }
        Err(e) => {
            log::warn!(
                "Failed to rename {} to {}: {}",
                path.display(),
                target.display(),
                e
            );
            Ok(path.to_path_buf())
        }
    }
}

/// Set the identifier of an image and sync its file name
///
/// A fresh identifier is generated when `devid` is `None`.
pub fn update_identifier(
    layout: &ImageLayout,
    path: &Path,
    devid: Option<&str>,
    default_prefix: &str,
) -> Result<Update> {
    let serial = match devid {
        Some(devid) => Identifier::parse(devid)?,
        None => ident::generate()?,
    };

    write_serial(layout, path, &serial)?;
    let path = sync_filename(layout, path, default_prefix)?;

    Ok(Update {
        path,
        fields: FieldUpdate {
            serial: Some(serial),
            ..FieldUpdate::default()
        },
    })
}

/// Set the MAC addresses of an image and sync its file name
pub fn update_mac(
    layout: &ImageLayout,
    path: &Path,
    mac: &str,
    default_prefix: &str,
) -> Result<Update> {
    let mac1 = MacAddress::parse(mac)?;
    let mac2 = write_mac(layout, path, mac1)?;
    let path = sync_filename(layout, path, default_prefix)?;

    Ok(Update {
        path,
        fields: FieldUpdate {
            mac1: Some(mac1),
            mac2: Some(mac2),
            serial: None,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::image::write_fields;
    use crate::test_util::ScratchDir;

    const LAYOUT: ImageLayout = ImageLayout::RM04;

    fn image(dir: &ScratchDir, name: &str) -> PathBuf {
        dir.blank_image(name, LAYOUT.min_image_len() as usize)
    }

    #[test]
    fn test_base_name() {
        let p = Path::new("/tmp/a140808_000c43305277_atrg8k300.bin");
        assert_eq!(base_name(p, DEFAULT_PREFIX), "a140808");
        assert_eq!(base_name(Path::new("fw_v2.bin"), DEFAULT_PREFIX), "fw");
        assert_eq!(base_name(Path::new("firmware.bin"), DEFAULT_PREFIX), "a140808");
        assert_eq!(base_name(Path::new("_x.bin"), "custom"), "custom");
        // Only the file name counts, not the directories
        assert_eq!(base_name(Path::new("my_dir/firmware.bin"), "p"), "p");
    }

    #[test]
    fn test_derive_filename() {
        let dir = ScratchDir::new("naming-derive");
        let path = image(&dir, "rm04_old.bin");
        write_fields(&LAYOUT, &path, Some("000c43305277"), Some("atrg8k300")).unwrap();

        let name = derive_filename(&LAYOUT, &path, DEFAULT_PREFIX).unwrap();
        assert_eq!(name, dir.path().join("rm04_000c43305277_atrg8k300.bin"));
    }

    #[test]
    fn test_derive_filename_without_serial() {
        let dir = ScratchDir::new("naming-unset");
        let path = image(&dir, "fw.bin");
        write_fields(&LAYOUT, &path, Some("000c43305277"), None).unwrap();

        let name = derive_filename(&LAYOUT, &path, DEFAULT_PREFIX).unwrap();
        assert_eq!(name, dir.path().join("a140808_000c43305277_unset.bin"));
    }

    #[test]
    fn test_update_identifier_renames() {
        let dir = ScratchDir::new("naming-id");
        let path = image(&dir, "a140808.bin");

        let update = update_identifier(&LAYOUT, &path, Some("aj3cmxeu1"), DEFAULT_PREFIX).unwrap();
        assert_eq!(
            update.path,
            dir.path().join("a140808_ffffffffffff_aj3cmxeu1.bin")
        );
        assert!(update.renamed(&path));
        assert!(!path.exists());
        assert!(update.path.exists());
        assert_eq!(update.fields.serial.unwrap().as_str(), "aj3cmxeu1");
    }

    #[test]
    fn test_update_identifier_generates() {
        let dir = ScratchDir::new("naming-gen");
        let path = image(&dir, "a140808.bin");

        let update = update_identifier(&LAYOUT, &path, None, DEFAULT_PREFIX).unwrap();
        let serial = update.fields.serial.unwrap();
        assert!(ident::validate(serial.as_str()));

        let fields = read_fields(&LAYOUT, &update.path).unwrap();
        assert_eq!(fields.identifier(), Some(serial));
    }

    #[test]
    fn test_update_identifier_rejects_malformed() {
        let dir = ScratchDir::new("naming-bad-id");
        let path = image(&dir, "a140808.bin");
        let original = fs::read(&path).unwrap();

        let err = update_identifier(&LAYOUT, &path, Some("xyz"), DEFAULT_PREFIX).unwrap_err();
        assert!(matches!(err, Error::MalformedField(_)));
        assert!(path.exists());
        assert_eq!(fs::read(&path).unwrap(), original);
    }

    #[test]
    fn test_update_mac_then_identifier() {
        let dir = ScratchDir::new("naming-mac");
        let path = image(&dir, "rm04_blank.bin");

        let update = update_mac(&LAYOUT, &path, "00-0c-43-30-52-77", DEFAULT_PREFIX).unwrap();
        assert_eq!(update.fields.mac2.unwrap().to_plain(), "000c43305278");
        assert_eq!(
            update.path,
            dir.path().join("rm04_000c43305277_unset.bin")
        );

        let update = update_identifier(&LAYOUT, &update.path, Some("atrg8k300"), "x").unwrap();
        assert_eq!(
            update.path,
            dir.path().join("rm04_000c43305277_atrg8k300.bin")
        );
    }

    #[test]
    fn test_rename_clash_is_not_fatal() {
        let dir = ScratchDir::new("naming-clash");
        let path = image(&dir, "a140808_one.bin");
        let taken = image(&dir, "a140808_ffffffffffff_aj3cmxeu1.bin");

        let update = update_identifier(&LAYOUT, &path, Some("aj3cmxeu1"), DEFAULT_PREFIX).unwrap();
        assert_eq!(update.path, path);
        assert!(path.exists());
        assert!(taken.exists());
    }

    #[test]
    fn test_failed_rename_keeps_path() {
        let dir = ScratchDir::new("naming-too-long");
        // Canonical name would exceed the file name length limit
        let base = "p".repeat(240);
        let path = image(&dir, &format!("{}_x.bin", base));

        let update = update_identifier(&LAYOUT, &path, Some("aj3cmxeu1"), DEFAULT_PREFIX).unwrap();
        assert_eq!(update.path, path);
        assert!(!update.renamed(&path));
        assert!(path.exists());

        let fields = read_fields(&LAYOUT, &path).unwrap();
        assert_eq!(fields.serial_text(), "aj3cmxeu1");
    }

    #[test]
    fn test_already_canonical() {
        let dir = ScratchDir::new("naming-same");
        let path = image(&dir, "a140808_ffffffffffff_aj3cmxeu1.bin");
        write_fields(&LAYOUT, &path, None, Some("aj3cmxeu1")).unwrap();

        assert_eq!(sync_filename(&LAYOUT, &path, DEFAULT_PREFIX).unwrap(), path);
        assert!(path.exists());
    }
}
