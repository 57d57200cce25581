//! Image field commands

use rmflash_core::config::Config;
use rmflash_core::image::{self, ImageLayout, Update};
use rmflash_core::{ident, Result};
use std::path::Path;

const LAYOUT: &ImageLayout = &ImageLayout::RM04;

/// Print a freshly generated device id
pub fn cmd_generate_id() -> Result<()> {
    let id = ident::generate()?;
    println!();
    println!("  generating new device id: {}", id);
    println!();
    Ok(())
}

/// Print the device id and MAC addresses stored in an image
pub fn cmd_report(image: &Path) -> Result<()> {
    let fields = image::read_fields(LAYOUT, image)?;

    println!();
    println!("     image file: {}", image.display());
    match fields.identifier() {
        Some(id) => println!("      device id: {}", id),
        None => println!("      device id: (not set)"),
    }
    println!("          mac 1: {}", fields.mac1);
    println!("          mac 2: {}", fields.mac2);
    println!();

    if !fields.mirror_matches() {
        log::warn!(
            "mac 1 mirror copy differs from the primary copy: {}",
            fields.mac1_mirror
        );
    }
    if !fields.mac2_matches() {
        log::warn!("mac 2 does not follow mac 1 (expected {})", fields.mac1.next());
    }

    Ok(())
}

fn print_new_name(original: &Path, update: &Update) {
    if update.renamed(original) {
        println!("  new file name: {}", update.path.display());
    } else {
        println!("      file name: {} (unchanged)", update.path.display());
    }
    println!();
}

/// Set the device id of an image, generating one if none is given
pub fn cmd_set_id(config: &Config, image: &Path, id: Option<&str>) -> Result<()> {
    let update = image::update_identifier(LAYOUT, image, id, &config.default_prefix)?;

    println!();
    println!("  device id for image file updated: {}", image.display());
    if let Some(serial) = update.fields.serial {
        println!("      device id: {}", serial);
    }
    print_new_name(image, &update);
    Ok(())
}

/// Set the MAC addresses of an image
pub fn cmd_set_mac(config: &Config, image: &Path, mac: &str) -> Result<()> {
    let update = image::update_mac(LAYOUT, image, mac, &config.default_prefix)?;

    println!();
    println!("  mac addresses for image file updated: {}", image.display());
    if let (Some(mac1), Some(mac2)) = (update.fields.mac1, update.fields.mac2) {
        println!("          mac 1: {}", mac1);
        println!("          mac 2: {}", mac2);
    }
    print_new_name(image, &update);
    Ok(())
}
