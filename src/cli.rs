//! CLI argument parsing

use clap::{Parser, Subcommand};
use rmflash_core::chip::KNOWN_PARTS;
use std::path::PathBuf;

/// Generate dynamic help text for the part argument
fn part_help() -> String {
    let names: Vec<&str> = KNOWN_PARTS.iter().map(|p| p.name).collect();
    format!(
        "Flash part name, auto-detected if not specified [known: {}]",
        names.join(", ")
    )
}

#[derive(Parser)]
#[command(name = "rmflash")]
#[command(
    author,
    version,
    about = "Provision HLK-RM04 firmware images and write them to flash",
    long_about = None
)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (TOML)
    /// Defaults to ./rmflash.toml when present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Flash programmer tool to run (overrides the configuration)
    #[arg(long, global = true)]
    pub tool: Option<PathBuf>,

    /// Directory searched for images to write (overrides the configuration)
    #[arg(long, global = true)]
    pub image_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a new device id and exit
    GenerateId,

    /// Report the device id and MAC addresses stored in an image
    Report {
        /// Firmware image file
        image: PathBuf,
    },

    /// Set the device id of an image
    SetId {
        /// Firmware image file
        image: PathBuf,

        /// Device id (9 chars, e.g. aj3cmxeu1); a new one is generated if omitted
        id: Option<String>,
    },

    /// Set the MAC addresses of an image
    SetMac {
        /// Firmware image file
        image: PathBuf,

        /// First MAC address (12 hex digits, e.g. aabbccddeeff)
        mac: String,
    },

    /// Detect the connected flash part
    Detect,

    /// Write an image to flash
    Write {
        /// Image file (chosen from the image directory if not specified)
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[arg(short, long, help = part_help())]
        part: Option<String>,
    },

    /// List supported flash parts
    ListParts,
}
