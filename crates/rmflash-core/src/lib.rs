//! rmflash-core - Core library for provisioning HLK-RM04 firmware images
//!
//! This crate provides everything needed to prepare a firmware image and
//! program it onto SPI flash, without touching the process: no printing and
//! no exit codes, only typed results.
//!
//! # Components
//!
//! - [`ident`] - compact, time-ordered device identifiers
//! - [`mac`] - MAC address parsing and derivation
//! - [`image`] - fixed-offset field patching inside a firmware image
//! - [`chip`] - catalog of supported flash parts
//! - [`programmer`] - orchestration of the external flash programmer tool
//! - [`config`] - TOML configuration
//!
//! # Example
//!
//! ```ignore
//! use rmflash_core::image::{self, ImageLayout};
//!
//! let fields = image::read_fields(&ImageLayout::RM04, "a140808.bin".as_ref())?;
//! println!("mac 1: {}", fields.mac1);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod chip;
pub mod config;
pub mod error;
pub mod ident;
pub mod image;
pub mod mac;
pub mod programmer;

pub use error::{Error, Result};

#[cfg(test)]
mod test_util;
