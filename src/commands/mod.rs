//! CLI command implementations
//!
//! ## Image commands
//!
//! The `image` module patches and reports the per-device fields of a
//! firmware image (device id, MAC addresses).
//!
//! ## Flash commands
//!
//! The `flash` module drives the external programmer: part detection and
//! writing an image.

pub mod flash;
pub mod image;
