//! Flash part catalog
//!
//! This module maps the device ID reported by the programmer to the part
//! name the programmer expects when writing.

mod catalog;

pub use catalog::*;
