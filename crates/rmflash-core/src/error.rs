//! Error types for rmflash-core
//!
//! Every failure the provisioning flow can report is one variant of [`Error`].
//! The library never decides how a failure is presented; the binary maps each
//! variant to an exit code.

use thiserror::Error;

/// Message used for every hardware-adjacent failure.
///
/// Cable, power and tool faults are indistinguishable from the outside, so
/// they all collapse into this one message.
pub const HARDWARE_FAILURE_MSG: &str =
    "flash device programming failed, check connections and try again";

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Hardware ID reported by the programmer is not in the part catalog
    #[error("flash name lookup failed (flash is not one of: {known})")]
    LookupFailure {
        /// Comma separated list of the known part names
        known: String,
    },

    /// Part name rejected by the programmer tool as unknown
    #[error("unknown flash device name specified")]
    UnknownDevicePart,

    /// Part name rejected by the programmer tool as invalid
    #[error("invalid flash device name specified: {expected}")]
    InvalidDevicePart {
        /// Tail of the tool message, starting at its list of expected parts
        expected: String,
    },

    /// Image path missing, or no candidate image could be selected
    #[error("{0}")]
    UnknownImage(String),

    /// Image exists but fails a size precondition
    #[error("{0}")]
    InvalidImage(String),

    /// Supplied MAC address or identifier failed validation
    #[error("{0}")]
    MalformedField(String),

    /// Detection or programming failed (cable, power, tool crash, timeout)
    #[error("{}", HARDWARE_FAILURE_MSG)]
    HardwareIo,

    /// Configuration file could not be loaded
    #[error("configuration error: {0}")]
    Config(String),

    /// Unclassified I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the core Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hardware_message() {
        assert_eq!(Error::HardwareIo.to_string(), HARDWARE_FAILURE_MSG);
    }

    #[test]
    fn test_invalid_device_message() {
        let err = Error::InvalidDevicePart {
            expected: "expected one of: w25q32bv".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid flash device name specified: expected one of: w25q32bv"
        );
    }
}
