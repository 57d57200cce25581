//! Process exit codes
//!
//! Operator scripts depend on these values; never renumber them.
//!
//! | Code | Meaning                                   |
//! |------|-------------------------------------------|
//! | 0    | success                                   |
//! | 2    | invalid command line (reported by clap)   |
//! | 12   | flash part not in the catalog             |
//! | 13   | part name unknown to the programmer       |
//! | 14   | part name invalid for the connected chip  |
//! | 15   | image not found                           |
//! | 16   | image has the wrong size                  |
//! | 17   | programmer or hardware failure            |
//! | 18   | any other failure                         |
//! | 19   | malformed MAC address or device id        |

use rmflash_core::Error;
use std::process::ExitCode;

pub const LOOKUP_FAILURE: u8 = 12;
pub const UNKNOWN_DEVICE_PART: u8 = 13;
pub const INVALID_DEVICE_PART: u8 = 14;
pub const UNKNOWN_IMAGE: u8 = 15;
pub const INVALID_IMAGE: u8 = 16;
pub const HARDWARE_IO: u8 = 17;
pub const GENERIC_FAILURE: u8 = 18;
pub const MALFORMED_FIELD: u8 = 19;

/// Exit code for an error
pub fn exit_code(err: &Error) -> u8 {
    match err {
        Error::LookupFailure { .. } => LOOKUP_FAILURE,
        Error::UnknownDevicePart => UNKNOWN_DEVICE_PART,
        Error::InvalidDevicePart { .. } => INVALID_DEVICE_PART,
        Error::UnknownImage(_) => UNKNOWN_IMAGE,
        Error::InvalidImage(_) => INVALID_IMAGE,
        Error::HardwareIo => HARDWARE_IO,
        Error::MalformedField(_) => MALFORMED_FIELD,
        Error::Config(_) | Error::Io(_) => GENERIC_FAILURE,
    }
}

/// Message shown to the operator
///
/// Unclassified I/O errors get a fixed message; their details go to the log.
/// Configuration errors keep their text, which points at the bad setting.
fn message(err: &Error) -> String {
    match err {
        Error::Io(e) => {
            log::debug!("Unclassified failure: {}", e);
            "operation failed".to_string()
        }
        other => other.to_string(),
    }
}

/// Report an error on stderr and turn it into an exit code
pub fn fail(err: &Error) -> ExitCode {
    let code = exit_code(err);
    eprintln!("error {}: {}", code, message(err));
    ExitCode::from(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_errors() -> Vec<Error> {
        vec![
            Error::LookupFailure {
                known: "W25Q32BV".into(),
            },
            Error::UnknownDevicePart,
            Error::InvalidDevicePart {
                expected: "expected W25Q32BV".into(),
            },
            Error::UnknownImage("missing".into()),
            Error::InvalidImage("short".into()),
            Error::HardwareIo,
            Error::MalformedField("xyz".into()),
            Error::Config("bad".into()),
        ]
    }

    #[test]
    fn test_codes_are_stable() {
        let codes: Vec<u8> = all_errors().iter().map(exit_code).collect();
        assert_eq!(codes, [12, 13, 14, 15, 16, 17, 19, 18]);
    }

    #[test]
    fn test_codes_are_distinct() {
        let mut codes: Vec<u8> = all_errors().iter().map(exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 8);
        assert!(!codes.contains(&0));
        assert!(!codes.contains(&2));
    }

    #[test]
    fn test_io_errors_are_generic() {
        let err = Error::Io(std::io::Error::other("disk on fire"));
        assert_eq!(exit_code(&err), GENERIC_FAILURE);
        assert_eq!(message(&err), "operation failed");
    }

    #[test]
    fn test_config_errors_keep_detail() {
        let err = Error::Config("timeout_secs must be between 1 and 86400".into());
        assert_eq!(exit_code(&err), GENERIC_FAILURE);
        assert!(message(&err).contains("timeout_secs must be between 1 and 86400"));
    }
}
