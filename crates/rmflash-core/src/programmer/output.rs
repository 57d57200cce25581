//! Parsing of programmer tool output

use crate::error::Error;

/// Prefix of the device ID line printed in query mode
const DEVICE_ID_PREFIX: &str = "Device Id: ";

/// Error prefix for a part name the tool has never heard of
const UNKNOWN_DEVICE: &str = "unknown device";

/// Error prefix for a part name that does not match the connected chip
const INVALID_DEVICE: &str = "invalid device";

/// Start of the tool's list of acceptable part names
const EXPECT_MARKER: &str = "expect";

/// Find the device ID in query output
///
/// Looks for a line of the form `Device Id: 0x<hex>`. Returns `None` if there
/// is no such line or its value is zero.
pub fn parse_device_id(text: &str) -> Option<u32> {
    text.lines()
        .filter_map(|line| line.trim_end().strip_prefix(DEVICE_ID_PREFIX))
        .find_map(|value| {
            let hex = value.strip_prefix("0x")?;
            u32::from_str_radix(hex, 16).ok()
        })
        .filter(|&id| id != 0)
}

/// Turn the error output of a failed write into an error
pub fn classify_write_failure(stderr: &str) -> Error {
    let err = stderr.trim().to_lowercase();

    if err.starts_with(UNKNOWN_DEVICE) {
        Error::UnknownDevicePart
    } else if err.starts_with(INVALID_DEVICE) {
        let expected = match err.find(EXPECT_MARKER) {
            Some(pos) => err[pos..].to_string(),
            None => err,
        };
        Error::InvalidDevicePart { expected }
    } else {
        Error::HardwareIo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_device_id() {
        let out = "Found TL866II+ 04.2.86\nChip ID OK\nDevice Id: 0xc22016\n";
        assert_eq!(parse_device_id(out), Some(0xc22016));
        assert_eq!(parse_device_id("Device Id: 0x9D467F\r\n"), Some(0x9d467f));
    }

    #[test]
    fn test_parse_device_id_rejects() {
        assert_eq!(parse_device_id(""), None);
        assert_eq!(parse_device_id("Device Id: 0x000000\n"), None);
        assert_eq!(parse_device_id("Device Id: 0x\n"), None);
        assert_eq!(parse_device_id("Device Id: ef4016\n"), None);
        assert_eq!(parse_device_id("  Device Id: 0xef4016\n"), None);
        assert_eq!(parse_device_id("Device Id: 0xef4016 (W25Q32BV)\n"), None);
    }

    #[test]
    fn test_classify_unknown_device() {
        let err = classify_write_failure("Unknown device: FOO\n");
        assert!(matches!(err, Error::UnknownDevicePart));
    }

    #[test]
    fn test_classify_invalid_device() {
        let err = classify_write_failure(
            "\nInvalid device MX25L3206E (expected one of: W25Q32BV, PM25LQ032C)\n",
        );
        match err {
            Error::InvalidDevicePart { expected } => {
                assert!(expected.starts_with("expected"));
                assert_eq!(expected, "expected one of: w25q32bv, pm25lq032c)");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_classify_invalid_device_without_list() {
        match classify_write_failure("Invalid device") {
            Error::InvalidDevicePart { expected } => assert_eq!(expected, "invalid device"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_classify_other() {
        assert!(matches!(
            classify_write_failure("Verification failed at address 0x1000"),
            Error::HardwareIo
        ));
        assert!(matches!(classify_write_failure(""), Error::HardwareIo));
    }
}
