//! TOML configuration
//!
//! Every key is optional:
//!
//! ```toml
//! [programmer]
//! tool = "bin/minipro"
//! timeout_secs = 600
//!
//! [image]
//! directory = "bin"
//! size = "4 MiB"
//! default_prefix = "a140808"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::image::{DEFAULT_IMAGE_SIZE, DEFAULT_PREFIX};

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "rmflash.toml";

/// Default programmer timeout (writing 4 MiB takes a few minutes)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Longest accepted programmer timeout
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration file structure
#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    #[serde(default)]
    programmer: TomlProgrammer,
    #[serde(default)]
    image: TomlImage,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlProgrammer {
    tool: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlImage {
    directory: Option<PathBuf>,
    #[serde(default, deserialize_with = "deserialize_size")]
    size: Option<u64>,
    default_prefix: Option<String>,
}

/// Deserialize a size that can be an integer or a string like "4 MiB"
fn deserialize_size<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SizeOrStr {
        Int(u64),
        Str(String),
    }

    match SizeOrStr::deserialize(deserializer)? {
        SizeOrStr::Int(n) => Ok(Some(n)),
        SizeOrStr::Str(s) => parse_size(&s).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Parse a size string like "4 MiB", "0x400000" or "4194304"
pub fn parse_size(s: &str) -> std::result::Result<u64, String> {
    let s = s.trim();

    if let Ok(n) = s.parse::<u64>() {
        return Ok(n);
    }

    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u64::from_str_radix(hex.trim(), 16).map_err(|e| format!("invalid hex: {}", e));
    }

    let s_lower = s.to_lowercase();
    let (num_str, multiplier) = if let Some(n) = s_lower.strip_suffix("mib") {
        (n.trim(), 1024 * 1024)
    } else if let Some(n) = s_lower.strip_suffix("kib") {
        (n.trim(), 1024)
    } else if let Some(n) = s_lower.strip_suffix('b') {
        (n.trim(), 1)
    } else {
        return Err(format!("invalid size: {}", s));
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid size: {}", s))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size too large: {}", s))
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path of the external programmer tool
    pub tool: PathBuf,
    /// Maximum time a single programmer invocation may take
    pub timeout: Duration,
    /// Directory scanned for images when none is given
    pub image_dir: PathBuf,
    /// Exact image size required for writing to flash
    pub image_size: u64,
    /// Product prefix for image file names
    pub default_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool: PathBuf::from("bin/minipro"),
            timeout: DEFAULT_TIMEOUT,
            image_dir: PathBuf::from("bin"),
            image_size: DEFAULT_IMAGE_SIZE,
            default_prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl Config {
    /// Parse a configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: TomlConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        let defaults = Self::default();

        let config = Self {
            tool: file.programmer.tool.unwrap_or(defaults.tool),
            timeout: file
                .programmer
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            image_dir: file.image.directory.unwrap_or(defaults.image_dir),
            image_size: file.image.size.unwrap_or(defaults.image_size),
            default_prefix: file.image.default_prefix.unwrap_or(defaults.default_prefix),
        };

        if config.timeout.is_zero() || config.timeout > MAX_TIMEOUT {
            return Err(Error::Config(format!(
                "timeout_secs must be between 1 and {}",
                MAX_TIMEOUT.as_secs()
            )));
        }
        if config.default_prefix.is_empty() || config.default_prefix.contains(['_', '/']) {
            return Err(Error::Config(format!(
                "invalid default_prefix: {:?}",
                config.default_prefix
            )));
        }

        Ok(config)
    }

    /// Load a configuration file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Load the given file, or the default file if present, or defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            let config = Self::from_toml_file(path)?;
            log::debug!("Loaded configuration from {}", path.display());
            return Ok(config);
        }

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.is_file() {
            let config = Self::from_toml_file(default_path)?;
            log::debug!("Loaded configuration from {}", default_path.display());
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }
}
