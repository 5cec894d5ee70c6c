//! Configuration for spfm-io
//!
//! Loaded from a TOML file; every section is optional and falls back to the
//! stock SPFM light setup (`/dev/ttyUSB0`, 15ms polls, OPNA in slot 1).

use crate::core::types::validate_slot;
use crate::devices::spfm::constants::OPNA_SLOT;
use crate::error::{Error, Result};
use crate::transport::WaitPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub device: DeviceConfig,
    pub timing: TimingConfig,
    pub chips: ChipConfig,
    pub logging: LoggingConfig,
}

/// Serial device
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Serial port path (e.g., "/dev/ttyUSB0")
    pub path: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: "/dev/ttyUSB0".to_string(),
        }
    }
}

/// Readiness polling
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Upper bound of one poll call in milliseconds
    pub poll_timeout_ms: u64,
    /// Total wait per transfer in milliseconds; absent means wait until ready
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_wait_ms: Option<u64>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_timeout_ms: 15,
            max_wait_ms: None,
        }
    }
}

impl TimingConfig {
    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            poll_timeout: Duration::from_millis(self.poll_timeout_ms),
            max_wait: self.max_wait_ms.map(Duration::from_millis),
        }
    }
}

/// Which module sits in which slot
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChipConfig {
    /// Slot holding the YM2608 module silenced at startup
    pub opna_slot: u8,
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self {
            opna_slot: OPNA_SLOT,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` overrides it
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.timing.poll_timeout_ms == 0 {
            return Err(Error::InvalidParameter(
                "timing.poll_timeout_ms must be greater than 0".to_string(),
            ));
        }
        validate_slot(self.chips.opna_slot).map_err(|_| {
            Error::InvalidParameter(format!(
                "chips.opna_slot = {} (SPFM light has slots 0 and 1)",
                self.chips.opna_slot
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.device.path, "/dev/ttyUSB0");
        assert_eq!(config.timing.poll_timeout_ms, 15);
        assert_eq!(config.timing.max_wait_ms, None);
        assert_eq!(config.chips.opna_slot, 1);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
[device]
path = "/dev/ttyUSB1"

[timing]
max_wait_ms = 2000
"#,
        )
        .unwrap();

        assert_eq!(config.device.path, "/dev/ttyUSB1");
        let policy = config.timing.wait_policy();
        assert_eq!(policy.poll_timeout, Duration::from_millis(15));
        assert_eq!(policy.max_wait, Some(Duration::from_millis(2000)));
        assert_eq!(config.chips.opna_slot, 1);
    }

    #[test]
    fn test_rejects_bad_slot() {
        let err = Config::from_toml("[chips]\nopna_slot = 2\n").unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn test_rejects_zero_poll_timeout() {
        let err = Config::from_toml("[timing]\npoll_timeout_ms = 0\n").unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = Config::from_toml("[device\npath = 1").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[device]\npath = \"/dev/ttyACM0\"\n\n[logging]\nlevel = \"debug\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.device.path, "/dev/ttyACM0");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/spfm.toml").unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }

    #[test]
    fn test_toml_round_trip_sections() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(text.contains("[device]"));
        assert!(text.contains("[timing]"));
        assert!(text.contains("[chips]"));
        assert!(text.contains("[logging]"));
        assert!(!text.contains("max_wait_ms"));
        assert!(text.contains("opna_slot = 1"));
        assert!(!text.contains("opm_slot"));
    }
}
