//! Configuration management for tempmon
//!
//! Display preferences and sensor roots persisted as TOML. Every field has a
//! serde default, so a partial file loads and missing keys keep their
//! defaults.

use crate::error::{Error, Result};
use crate::hwmon::{SensorSources, HWMON_PATH, THERMAL_PATH};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Accepted refresh interval, in seconds
pub const REFRESH_RANGE: RangeInclusive<u64> = 1..=60;

/// tempmon configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Display options
    #[serde(default)]
    pub general: GeneralConfig,
    /// Where sensors are discovered
    #[serde(default)]
    pub sources: SourceConfig,
}

/// General display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Seconds between polls
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// Show Fahrenheit instead of Celsius
    #[serde(default)]
    pub use_fahrenheit: bool,
    /// Show the statistics panel
    #[serde(default)]
    pub show_stats: bool,
    /// Show linked fan speeds
    #[serde(default = "default_true")]
    pub show_fans: bool,
    /// One line per sensor, no gauges
    #[serde(default)]
    pub compact_mode: bool,
    /// Samples kept per sensor for the history graph
    #[serde(default = "default_history_length")]
    pub history_length: usize,
}

/// Sensor source roots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_hwmon_root")]
    pub hwmon_root: PathBuf,
    #[serde(default = "default_thermal_root")]
    pub thermal_root: PathBuf,
}

fn default_refresh_interval() -> u64 {
    2
}

fn default_true() -> bool {
    true
}

fn default_history_length() -> usize {
    60
}

fn default_hwmon_root() -> PathBuf {
    PathBuf::from(HWMON_PATH)
}

fn default_thermal_root() -> PathBuf {
    PathBuf::from(THERMAL_PATH)
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            use_fahrenheit: false,
            show_stats: false,
            show_fans: true,
            compact_mode: false,
            history_length: default_history_length(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            hwmon_root: default_hwmon_root(),
            thermal_root: default_thermal_root(),
        }
    }
}

impl Config {
    /// Get the default configuration directory
    ///
    /// Returns `~/.config/tempmon`, or `.config/tempmon` when `HOME` is unset.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".config"));

        Ok(config_dir.join("tempmon"))
    }

    /// Load configuration from the default path, or defaults if there is none
    pub fn load() -> Result<Self> {
        let config_file = Self::default_path()?.join("config.toml");

        if !config_file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&config_file)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Parse(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<PathBuf> {
        let config_dir = Self::default_path()?;
        std::fs::create_dir_all(&config_dir)?;

        let config_file = config_dir.join("config.toml");
        self.save_to(&config_file)?;
        Ok(config_file)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Poll interval, clamped into [`REFRESH_RANGE`]
    pub fn refresh_interval(&self) -> Duration {
        let secs = self
            .general
            .refresh_interval_secs
            .clamp(*REFRESH_RANGE.start(), *REFRESH_RANGE.end());
        Duration::from_secs(secs)
    }

    /// Check a user-supplied refresh interval
    pub fn validate_refresh(secs: u64) -> Result<u64> {
        if REFRESH_RANGE.contains(&secs) {
            Ok(secs)
        } else {
            Err(Error::InvalidValue(format!(
                "refresh rate must be between {} and {} seconds, got {}",
                REFRESH_RANGE.start(),
                REFRESH_RANGE.end(),
                secs
            )))
        }
    }

    pub fn sources(&self) -> SensorSources {
        SensorSources::new(&self.sources.hwmon_root, &self.sources.thermal_root)
    }
}
