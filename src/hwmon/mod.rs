// Hardware monitoring module - temperature channels exposed through sysfs
//
// On Linux, temperature sensors are exposed via:
// - /sys/class/hwmon/* (one directory per chip, temp*_input channels)
// - /sys/class/thermal/thermal_zone* (coarse ACPI/SoC zones, used as fallback)
//
// Fans live next to the temperature channels of the same chip (fan*_input)
// and get linked to one of that chip's sensors.
//
// Note: Some attributes are root-only on some boards. Unreadable files simply
// yield fewer sensors or fallback values.

pub mod classify;
pub mod discovery;
pub mod fan;
pub mod thermal;

pub use classify::classify;
pub use discovery::discover;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default hwmon root
pub const HWMON_PATH: &str = "/sys/class/hwmon";

/// Default thermal zone root
pub const THERMAL_PATH: &str = "/sys/class/thermal";

/// Upper bound on discovered sensors (memory and render layout)
pub const MAX_SENSORS: usize = 200;

/// Paths of this many bytes or more are skipped during discovery
pub const MAX_PATH_LEN: usize = 512;

/// Critical threshold used when a chip reports none (or nonsense)
pub const DEFAULT_CRITICAL_TEMP: f64 = 90.0;

/// Plausible range for a reported critical threshold, in °C
pub const CRITICAL_TEMP_RANGE: std::ops::RangeInclusive<f64> = 50.0..=150.0;

/// Semantic class of a temperature channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorCategory {
    Cpu,
    Gpu,
    Nvme,
    Chipset,
    Memory,
    Vrm,
    Disk,
    Other,
}

impl SensorCategory {
    /// All categories in display order
    pub const ALL: [SensorCategory; 8] = [
        SensorCategory::Cpu,
        SensorCategory::Gpu,
        SensorCategory::Nvme,
        SensorCategory::Chipset,
        SensorCategory::Memory,
        SensorCategory::Vrm,
        SensorCategory::Disk,
        SensorCategory::Other,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SensorCategory::Cpu => "CPU",
            SensorCategory::Gpu => "GPU",
            SensorCategory::Nvme => "NVMe",
            SensorCategory::Chipset => "Chipset",
            SensorCategory::Memory => "Memory",
            SensorCategory::Vrm => "VRM",
            SensorCategory::Disk => "Disk",
            SensorCategory::Other => "Other",
        }
    }

    /// Short glyph shown next to group titles
    pub fn glyph(self) -> &'static str {
        match self {
            SensorCategory::Cpu => "⚙",
            SensorCategory::Gpu => "▣",
            SensorCategory::Nvme => "▤",
            SensorCategory::Chipset => "◈",
            SensorCategory::Memory => "▦",
            SensorCategory::Vrm => "⚡",
            SensorCategory::Disk => "◉",
            SensorCategory::Other => "•",
        }
    }
}

impl fmt::Display for SensorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Health of a sensor, derived from its latest reading only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SensorStatus {
    #[default]
    Ok,
    Warn,
    Critical,
    Error,
}

impl fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorStatus::Ok => write!(f, "OK"),
            SensorStatus::Warn => write!(f, "WARN"),
            SensorStatus::Critical => write!(f, "CRITICAL"),
            SensorStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Fan attached to a sensor during discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanLink {
    /// fan*_input file
    pub path: PathBuf,
    /// Last RPM reading, -1 when the read failed
    pub current_rpm: i64,
    /// Full-scale RPM used for the percentage
    pub max_rpm: i64,
    /// 0-100
    pub percent: u8,
}

impl FanLink {
    pub fn new(path: PathBuf, max_rpm: i64) -> Self {
        Self {
            path,
            current_rpm: 0,
            max_rpm,
            percent: 0,
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.current_rpm > 0
    }
}

/// One monitored temperature channel.
///
/// Identity (`name`, `label`, `path`, `category`, `critical_temp`) is fixed at
/// discovery. The live fields are rewritten by [`crate::stats::update_sensor`]
/// on every poll; `current`, `min`, `max` and `average` stay `None` until the
/// first successful read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sensor {
    pub(crate) name: String,
    pub(crate) label: String,
    pub(crate) path: PathBuf,
    pub(crate) category: SensorCategory,
    pub(crate) critical_temp: f64,

    pub(crate) current: Option<f64>,
    pub(crate) min: Option<f64>,
    pub(crate) max: Option<f64>,
    pub(crate) average: Option<f64>,
    pub(crate) sample_count: u64,
    pub(crate) status: SensorStatus,
    pub(crate) active: bool,

    pub(crate) fan: Option<FanLink>,
}

impl Sensor {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        path: impl Into<PathBuf>,
        category: SensorCategory,
        critical_temp: f64,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            path: path.into(),
            category,
            critical_temp,
            current: None,
            min: None,
            max: None,
            average: None,
            sample_count: 0,
            status: SensorStatus::Ok,
            active: true,
            fan: None,
        }
    }

    /// Chip or driver name (hwmon `name`, or the thermal zone directory)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// File the current value is read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn category(&self) -> SensorCategory {
        self.category
    }

    pub fn critical_temp(&self) -> f64 {
        self.critical_temp
    }

    /// Last successful reading in °C
    pub fn current(&self) -> Option<f64> {
        self.current
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// Running mean of all successful readings
    pub fn average(&self) -> Option<f64> {
        self.average
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    pub fn status(&self) -> SensorStatus {
        self.status
    }

    /// False when the most recent read failed
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn has_fan(&self) -> bool {
        self.fan.is_some()
    }

    pub fn fan(&self) -> Option<&FanLink> {
        self.fan.as_ref()
    }

    /// True when the value file sits under `dir`
    pub fn is_rooted_at(&self, dir: &Path) -> bool {
        self.path.parent() == Some(dir)
    }
}

/// Where discovery looks for sensors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorSources {
    pub hwmon_root: PathBuf,
    pub thermal_root: PathBuf,
}

impl SensorSources {
    pub fn new(hwmon_root: impl Into<PathBuf>, thermal_root: impl Into<PathBuf>) -> Self {
        Self {
            hwmon_root: hwmon_root.into(),
            thermal_root: thermal_root.into(),
        }
    }
}

impl Default for SensorSources {
    fn default() -> Self {
        Self::new(HWMON_PATH, THERMAL_PATH)
    }
}

/// Clamp a reported critical threshold into the plausible range.
///
/// Anything outside 50-150 °C is a misread and replaced by `fallback`.
pub fn sanitize_critical(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(v) if CRITICAL_TEMP_RANGE.contains(&v) => v,
        Some(v) => {
            log::warn!(
                "implausible critical threshold {:.1}°C, using {:.1}°C",
                v,
                fallback
            );
            fallback
        }
        None => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sensor_has_no_samples() {
        let s = Sensor::new("coretemp", "Core 0", "/x/temp2_input", SensorCategory::Cpu, 100.0);
        assert_eq!(s.sample_count(), 0);
        assert!(s.current().is_none());
        assert!(s.min().is_none());
        assert!(s.max().is_none());
        assert!(!s.has_fan());
        assert_eq!(s.status(), SensorStatus::Ok);
    }

    #[test]
    fn test_sanitize_critical() {
        assert_eq!(sanitize_critical(Some(100.0), 90.0), 100.0);
        assert_eq!(sanitize_critical(Some(50.0), 90.0), 50.0);
        assert_eq!(sanitize_critical(Some(150.0), 90.0), 150.0);
        assert_eq!(sanitize_critical(Some(49.9), 90.0), 90.0);
        assert_eq!(sanitize_critical(Some(255.0), 90.0), 90.0);
        assert_eq!(sanitize_critical(None, 90.0), 90.0);
    }

    #[test]
    fn test_is_rooted_at() {
        let s = Sensor::new("x", "y", "/sys/class/hwmon/hwmon1/temp1_input", SensorCategory::Other, 90.0);
        assert!(s.is_rooted_at(Path::new("/sys/class/hwmon/hwmon1")));
        assert!(!s.is_rooted_at(Path::new("/sys/class/hwmon/hwmon10")));
    }

    #[test]
    fn test_category_names() {
        assert_eq!(SensorCategory::Nvme.to_string(), "NVMe");
        assert_eq!(SensorCategory::ALL.len(), 8);
        assert_eq!(SensorCategory::ALL[0], SensorCategory::Cpu);
    }
}
