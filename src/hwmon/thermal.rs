//! Thermal zone fallback
//!
//! Used only when no hwmon channel was found. Each
//! `/sys/class/thermal/thermal_zoneN` becomes one Chipset sensor reading
//! `thermal_zoneN/temp`.

use super::discovery::list_device_dirs;
use super::{sanitize_critical, Sensor, SensorCategory, MAX_SENSORS};
use crate::sysfs::{self, MILLI};
use log::{debug, warn};
use std::path::Path;

/// Critical threshold for zones that declare no usable critical trip point
pub const DEFAULT_ZONE_CRITICAL_TEMP: f64 = 100.0;

const ZONE_PREFIX: &str = "thermal_zone";

/// Trip points checked per zone
const MAX_TRIP_POINTS: usize = 16;

/// Build one sensor per thermal zone under `root`.
pub fn scan_thermal_zones(root: &Path) -> Vec<Sensor> {
    let mut sensors = Vec::new();

    for zone_dir in list_device_dirs(root, |name| name.starts_with(ZONE_PREFIX)) {
        if sensors.len() >= MAX_SENSORS {
            warn!("sensor limit of {} reached, skipping remaining zones", MAX_SENSORS);
            break;
        }

        let dir_name = zone_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let Some(index) = dir_name
            .strip_prefix(ZONE_PREFIX)
            .and_then(|n| n.parse::<u32>().ok())
        else {
            debug!("skipping {}: no zone index", zone_dir.display());
            continue;
        };

        let label = sysfs::read_text(zone_dir.join("type"))
            .unwrap_or_else(|| format!("Thermal Zone {}", index));
        let critical = sanitize_critical(critical_trip_point(&zone_dir), DEFAULT_ZONE_CRITICAL_TEMP);

        debug!("thermal zone {} '{}' (crit {:.1}°C)", index, label, critical);

        sensors.push(Sensor::new(
            dir_name,
            label,
            zone_dir.join("temp"),
            SensorCategory::Chipset,
            critical,
        ));
    }

    sensors
}

/// Temperature of the first trip point typed `critical`, in °C
fn critical_trip_point(zone_dir: &Path) -> Option<f64> {
    for i in 0..MAX_TRIP_POINTS {
        let trip_type = sysfs::read_text(zone_dir.join(format!("trip_point_{}_type", i)))?;
        if trip_type == "critical" {
            return sysfs::read_number(zone_dir.join(format!("trip_point_{}_temp", i)), MILLI);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hwmon::{discover, SensorSources};
    use std::fs;
    use tempfile::TempDir;

    fn make_zone(root: &Path, dir: &str, attrs: &[(&str, &str)]) {
        let zone = root.join(dir);
        fs::create_dir_all(&zone).unwrap();
        for (file, content) in attrs {
            fs::write(zone.join(file), format!("{}\n", content)).unwrap();
        }
    }

    #[test]
    fn test_acpitz_fallback_when_hwmon_empty() {
        let tmp = TempDir::new().unwrap();
        let hwmon = tmp.path().join("hwmon");
        let thermal = tmp.path().join("thermal");
        fs::create_dir_all(&hwmon).unwrap();
        make_zone(&thermal, "thermal_zone0", &[("type", "acpitz"), ("temp", "27800")]);

        let sensors = discover(&SensorSources::new(&hwmon, &thermal));
        assert_eq!(sensors.len(), 1);
        assert_eq!(sensors[0].category(), SensorCategory::Chipset);
        assert_eq!(sensors[0].critical_temp(), DEFAULT_ZONE_CRITICAL_TEMP);
        assert_eq!(sensors[0].label(), "acpitz");
        assert_eq!(sensors[0].path(), thermal.join("thermal_zone0/temp"));
    }

    #[test]
    fn test_zone_label_synthesized_from_index() {
        let tmp = TempDir::new().unwrap();
        make_zone(tmp.path(), "thermal_zone3", &[("temp", "40000")]);
        make_zone(tmp.path(), "cooling_device0", &[("type", "Processor")]);

        let sensors = scan_thermal_zones(tmp.path());
        assert_eq!(sensors.len(), 1);
        assert_eq!(sensors[0].label(), "Thermal Zone 3");
        assert_eq!(sensors[0].name(), "thermal_zone3");
    }

    #[test]
    fn test_critical_trip_point_is_used() {
        let tmp = TempDir::new().unwrap();
        make_zone(
            tmp.path(),
            "thermal_zone0",
            &[
                ("type", "x86_pkg_temp"),
                ("temp", "40000"),
                ("trip_point_0_type", "passive"),
                ("trip_point_0_temp", "95000"),
                ("trip_point_1_type", "critical"),
                ("trip_point_1_temp", "105000"),
            ],
        );
        make_zone(
            tmp.path(),
            "thermal_zone1",
            &[
                ("type", "acpitz"),
                ("temp", "40000"),
                ("trip_point_0_type", "critical"),
                ("trip_point_0_temp", "255000"),
            ],
        );

        let sensors = scan_thermal_zones(tmp.path());
        assert_eq!(sensors[0].critical_temp(), 105.0);
        // implausible trip point falls back to the zone default
        assert_eq!(sensors[1].critical_temp(), DEFAULT_ZONE_CRITICAL_TEMP);
    }

    #[test]
    fn test_hwmon_channels_suppress_fallback() {
        let tmp = TempDir::new().unwrap();
        let hwmon = tmp.path().join("hwmon");
        let thermal = tmp.path().join("thermal");
        let chip = hwmon.join("hwmon0");
        fs::create_dir_all(&chip).unwrap();
        fs::write(chip.join("temp1_input"), "30000").unwrap();
        make_zone(&thermal, "thermal_zone0", &[("type", "acpitz"), ("temp", "27800")]);

        let sensors = discover(&SensorSources::new(&hwmon, &thermal));
        assert_eq!(sensors.len(), 1);
        assert_eq!(sensors[0].name(), "Unknown");
    }
}
