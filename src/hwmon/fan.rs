//! Fan discovery and fan-to-sensor linking
//!
//! Fans are `fanN_input` files next to the temperature channels of a hwmon
//! chip. Linking is greedy and order dependent: each fan goes to the first
//! sensor of the same chip directory that has no fan yet. A chip with three
//! fans and two sensors links two pairs and leaves the third fan unattached.

use super::discovery::{list_channels, list_device_dirs};
use super::{FanLink, Sensor};
use crate::sysfs;
use log::debug;
use std::path::{Path, PathBuf};

/// Full-scale RPM assumed when a chip reports no maximum
pub const DEFAULT_FAN_MAX_RPM: i64 = 5000;

/// Full scale of a PWM duty cycle
pub const PWM_FULL_SCALE: i64 = 255;

/// A fan channel found on disk
#[derive(Debug, Clone, PartialEq)]
pub struct FanChannel {
    /// Chip directory the fan belongs to
    pub chip_dir: PathBuf,
    /// fanN_input
    pub path: PathBuf,
    pub index: u32,
    pub max_rpm: i64,
}

/// Every `fanN_input` under `root`, in discovery order.
pub fn scan_fans(root: &Path) -> Vec<FanChannel> {
    let mut fans = Vec::new();

    for chip_dir in list_device_dirs(root, |_| true) {
        for (index, path) in list_channels(&chip_dir, "fan") {
            let max_rpm = fan_max_rpm(&chip_dir, index);
            fans.push(FanChannel {
                chip_dir: chip_dir.clone(),
                path,
                index,
                max_rpm,
            });
        }
    }

    fans
}

/// Full-scale value for fan `index`: `fanN_max`, else the PWM scale when a
/// `pwmN_max` file exists, else [`DEFAULT_FAN_MAX_RPM`].
fn fan_max_rpm(chip_dir: &Path, index: u32) -> i64 {
    if let Some(max) = sysfs::read_int(chip_dir.join(format!("fan{}_max", index))).filter(|m| *m > 0) {
        return max;
    }
    if chip_dir.join(format!("pwm{}_max", index)).exists() {
        return PWM_FULL_SCALE;
    }
    DEFAULT_FAN_MAX_RPM
}

/// Attach fans found under `root` to `sensors`. Returns the number linked.
pub fn link_fans(root: &Path, sensors: &mut [Sensor]) -> usize {
    let mut linked = 0;

    for fan in scan_fans(root) {
        let target = sensors
            .iter_mut()
            .find(|s| s.is_rooted_at(&fan.chip_dir) && s.fan.is_none());

        match target {
            Some(sensor) => {
                debug!("fan{} -> {} '{}'", fan.index, sensor.name, sensor.label);
                sensor.fan = Some(FanLink::new(fan.path, fan.max_rpm));
                linked += 1;
            }
            None => debug!("fan {} left unassociated", fan.path.display()),
        }
    }

    linked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hwmon::discovery::tests::make_chip;
    use crate::hwmon::{discover, SensorSources};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_single_sensor_takes_first_fan_only() {
        let tmp = TempDir::new().unwrap();
        let hwmon = tmp.path().join("hwmon");
        let chip = make_chip(
            &hwmon,
            "hwmon0",
            &[
                ("name", "nct6798"),
                ("temp1_input", "35000"),
                ("fan1_input", "1200"),
                ("fan2_input", "900"),
            ],
        );

        let sensors = discover(&SensorSources::new(&hwmon, tmp.path().join("thermal")));
        assert_eq!(sensors.len(), 1);
        let fan = sensors[0].fan().expect("fan linked");
        assert_eq!(fan.path, chip.join("fan1_input"));
        assert_eq!(fan.max_rpm, DEFAULT_FAN_MAX_RPM);
    }

    #[test]
    fn test_links_min_of_fans_and_sensors() {
        let tmp = TempDir::new().unwrap();
        make_chip(
            tmp.path(),
            "hwmon0",
            &[
                ("temp1_input", "1"),
                ("temp2_input", "1"),
                ("temp3_input", "1"),
                ("fan1_input", "1"),
                ("fan2_input", "1"),
            ],
        );

        let mut sensors = crate::hwmon::discovery::scan_hwmon(tmp.path());
        let linked = link_fans(tmp.path(), &mut sensors);
        assert_eq!(linked, 2);
        assert!(sensors[0].has_fan());
        assert!(sensors[1].has_fan());
        assert!(!sensors[2].has_fan());
    }

    #[test]
    fn test_fans_stay_within_their_chip() {
        let tmp = TempDir::new().unwrap();
        make_chip(tmp.path(), "hwmon0", &[("name", "coretemp"), ("temp1_input", "1")]);
        make_chip(tmp.path(), "hwmon1", &[("name", "it87"), ("fan1_input", "800")]);

        let mut sensors = crate::hwmon::discovery::scan_hwmon(tmp.path());
        assert_eq!(link_fans(tmp.path(), &mut sensors), 0);
        assert!(!sensors[0].has_fan());
    }

    #[test]
    fn test_fan_max_sources() {
        let tmp = TempDir::new().unwrap();
        let chip = make_chip(
            tmp.path(),
            "hwmon0",
            &[
                ("fan1_input", "1000"),
                ("fan1_max", "3000"),
                ("fan2_input", "1000"),
                ("pwm2_max", "255"),
                ("fan3_input", "1000"),
                ("fan3_max", "0"),
            ],
        );

        let fans = scan_fans(tmp.path());
        assert_eq!(fans.len(), 3);
        assert_eq!(fans[0].max_rpm, 3000);
        assert_eq!(fans[1].max_rpm, PWM_FULL_SCALE);
        assert_eq!(fans[2].max_rpm, DEFAULT_FAN_MAX_RPM);
        assert!(fans.iter().all(|f| f.chip_dir == chip));
    }

    #[test]
    fn test_thermal_zone_sensors_get_no_fans() {
        let tmp = TempDir::new().unwrap();
        let hwmon = tmp.path().join("hwmon");
        make_chip(&hwmon, "hwmon0", &[("fan1_input", "1000")]);
        let zone = tmp.path().join("thermal/thermal_zone0");
        fs::create_dir_all(&zone).unwrap();
        fs::write(zone.join("temp"), "40000").unwrap();

        let sensors = discover(&SensorSources::new(&hwmon, tmp.path().join("thermal")));
        assert_eq!(sensors.len(), 1);
        assert!(!sensors[0].has_fan());
    }
}
