// hwmon sensor discovery
//
// Walks /sys/class/hwmon once at startup:
//   hwmonN/name            chip name
//   hwmonN/tempM_input     current value (millidegrees)
//   hwmonN/tempM_label     channel label
//   hwmonN/tempM_crit      critical threshold (millidegrees)
//   hwmonN/tempM_max       fallback threshold
//
// Falls back to thermal zones when no hwmon channel exists, then links fans.

use super::{
    classify, fan, sanitize_critical, thermal, Sensor, SensorSources, DEFAULT_CRITICAL_TEMP,
    MAX_PATH_LEN, MAX_SENSORS,
};
use crate::sysfs::{self, MILLI};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Discover every temperature channel under `sources`.
///
/// An empty result means nothing readable was found; the caller decides how
/// to report that.
pub fn discover(sources: &SensorSources) -> Vec<Sensor> {
    let mut sensors = scan_hwmon(&sources.hwmon_root);

    if sensors.is_empty() {
        debug!(
            "no hwmon temperature channels, trying thermal zones under {}",
            sources.thermal_root.display()
        );
        sensors = thermal::scan_thermal_zones(&sources.thermal_root);
    }

    if !sensors.is_empty() {
        let linked = fan::link_fans(&sources.hwmon_root, &mut sensors);
        info!("discovered {} sensors, {} with fans", sensors.len(), linked);
    }

    sensors
}

/// Scan all hwmon chips for `temp*_input` channels.
pub fn scan_hwmon(root: &Path) -> Vec<Sensor> {
    let mut sensors = Vec::new();

    for chip_dir in list_device_dirs(root, |_| true) {
        if sensors.len() >= MAX_SENSORS {
            warn!("sensor limit of {} reached, skipping remaining chips", MAX_SENSORS);
            break;
        }

        let chip_name = sysfs::read_text(chip_dir.join("name")).unwrap_or_else(|| "Unknown".to_string());
        debug!("hwmon chip {} at {}", chip_name, chip_dir.display());

        for (index, input) in list_channels(&chip_dir, "temp") {
            if sensors.len() >= MAX_SENSORS {
                warn!("sensor limit of {} reached", MAX_SENSORS);
                break;
            }
            sensors.push(build_sensor(&chip_dir, &chip_name, index, input));
        }
    }

    sensors
}

fn build_sensor(chip_dir: &Path, chip_name: &str, index: u32, input: PathBuf) -> Sensor {
    let label = sysfs::read_text(chip_dir.join(format!("temp{}_label", index)))
        .unwrap_or_else(|| format!("Sensor {}", index));

    let category = classify(chip_name, &label);

    let reported = sysfs::read_number(chip_dir.join(format!("temp{}_crit", index)), MILLI)
        .or_else(|| sysfs::read_number(chip_dir.join(format!("temp{}_max", index)), MILLI));
    let critical = sanitize_critical(reported, DEFAULT_CRITICAL_TEMP);

    debug!(
        "  temp{} '{}' -> {} (crit {:.1}°C)",
        index, label, category, critical
    );

    Sensor::new(chip_name, label, input, category, critical)
}

/// List the device directories directly under `root`, sorted by name.
///
/// Hidden entries, non-directories, paths of [`MAX_PATH_LEN`] bytes or more
/// and names rejected by `accept` are skipped. A missing root yields nothing.
pub(crate) fn list_device_dirs(root: &Path, accept: impl Fn(&str) -> bool) -> Vec<PathBuf> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("cannot open {}: {}", root.display(), e);
            return Vec::new();
        }
    };

    let mut dirs: Vec<(String, PathBuf)> = entries
        .filter_map(|e| e.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') || !accept(&name) {
                return None;
            }
            let path = entry.path();
            if path.as_os_str().len() >= MAX_PATH_LEN {
                warn!("skipping overlong path {}", path.display());
                return None;
            }
            if !sysfs::dir_exists(&path) {
                return None;
            }
            Some((name, path))
        })
        .collect();

    dirs.sort_by(|a, b| natural_key(&a.0).cmp(&natural_key(&b.0)));
    dirs.into_iter().map(|(_, path)| path).collect()
}

/// List `<prefix>N_input` files in `dir`, ordered by channel index.
pub(crate) fn list_channels(dir: &Path, prefix: &str) -> Vec<(u32, PathBuf)> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("cannot list {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut channels: Vec<(u32, PathBuf)> = entries
        .filter_map(|e| e.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with(prefix) || !name.ends_with("_input") {
                return None;
            }
            match channel_index(&name, prefix) {
                Some(index) => Some((index, entry.path())),
                None => {
                    debug!("skipping {} in {}: no channel index", name, dir.display());
                    None
                }
            }
        })
        .collect();

    channels.sort_by_key(|(index, _)| *index);
    channels
}

/// Channel number of a file such as `temp3_input` (prefix `temp`) -> 3
pub fn channel_index(file_name: &str, prefix: &str) -> Option<u32> {
    file_name
        .strip_prefix(prefix)?
        .strip_suffix("_input")?
        .parse()
        .ok()
}

/// Sort key putting `hwmon2` before `hwmon10`
fn natural_key(name: &str) -> (String, u64) {
    let split = name
        .rfind(|c: char| !c.is_ascii_digit())
        .map(|i| i + 1)
        .unwrap_or(0);
    let (stem, digits) = name.split_at(split);
    (stem.to_string(), digits.parse().unwrap_or(u64::MAX))
}
