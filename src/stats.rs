//! Per-sensor running statistics and the system-wide summary
//!
//! [`update_sensor`] folds one reading into a sensor in place;
//! [`summarize`] recomputes [`SystemStats`] from scratch over the whole
//! collection. Nothing here carries state between polls except the sensors
//! themselves.

use crate::hwmon::{FanLink, Sensor, SensorCategory, SensorStatus};
use crate::sysfs::{self, MILLI};
use log::trace;
use serde::{Deserialize, Serialize};

/// Fraction of the critical threshold at which a sensor turns WARN
pub const WARN_RATIO: f64 = 0.85;

/// Status of a reading against its critical threshold.
///
/// No hysteresis: the result depends on this reading alone.
pub fn sensor_status(value: f64, critical: f64) -> SensorStatus {
    if value < 0.0 {
        SensorStatus::Error
    } else if value >= critical {
        SensorStatus::Critical
    } else if value >= critical * WARN_RATIO {
        SensorStatus::Warn
    } else {
        SensorStatus::Ok
    }
}

/// Fan speed as a percentage of `max_rpm`, capped at 100.
pub fn fan_percent(rpm: i64, max_rpm: i64) -> u8 {
    if rpm <= 0 || max_rpm <= 0 {
        return 0;
    }
    (rpm.saturating_mul(100) / max_rpm).min(100) as u8
}

/// Read the sensor's value file and fold the result in.
pub fn update_sensor(sensor: &mut Sensor) {
    let reading = sysfs::read_number(&sensor.path, MILLI);
    trace!("{} {} = {:?}", sensor.name, sensor.label, reading);
    record_reading(sensor, reading);

    if sensor.active {
        if let Some(fan) = sensor.fan.as_mut() {
            refresh_fan(fan);
        }
    }
}

/// Fold one reading (or a failed read) into the sensor.
///
/// A failed read only clears `active`; min, max, average and the sample
/// count keep their last good values.
pub fn record_reading(sensor: &mut Sensor, reading: Option<f64>) {
    let Some(value) = reading else {
        sensor.active = false;
        return;
    };

    sensor.current = Some(value);
    sensor.active = true;
    sensor.sample_count += 1;

    let n = sensor.sample_count as f64;
    match (sensor.min, sensor.max, sensor.average) {
        (Some(min), Some(max), Some(avg)) if sensor.sample_count > 1 => {
            sensor.min = Some(min.min(value));
            sensor.max = Some(max.max(value));
            sensor.average = Some((avg * (n - 1.0) + value) / n);
        }
        _ => {
            sensor.min = Some(value);
            sensor.max = Some(value);
            sensor.average = Some(value);
        }
    }

    sensor.status = sensor_status(value, sensor.critical_temp);
}

fn refresh_fan(fan: &mut FanLink) {
    fan.current_rpm = sysfs::read_int(&fan.path).unwrap_or(-1);
    fan.percent = fan_percent(fan.current_rpm, fan.max_rpm);
}

/// Average, peak and floor of one category for the latest poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    /// Active sensors contributing
    pub count: usize,
    /// Mean of current values, 0.0 when `count` is 0
    pub average: f64,
    /// Highest current value, 0.0 when `count` is 0
    pub peak: f64,
    /// Lowest current value, 0.0 when `count` is 0
    pub floor: f64,
}

/// System-wide summary, rebuilt on every poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    pub cpu: CategoryStats,
    pub gpu: CategoryStats,
    pub nvme: CategoryStats,
    pub chipset_count: usize,
    pub active_sensors: usize,
    /// Linked fans currently reporting a nonzero RPM
    pub active_fans: usize,
    pub warnings: usize,
    pub criticals: usize,
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
    peak: Option<f64>,
    floor: Option<f64>,
}

impl Accumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
        self.peak = Some(self.peak.map_or(value, |p| p.max(value)));
        self.floor = Some(self.floor.map_or(value, |f| f.min(value)));
    }

    fn finish(self) -> CategoryStats {
        if self.count == 0 {
            return CategoryStats::default();
        }
        CategoryStats {
            count: self.count,
            average: self.sum / self.count as f64,
            peak: self.peak.unwrap_or(0.0),
            floor: self.floor.unwrap_or(0.0),
        }
    }
}

/// Summarize the current values of all active sensors in one pass.
pub fn summarize(sensors: &[Sensor]) -> SystemStats {
    let mut stats = SystemStats::default();
    let mut cpu = Accumulator::default();
    let mut gpu = Accumulator::default();
    let mut nvme = Accumulator::default();

    for sensor in sensors {
        let value = match sensor.current {
            Some(v) if sensor.active => v,
            _ => continue,
        };

        stats.active_sensors += 1;

        match sensor.status {
            SensorStatus::Warn => stats.warnings += 1,
            SensorStatus::Critical => stats.criticals += 1,
            _ => {}
        }

        if sensor.fan.as_ref().is_some_and(FanLink::is_spinning) {
            stats.active_fans += 1;
        }

        match sensor.category {
            SensorCategory::Cpu => cpu.add(value),
            SensorCategory::Gpu => gpu.add(value),
            SensorCategory::Nvme => nvme.add(value),
            SensorCategory::Chipset => stats.chipset_count += 1,
            _ => {}
        }
    }

    stats.cpu = cpu.finish();
    stats.gpu = gpu.finish();
    stats.nvme = nvme.finish();
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sensor(category: SensorCategory, critical: f64) -> Sensor {
        Sensor::new("chip", "label", "/nonexistent/temp1_input", category, critical)
    }

    fn with_value(category: SensorCategory, value: f64) -> Sensor {
        let mut s = sensor(category, 100.0);
        record_reading(&mut s, Some(value));
        s
    }

    #[test]
    fn test_status_boundaries_at_80() {
        assert_eq!(sensor_status(67.9, 80.0), SensorStatus::Ok);
        assert_eq!(sensor_status(68.0, 80.0), SensorStatus::Warn);
        assert_eq!(sensor_status(79.9, 80.0), SensorStatus::Warn);
        assert_eq!(sensor_status(80.0, 80.0), SensorStatus::Critical);
        assert_eq!(sensor_status(-1.0, 80.0), SensorStatus::Error);
        assert_eq!(sensor_status(0.0, 80.0), SensorStatus::Ok);
    }

    #[test]
    fn test_fan_percent() {
        assert_eq!(fan_percent(2500, 5000), 50);
        assert_eq!(fan_percent(6000, 5000), 100);
        assert_eq!(fan_percent(0, 5000), 0);
        assert_eq!(fan_percent(-1, 5000), 0);
        assert_eq!(fan_percent(1000, 0), 0);
        assert_eq!(fan_percent(128, 255), 50);
    }

    #[test]
    fn test_first_sample_initializes_everything() {
        let mut s = sensor(SensorCategory::Cpu, 100.0);
        record_reading(&mut s, Some(42.0));
        assert_eq!(s.current(), Some(42.0));
        assert_eq!(s.min(), Some(42.0));
        assert_eq!(s.max(), Some(42.0));
        assert_eq!(s.average(), Some(42.0));
        assert_eq!(s.sample_count(), 1);
        assert!(s.is_active());
    }

    #[test]
    fn test_running_mean_matches_arithmetic_mean() {
        let mut s = sensor(SensorCategory::Cpu, 100.0);
        let readings = [
            Some(40.0),
            None,
            Some(50.0),
            Some(45.5),
            None,
            None,
            Some(61.25),
            Some(38.0),
        ];

        let mut taken = Vec::new();
        for r in readings {
            record_reading(&mut s, r);
            if let Some(v) = r {
                taken.push(v);
            }
            if let (Some(min), Some(cur), Some(max)) = (s.min(), s.current(), s.max()) {
                assert!(min <= cur && cur <= max);
            }
        }

        let mean = taken.iter().sum::<f64>() / taken.len() as f64;
        assert_eq!(s.sample_count(), taken.len() as u64);
        assert!((s.average().unwrap() - mean).abs() < 1e-9);
        assert_eq!(s.min(), Some(38.0));
        assert_eq!(s.max(), Some(61.25));
    }

    #[test]
    fn test_failed_read_keeps_history() {
        let mut s = sensor(SensorCategory::Cpu, 100.0);
        record_reading(&mut s, Some(55.0));
        record_reading(&mut s, None);
        assert!(!s.is_active());
        assert_eq!(s.current(), Some(55.0));
        assert_eq!(s.average(), Some(55.0));
        assert_eq!(s.sample_count(), 1);

        record_reading(&mut s, Some(65.0));
        assert!(s.is_active());
        assert_eq!(s.average(), Some(60.0));
    }

    #[test]
    fn test_update_sensor_reads_file() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("temp1_input");
        let mut s = Sensor::new("coretemp", "Package id 0", &input, SensorCategory::Cpu, 100.0);

        fs::write(&input, "65000\n").unwrap();
        update_sensor(&mut s);
        assert_eq!(s.current(), Some(65.0));
        assert_eq!(s.status(), SensorStatus::Ok);

        fs::write(&input, "86000\n").unwrap();
        update_sensor(&mut s);
        assert_eq!(s.current(), Some(86.0));
        assert_eq!(s.status(), SensorStatus::Warn);

        fs::write(&input, "100000\n").unwrap();
        update_sensor(&mut s);
        assert_eq!(s.status(), SensorStatus::Critical);

        fs::remove_file(&input).unwrap();
        update_sensor(&mut s);
        assert!(!s.is_active());
        assert_eq!(s.max(), Some(100.0));
        assert_eq!(s.sample_count(), 3);
    }

    #[test]
    fn test_update_refreshes_linked_fan() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("temp1_input");
        let fan_input = tmp.path().join("fan1_input");
        fs::write(&input, "40000").unwrap();
        fs::write(&fan_input, "1500").unwrap();

        let mut s = Sensor::new("nct6798", "SYSTIN", &input, SensorCategory::Chipset, 90.0);
        s.fan = Some(FanLink::new(fan_input.clone(), 3000));
        update_sensor(&mut s);

        let fan = s.fan().unwrap();
        assert_eq!(fan.current_rpm, 1500);
        assert_eq!(fan.percent, 50);

        fs::remove_file(&fan_input).unwrap();
        update_sensor(&mut s);
        let fan = s.fan().unwrap();
        assert_eq!(fan.current_rpm, -1);
        assert_eq!(fan.percent, 0);
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(summarize(&[]), SystemStats::default());

        let never_read = vec![sensor(SensorCategory::Cpu, 90.0)];
        let stats = summarize(&never_read);
        assert_eq!(stats.active_sensors, 0);
        assert_eq!(stats.cpu.floor, 0.0);
        assert_eq!(stats.cpu.average, 0.0);
    }

    #[test]
    fn test_summarize_categories() {
        let mut sensors = vec![
            with_value(SensorCategory::Cpu, 40.0),
            with_value(SensorCategory::Cpu, 60.0),
            with_value(SensorCategory::Gpu, 70.0),
            with_value(SensorCategory::Nvme, 35.0),
            with_value(SensorCategory::Nvme, 45.0),
            with_value(SensorCategory::Chipset, 30.0),
            with_value(SensorCategory::Other, 99.0),
            with_value(SensorCategory::Cpu, 100.0),
        ];
        // last CPU goes inactive and must not count
        record_reading(&mut sensors[7], None);

        let stats = summarize(&sensors);
        assert_eq!(stats.active_sensors, 7);
        assert_eq!(stats.cpu.count, 2);
        assert_eq!(stats.cpu.average, 50.0);
        assert_eq!(stats.cpu.peak, 60.0);
        assert_eq!(stats.cpu.floor, 40.0);
        assert_eq!(stats.gpu.average, 70.0);
        assert_eq!(stats.gpu.peak, 70.0);
        assert_eq!(stats.nvme.average, 40.0);
        assert_eq!(stats.chipset_count, 1);
        // 99 of 100 is critical-adjacent: WARN
        assert_eq!(stats.warnings, 1);
        assert_eq!(stats.criticals, 0);
    }

    #[test]
    fn test_summarize_counts_criticals_and_fans() {
        let mut hot = with_value(SensorCategory::Gpu, 105.0);
        let mut fan = FanLink::new("/x/fan1_input".into(), 5000);
        fan.current_rpm = 1200;
        hot.fan = Some(fan);

        let mut idle = with_value(SensorCategory::Other, 30.0);
        idle.fan = Some(FanLink::new("/x/fan2_input".into(), 5000));

        let stats = summarize(&[hot, idle]);
        assert_eq!(stats.criticals, 1);
        assert_eq!(stats.active_fans, 1);
    }
}
