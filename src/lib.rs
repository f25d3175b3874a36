//! # tempmon
//!
//! Real-time hardware temperature monitoring for Linux. tempmon discovers the
//! temperature channels the kernel exposes under `/sys/class/hwmon` (falling
//! back to `/sys/class/thermal` zones), classifies them into CPU, GPU, NVMe,
//! chipset, memory, VRM and disk sensors, links fans to them, and keeps
//! running per-sensor statistics across polls.
//!
//! ## Features
//!
//! - **Discovery**: hwmon chips and thermal zones, with label and threshold fallbacks
//! - **Classification**: ordered, case-insensitive rule table
//! - **Statistics**: running min/max/mean per sensor and a system summary per poll
//! - **Fans**: greedy fan-to-sensor linking with RPM and duty percentage
//! - **Terminal UI**: live dashboard (feature `cli`)
//!
//! ## Quick Start
//!
//! ```no_run
//! use tempmon::{Monitor, SensorSources};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut monitor = Monitor::discover(SensorSources::default())?;
//! let stats = monitor.poll_once();
//!
//! for sensor in monitor.sensors() {
//!     if let Some(temp) = sensor.current() {
//!         println!("{} {}: {:.1}°C ({})", sensor.category(), sensor.label(), temp, sensor.status());
//!     }
//! }
//! println!("CPU average: {:.1}°C", stats.cpu.average);
//! # Ok(())
//! # }
//! ```
//!
//! ## Platform Notes
//!
//! Sensor files are read directly from sysfs. Missing or unreadable files
//! never fail a poll: the sensor is marked inactive until it reads again.

pub mod config;
pub mod error;
pub mod hwmon;
pub mod monitor;
pub mod shutdown;
pub mod stats;
pub mod sysfs;

#[cfg(feature = "cli")]
pub mod tui;

pub use config::Config;
pub use error::{Error, Result};
pub use hwmon::{discover, FanLink, Sensor, SensorCategory, SensorSources, SensorStatus};
pub use monitor::{poll_once, Monitor, Renderer};
pub use shutdown::ShutdownToken;
pub use stats::{summarize, update_sensor, SystemStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
