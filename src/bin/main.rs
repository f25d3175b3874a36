//! CLI tool for tempmon

use clap::{Parser, ValueEnum};
use log::warn;
use serde::Serialize;
use std::path::PathBuf;
use std::process;

use tempmon::config::Config;
use tempmon::hwmon::{Sensor, SensorCategory};
use tempmon::shutdown::{self, ShutdownToken};
use tempmon::stats::SystemStats;
use tempmon::tui::celsius_to_fahrenheit;
use tempmon::{Error, Monitor};

#[derive(Parser)]
#[command(name = "tempmon")]
#[command(about = "Real-time hardware temperature monitoring for Linux", long_about = None)]
#[command(version, disable_version_flag = true)]
struct Cli {
    /// Print version
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    version: Option<bool>,

    /// Update interval in seconds (1-60, default: 2)
    #[arg(value_name = "REFRESH_RATE")]
    refresh_rate: Option<u64>,

    /// Use Fahrenheit instead of Celsius
    #[arg(short = 'f', long)]
    fahrenheit: bool,

    /// Show detailed statistics
    #[arg(short = 's', long)]
    stats: bool,

    /// Use compact display mode
    #[arg(short = 'c', long)]
    compact: bool,

    /// Show fan speed monitoring
    #[arg(short = 'F', long, conflicts_with = "no_fans")]
    fans: bool,

    /// Disable fan speed monitoring
    #[arg(short = 'n', long)]
    no_fans: bool,

    /// List all detected sensors and exit
    #[arg(short = 'l', long, conflicts_with = "once")]
    list: bool,

    /// Poll once, print a snapshot and exit
    #[arg(long)]
    once: bool,

    /// Output format for --list and --once
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Configuration file (default: ~/.config/tempmon/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// hwmon root directory
    #[arg(long, value_name = "PATH")]
    hwmon_root: Option<PathBuf>,

    /// Thermal zone root directory
    #[arg(long, value_name = "PATH")]
    thermal_root: Option<PathBuf>,

    /// Save the effective settings to the configuration file and exit
    #[arg(long)]
    save_config: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct Snapshot<'a> {
    timestamp: String,
    sensors: &'a [Sensor],
    stats: &'a SystemStats,
}

fn main() {
    let cli = Cli::parse();

    env_logger::init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("ignoring configuration file: {}", e);
            Config::default()
        }),
    };
    apply_overrides(&mut config, &cli)?;

    if cli.save_config {
        let path = match &cli.config {
            Some(path) => {
                config.save_to(path)?;
                path.clone()
            }
            None => config.save()?,
        };
        println!("Configuration saved to {}", path.display());
        return Ok(());
    }

    let mut monitor = match Monitor::discover(config.sources()) {
        Ok(monitor) => monitor,
        Err(Error::NoSensors {
            hwmon_root,
            thermal_root,
        }) => {
            print_troubleshooting(&hwmon_root, &thermal_root);
            process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let fahrenheit = config.general.use_fahrenheit;

    if cli.list {
        match cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(monitor.sensors())?),
            OutputFormat::Text => print_sensor_list(monitor.sensors(), fahrenheit),
        }
        return Ok(());
    }

    if cli.once {
        let stats = monitor.poll_once();
        match cli.format {
            OutputFormat::Json => {
                let snapshot = Snapshot {
                    timestamp: chrono::Local::now().to_rfc3339(),
                    sensors: monitor.sensors(),
                    stats: &stats,
                };
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
            OutputFormat::Text => print_snapshot(monitor.sensors(), &stats, &config),
        }
        return Ok(());
    }

    print_discovery_summary(&monitor);

    let interval = config.refresh_interval();
    println!("Starting real-time monitoring (refresh rate: {}s)...", interval.as_secs());

    let token = ShutdownToken::new();
    shutdown::install_signal_handlers(&token)?;

    tempmon::tui::run(&mut monitor, &config.general, interval, &token)?;

    println!();
    println!("Monitoring stopped.");
    println!("tempmon v{}", tempmon::VERSION);
    Ok(())
}

/// Fold command-line flags over the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) -> tempmon::Result<()> {
    if let Some(rate) = cli.refresh_rate {
        config.general.refresh_interval_secs = Config::validate_refresh(rate)?;
    }
    if cli.fahrenheit {
        config.general.use_fahrenheit = true;
    }
    if cli.stats {
        config.general.show_stats = true;
    }
    if cli.compact {
        config.general.compact_mode = true;
    }
    if cli.fans {
        config.general.show_fans = true;
    }
    if cli.no_fans {
        config.general.show_fans = false;
    }
    if let Some(root) = &cli.hwmon_root {
        config.sources.hwmon_root = root.clone();
    }
    if let Some(root) = &cli.thermal_root {
        config.sources.thermal_root = root.clone();
    }
    Ok(())
}

fn format_temp(celsius: Option<f64>, fahrenheit: bool) -> String {
    match celsius {
        Some(c) if fahrenheit => format!("{:.1}°F", celsius_to_fahrenheit(c)),
        Some(c) => format!("{:.1}°C", c),
        None => "N/A".to_string(),
    }
}

fn print_troubleshooting(hwmon_root: &std::path::Path, thermal_root: &std::path::Path) {
    eprintln!();
    eprintln!("[X] ERROR: No temperature sensors detected!");
    eprintln!("    Searched {} and {}", hwmon_root.display(), thermal_root.display());
    eprintln!();
    eprintln!("TROUBLESHOOTING STEPS:");
    eprintln!();
    eprintln!("1. Load Kernel Modules:");
    eprintln!("   # For Intel CPUs:");
    eprintln!("   sudo modprobe coretemp");
    eprintln!("   # For AMD CPUs:");
    eprintln!("   sudo modprobe k10temp");
    eprintln!("   # For AMD Ryzen (alternative):");
    eprintln!("   sudo modprobe zenpower");
    eprintln!();
    eprintln!("2. Install and Configure lm-sensors:");
    eprintln!("   sudo apt install lm-sensors");
    eprintln!("   sudo sensors-detect");
    eprintln!();
    eprintln!("3. Verify Sensors:");
    eprintln!("   ls -la {}", hwmon_root.display());
    eprintln!("   sensors");
    eprintln!();
    eprintln!("4. Check Permissions:");
    eprintln!("   Make sure you have read access to {}", hwmon_root.display());
    eprintln!();
}

fn print_discovery_summary(monitor: &Monitor) {
    let total = monitor.len();
    let cpu = monitor.count(SensorCategory::Cpu);
    let gpu = monitor.count(SensorCategory::Gpu);
    let nvme = monitor.count(SensorCategory::Nvme);

    println!(
        "[+] Successfully detected {} temperature sensor{}!",
        total,
        if total != 1 { "s" } else { "" }
    );
    println!(
        "    CPU: {}  |  GPU: {}  |  NVMe: {}  |  Other: {}",
        cpu,
        gpu,
        nvme,
        total - cpu - gpu - nvme
    );
    println!(
        "    Sources: {} (fallback {})",
        monitor.sources().hwmon_root.display(),
        monitor.sources().thermal_root.display()
    );
}

fn print_sensor_list(sensors: &[Sensor], fahrenheit: bool) {
    println!("=== Detected Sensors ({}) ===\n", sensors.len());
    println!(
        "{:>3}  {:<8} {:<14} {:<24} {:>9}  {:<4} Path",
        "#", "Category", "Chip", "Label", "Critical", "Fan"
    );
    for (i, sensor) in sensors.iter().enumerate() {
        println!(
            "{:>3}  {:<8} {:<14} {:<24} {:>9}  {:<4} {}",
            i + 1,
            sensor.category().name(),
            sensor.name(),
            sensor.label(),
            format_temp(Some(sensor.critical_temp()), fahrenheit),
            if sensor.has_fan() { "yes" } else { "-" },
            sensor.path().display()
        );
    }
}

fn print_snapshot(sensors: &[Sensor], stats: &SystemStats, config: &Config) {
    let fahrenheit = config.general.use_fahrenheit;

    for category in SensorCategory::ALL {
        let group: Vec<&Sensor> = sensors.iter().filter(|s| s.category() == category).collect();
        if group.is_empty() {
            continue;
        }

        println!("=== {} ===", category.name());
        for sensor in group {
            let current = if sensor.is_active() { sensor.current() } else { None };
            print!(
                "  {:<24} {:>9}  {:<8}",
                sensor.label(),
                format_temp(current, fahrenheit),
                sensor.status().to_string()
            );
            if config.general.show_fans {
                match sensor.fan() {
                    Some(fan) if sensor.is_active() && fan.current_rpm >= 0 => {
                        print!(" fan {} RPM ({}%)", fan.current_rpm, fan.percent)
                    }
                    Some(_) => print!(" fan N/A"),
                    None => {}
                }
            }
            println!();
        }
        println!();
    }

    if config.general.show_stats {
        println!("=== Statistics ===");
        if stats.cpu.count > 0 {
            println!(
                "  CPU:  avg {}  max {}  min {}",
                format_temp(Some(stats.cpu.average), fahrenheit),
                format_temp(Some(stats.cpu.peak), fahrenheit),
                format_temp(Some(stats.cpu.floor), fahrenheit)
            );
        }
        if stats.gpu.count > 0 {
            println!(
                "  GPU:  avg {}  max {}",
                format_temp(Some(stats.gpu.average), fahrenheit),
                format_temp(Some(stats.gpu.peak), fahrenheit)
            );
        }
        if stats.nvme.count > 0 {
            println!("  NVMe: avg {}", format_temp(Some(stats.nvme.average), fahrenheit));
        }
        println!("  Chipset sensors: {}", stats.chipset_count);
    }

    println!(
        "Active: {}  Fans spinning: {}  Warnings: {}  Critical: {}",
        stats.active_sensors, stats.active_fans, stats.warnings, stats.criticals
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_lowercase_v_prints_version() {
        for flag in ["-v", "--version"] {
            let err = Cli::try_parse_from(["tempmon", flag]).err().unwrap();
            assert_eq!(err.kind(), ErrorKind::DisplayVersion);
        }
    }

    #[test]
    fn test_refresh_rate_and_flags() {
        let cli = Cli::try_parse_from(["tempmon", "-f", "-s", "5"]).unwrap();
        assert_eq!(cli.refresh_rate, Some(5));

        let mut config = Config::default();
        apply_overrides(&mut config, &cli).unwrap();
        assert!(config.general.use_fahrenheit);
        assert!(config.general.show_stats);
        assert_eq!(config.general.refresh_interval_secs, 5);

        let cli = Cli::try_parse_from(["tempmon", "61"]).unwrap();
        assert!(apply_overrides(&mut config, &cli).is_err());
    }
}
