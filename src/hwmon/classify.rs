//! Heuristic sensor classification
//!
//! Maps a hwmon chip name and channel label onto a [`SensorCategory`] with an
//! ordered table of substring rules. The first rule that matches wins, so the
//! table order is the tie-break: "vcore" hits the CPU rule through "core"
//! before the VRM rule ever sees it, and a CPU chip with a "gpu" label is
//! still a CPU.

use super::SensorCategory;

/// One row of the classification cascade
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub category: SensorCategory,
    /// Substrings matched against the lower-cased chip name
    pub names: &'static [&'static str],
    /// Substrings matched against the lower-cased channel label
    pub labels: &'static [&'static str],
}

impl Rule {
    fn matches(&self, name: &str, label: &str) -> bool {
        self.names.iter().any(|n| name.contains(n)) || self.labels.iter().any(|l| label.contains(l))
    }
}

/// Evaluation order: CPU, GPU, NVMe, Memory, VRM, Chipset, Disk. No match is Other.
pub const RULES: [Rule; 7] = [
    Rule {
        category: SensorCategory::Cpu,
        names: &["coretemp", "k10temp", "zenpower", "cpu", "tctl", "tccd"],
        labels: &["cpu", "tctl", "tccd", "core", "package", "tdie"],
    },
    Rule {
        category: SensorCategory::Gpu,
        names: &["amdgpu", "nouveau", "radeon", "nvidia", "i915"],
        labels: &["gpu", "edge", "junction"],
    },
    Rule {
        category: SensorCategory::Nvme,
        names: &["nvme"],
        labels: &["composite", "sensor 1", "sensor 2"],
    },
    Rule {
        category: SensorCategory::Memory,
        names: &["dimm"],
        labels: &["memory", "ram"],
    },
    Rule {
        category: SensorCategory::Vrm,
        names: &[],
        labels: &["vrm", "vcore", "soc"],
    },
    Rule {
        category: SensorCategory::Chipset,
        names: &["acpitz", "pch", "nct", "it87"],
        labels: &["motherboard", "chipset"],
    },
    Rule {
        category: SensorCategory::Disk,
        names: &["drivetemp", "sata"],
        labels: &["disk"],
    },
];

/// Classify a channel from its chip name and label. Pure and case-insensitive.
pub fn classify(name: &str, label: &str) -> SensorCategory {
    let name = name.to_lowercase();
    let label = label.to_lowercase();

    RULES
        .iter()
        .find(|rule| rule.matches(&name, &label))
        .map(|rule| rule.category)
        .unwrap_or(SensorCategory::Other)
}
