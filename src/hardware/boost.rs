//! Boost control backends
//!
//! The sysfs backend switches cpufreq/devfreq governors; each boost level
//! is a governor name. The dry-run backend only logs.

use crate::core::{BoostConfig, BoostLevel, Error, Result, ThermalConfig};
use crate::hardware::{thermal, BoostController};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

fn cpu_governor(level: BoostLevel) -> &'static str {
    match level {
        BoostLevel::Off => "interactive",
        BoostLevel::Mid => "schedutil",
        BoostLevel::Max => "performance",
    }
}

fn gpu_governor(level: BoostLevel) -> &'static str {
    match level {
        BoostLevel::Off => "msm-adreno-tz",
        BoostLevel::Mid => "simple_ondemand",
        BoostLevel::Max => "performance",
    }
}

/// Governor-switching controller backed by sysfs files
pub struct SysfsBoostController {
    cpu_governor_path: PathBuf,
    gpu_governor_path: PathBuf,
    thermal: ThermalConfig,
}

impl SysfsBoostController {
    pub fn new(boost: &BoostConfig, thermal: ThermalConfig) -> Self {
        Self {
            cpu_governor_path: boost.cpu_governor_path.clone(),
            gpu_governor_path: boost.gpu_governor_path.clone(),
            thermal,
        }
    }

    fn write_governor(path: &Path, governor: &str) -> Result<()> {
        fs::write(path, format!("{}\n", governor)).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::PermissionDenied => {
                    format!("permission denied writing {:?} (root required)", path)
                }
                _ => format!("writing {:?}: {}", path, e),
            };
            Error::ControlRejected(reason)
        })
    }
}

impl BoostController for SysfsBoostController {
    fn set_cpu_boost(&self, level: BoostLevel) -> Result<()> {
        Self::write_governor(&self.cpu_governor_path, cpu_governor(level))?;
        log::info!("CPU boost level set to: {}", level);
        Ok(())
    }

    fn set_gpu_boost(&self, level: BoostLevel) -> Result<()> {
        Self::write_governor(&self.gpu_governor_path, gpu_governor(level))?;
        log::info!("GPU boost level set to: {}", level);
        Ok(())
    }

    fn set_turbo_enabled(&self, enabled: bool) -> Result<()> {
        let level = if enabled { BoostLevel::Max } else { BoostLevel::Off };
        Self::write_governor(&self.cpu_governor_path, cpu_governor(level))?;
        Self::write_governor(&self.gpu_governor_path, gpu_governor(level))?;
        log::info!("Turbo mode {}", if enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    fn cpu_temperature(&self) -> Result<f32> {
        thermal::read_cpu_temperature(&self.thermal.cpu_temp_paths)
    }

    fn battery_temperature(&self) -> Result<f32> {
        thermal::read_battery_temperature(&self.thermal.battery_temp_paths)
    }

    fn name(&self) -> &str {
        "sysfs governors"
    }
}

/// Controller that accepts every command without touching hardware
pub struct DryRunBoostController {
    thermal: ThermalConfig,
}

impl DryRunBoostController {
    pub fn new(thermal: ThermalConfig) -> Self {
        Self { thermal }
    }
}

impl BoostController for DryRunBoostController {
    fn set_cpu_boost(&self, level: BoostLevel) -> Result<()> {
        log::info!("[dry-run] CPU boost -> {} ({})", level, cpu_governor(level));
        Ok(())
    }

    fn set_gpu_boost(&self, level: BoostLevel) -> Result<()> {
        log::info!("[dry-run] GPU boost -> {} ({})", level, gpu_governor(level));
        Ok(())
    }

    fn set_turbo_enabled(&self, enabled: bool) -> Result<()> {
        log::info!("[dry-run] turbo enabled = {}", enabled);
        Ok(())
    }

    fn cpu_temperature(&self) -> Result<f32> {
        thermal::read_cpu_temperature(&self.thermal.cpu_temp_paths)
    }

    fn battery_temperature(&self) -> Result<f32> {
        thermal::read_battery_temperature(&self.thermal.battery_temp_paths)
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}
