//! OS-backed telemetry
//!
//! CPU load, memory and core metadata come from sysinfo, GPU utilization
//! from NVML when an NVIDIA device exists, and temperatures from the
//! configured sysfs thermal paths.

use crate::core::{DeviceInfo, Error, Result, TelemetryReading, ThermalConfig};
use crate::hardware::nvml_gpu::{self, NvmlState};
use crate::hardware::{thermal, TelemetrySource};
use parking_lot::Mutex;
use std::fs;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

const MAX_FREQ_PATH: &str = "/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq";
const BYTES_PER_MB: u64 = 1024 * 1024;

pub struct SystemTelemetrySource {
    sys: Mutex<System>,
    nvml: Option<NvmlState>,
    thermal: ThermalConfig,
    turbo_supported: bool,
}

impl SystemTelemetrySource {
    pub fn new(thermal: ThermalConfig, turbo_supported: bool) -> Result<Self> {
        let mut sys = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::new().with_cpu_usage().with_frequency())
                .with_memory(MemoryRefreshKind::everything()),
        );
        sys.refresh_cpu_all();
        sys.refresh_memory();

        if sys.cpus().is_empty() {
            return Err(Error::HardwareNotSupported("No CPUs reported by the OS".to_string()));
        }
        if sys.total_memory() == 0 {
            return Err(Error::HardwareNotSupported("Total memory reported as zero".to_string()));
        }

        Ok(Self {
            sys: Mutex::new(sys),
            nvml: nvml_gpu::init_nvml(),
            thermal,
            turbo_supported,
        })
    }

    fn max_cpu_freq_hz(sys: &System) -> u64 {
        // cpuinfo_max_freq is in kHz
        if let Some(khz) = fs::read_to_string(MAX_FREQ_PATH)
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
        {
            return khz * 1000;
        }

        sys.cpus()
            .iter()
            .map(|cpu| cpu.frequency())
            .max()
            .unwrap_or(0)
            * 1_000_000
    }
}

impl TelemetrySource for SystemTelemetrySource {
    fn sample(&self) -> Result<TelemetryReading> {
        let (cpu_percent, available, total, used) = {
            let mut sys = self.sys.lock();
            sys.refresh_cpu_usage();
            sys.refresh_memory();
            (
                sys.global_cpu_usage(),
                sys.available_memory(),
                sys.total_memory(),
                sys.used_memory(),
            )
        };

        if total == 0 {
            return Err(Error::SourceUnavailable("memory totals unavailable".to_string()));
        }

        let gpu_percent = self
            .nvml
            .as_ref()
            .and_then(nvml_gpu::query_gpu_utilization)
            .unwrap_or(0.0);

        // Temperatures are best effort; desktops usually have no battery sensor
        let cpu_temp_c = thermal::read_cpu_temperature(&self.thermal.cpu_temp_paths).unwrap_or(0.0);
        let battery_temp_c =
            thermal::read_battery_temperature(&self.thermal.battery_temp_paths).unwrap_or(0.0);

        Ok(TelemetryReading {
            // No portable frame counter exists at the OS level
            fps: 0,
            cpu_percent,
            gpu_percent,
            memory_percent: (used as f64 / total as f64 * 100.0) as f32,
            battery_temp_c,
            cpu_temp_c,
            available_memory_mb: available.min(total) / BYTES_PER_MB,
            total_memory_mb: total / BYTES_PER_MB,
        })
    }

    fn device_info(&self) -> Result<DeviceInfo> {
        let sys = self.sys.lock();

        Ok(DeviceInfo {
            device_model: System::host_name().unwrap_or_else(|| "unknown".to_string()),
            os_version: System::long_os_version().unwrap_or_else(|| "unknown".to_string()),
            cpu_cores: sys.cpus().len().max(1) as u32,
            max_cpu_freq_hz: Self::max_cpu_freq_hz(&sys),
            gpu_model: self
                .nvml
                .as_ref()
                .map(|n| n.device_name().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            turbo_supported: self.turbo_supported,
        })
    }

    fn name(&self) -> &str {
        "System telemetry (sysinfo)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_is_consistent() {
        let source = match SystemTelemetrySource::new(ThermalConfig::default(), false) {
            Ok(s) => s,
            Err(_) => return, // sandbox without /proc
        };

        let reading = source.sample().unwrap();
        assert!(reading.total_memory_mb > 0);
        assert!(reading.available_memory_mb <= reading.total_memory_mb);
        assert!(reading.memory_percent >= 0.0);

        let info = source.device_info().unwrap();
        assert!(info.cpu_cores >= 1);
        assert!(!info.turbo_supported);
    }
}
