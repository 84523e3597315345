//! Hardware collaborators
//!
//! Contracts consumed by the monitoring core and their implementations:
//! - Telemetry: OS-backed readings (sysinfo + NVML) or a simulated placeholder
//! - Boost control: sysfs governor switching, or a dry-run logger
//! - Maintenance: returning freed heap memory to the OS

mod boost;
mod maintenance;
mod nvml_gpu;
mod simulated;
mod system;
mod thermal;

#[cfg(test)]
pub(crate) mod testing;

pub use boost::{DryRunBoostController, SysfsBoostController};
pub use maintenance::AllocatorTrim;
pub use simulated::SimulatedTelemetrySource;
pub use system::SystemTelemetrySource;
pub use thermal::{read_battery_temperature, read_cpu_temperature};

use crate::core::{BoostBackend, BoostLevel, Config, DeviceInfo, Error, Result, SourceKind, TelemetryReading};
use std::sync::Arc;

/// Provider of instantaneous system readings
pub trait TelemetrySource: Send + Sync {
    /// Take one reading
    fn sample(&self) -> Result<TelemetryReading>;

    /// Describe the device
    fn device_info(&self) -> Result<DeviceInfo>;

    /// Name of this source
    fn name(&self) -> &str;
}

/// Native performance control surface
pub trait BoostController: Send + Sync {
    fn set_cpu_boost(&self, level: BoostLevel) -> Result<()>;

    fn set_gpu_boost(&self, level: BoostLevel) -> Result<()>;

    /// Coarse governor switch issued ahead of the per-unit levels
    fn set_turbo_enabled(&self, enabled: bool) -> Result<()>;

    /// CPU temperature in °C
    fn cpu_temperature(&self) -> Result<f32>;

    /// Battery temperature in °C
    fn battery_temperature(&self) -> Result<f32>;

    /// Name of this controller
    fn name(&self) -> &str;
}

/// One-shot maintenance action provided by the host runtime
pub trait MaintenanceHook: Send + Sync {
    /// Reclaim unused memory. Completion is never reported.
    fn reclaim_memory(&self);
}

/// Pick the telemetry source named by the config.
///
/// Every call builds a new instance. Consumers polling on independent
/// timers each need their own, since CPU usage is measured against the
/// instance's previous refresh.
///
/// `auto` and `system` both try the OS-backed source; only `simulated`
/// skips detection. Returns an error when no real source works so the
/// caller can decide whether to fall back.
pub fn detect_telemetry_source(config: &Config) -> Result<Arc<dyn TelemetrySource>> {
    match config.monitor.source {
        SourceKind::Simulated => {
            log::info!("Using simulated telemetry");
            Ok(Arc::new(SimulatedTelemetrySource::new()))
        }
        SourceKind::Auto | SourceKind::System => {
            let turbo_supported = config.boost.cpu_governor_path.exists();
            let source = SystemTelemetrySource::new(config.thermal.clone(), turbo_supported)?;
            log::info!("Using {} for telemetry", source.name());
            Ok(Arc::new(source))
        }
    }
}

/// Telemetry source used when nothing real is available
pub fn simulated_fallback() -> Arc<dyn TelemetrySource> {
    Arc::new(SimulatedTelemetrySource::new())
}

/// Pick the boost controller named by the config.
pub fn detect_boost_controller(config: &Config) -> Result<Arc<dyn BoostController>> {
    match config.boost.backend {
        BoostBackend::DryRun => Ok(dry_run_fallback(config)),
        BoostBackend::Sysfs => {
            Ok(Arc::new(SysfsBoostController::new(&config.boost, config.thermal.clone())))
        }
        BoostBackend::Auto => {
            if config.boost.cpu_governor_path.exists() {
                log::info!(
                    "Using sysfs governors at {:?} for boost control",
                    config.boost.cpu_governor_path
                );
                Ok(Arc::new(SysfsBoostController::new(&config.boost, config.thermal.clone())))
            } else {
                Err(Error::HardwareNotSupported(
                    "No cpufreq governor found for boost control".to_string(),
                ))
            }
        }
    }
}

/// Boost controller used when no governor files exist
pub fn dry_run_fallback(config: &Config) -> Arc<dyn BoostController> {
    Arc::new(DryRunBoostController::new(config.thermal.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_source_is_selected_without_probing() {
        let mut config = Config::default();
        config.monitor.source = SourceKind::Simulated;

        let source = detect_telemetry_source(&config).unwrap();
        assert_eq!(source.name(), "Simulated telemetry");
    }

    #[test]
    fn test_each_detection_builds_its_own_source() {
        let mut config = Config::default();
        config.monitor.source = SourceKind::Simulated;

        let monitor_source = detect_telemetry_source(&config).unwrap();
        let overlay_source = detect_telemetry_source(&config).unwrap();
        assert!(!Arc::ptr_eq(&monitor_source, &overlay_source));
    }

    #[test]
    fn test_auto_backend_requires_governor_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.boost.cpu_governor_path = dir.path().join("missing_governor");

        let err = detect_boost_controller(&config).err().unwrap();
        assert!(matches!(err, Error::HardwareNotSupported(_)));

        std::fs::write(&config.boost.cpu_governor_path, "interactive\n").unwrap();
        let controller = detect_boost_controller(&config).unwrap();
        assert_eq!(controller.name(), "sysfs governors");
    }

    #[test]
    fn test_dry_run_backend() {
        let mut config = Config::default();
        config.boost.backend = BoostBackend::DryRun;

        let controller = detect_boost_controller(&config).unwrap();
        assert_eq!(controller.name(), "dry-run");
        assert!(controller.set_cpu_boost(BoostLevel::Max).is_ok());
    }
}
