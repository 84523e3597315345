//! Common types used across the application

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One raw reading from a telemetry source, before validation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetryReading {
    pub fps: u32,
    pub cpu_percent: f32,
    pub gpu_percent: f32,
    pub memory_percent: f32,
    pub battery_temp_c: f32,
    pub cpu_temp_c: f32,
    pub available_memory_mb: u64,
    pub total_memory_mb: u64,
}

/// A single published sample. Replaced wholesale on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    /// Frames per second
    pub fps: u32,
    /// CPU load in percent [0, 100]
    pub cpu_usage: f32,
    /// GPU load in percent [0, 100]
    pub gpu_usage: f32,
    /// Memory load in percent [0, 100]
    pub memory_usage: f32,
    /// Battery temperature in °C
    pub battery_temperature: f32,
    /// CPU temperature in °C
    pub cpu_temperature: f32,
    /// Available memory in MB
    pub available_memory_mb: u64,
    /// Total memory in MB, never below `available_memory_mb`
    pub total_memory_mb: u64,
    /// Sample time (Unix timestamp, milliseconds). Zero until the first tick.
    pub timestamp_ms: i64,
}

impl PerformanceSnapshot {
    /// Assemble a snapshot from exactly one reading.
    ///
    /// Non-finite values and impossible memory figures reject the whole
    /// reading; load percentages are clamped into [0, 100].
    pub fn from_reading(reading: &TelemetryReading, timestamp_ms: i64) -> Result<Self> {
        let floats = [
            reading.cpu_percent,
            reading.gpu_percent,
            reading.memory_percent,
            reading.battery_temp_c,
            reading.cpu_temp_c,
        ];
        if floats.iter().any(|v| !v.is_finite()) {
            return Err(Error::SourceUnavailable(
                "reading contains non-finite values".to_string(),
            ));
        }
        if reading.available_memory_mb > reading.total_memory_mb {
            return Err(Error::SourceUnavailable(format!(
                "available memory {} MB exceeds total {} MB",
                reading.available_memory_mb, reading.total_memory_mb
            )));
        }

        Ok(Self {
            fps: reading.fps,
            cpu_usage: clamp_percent(reading.cpu_percent),
            gpu_usage: clamp_percent(reading.gpu_percent),
            memory_usage: clamp_percent(reading.memory_percent),
            battery_temperature: reading.battery_temp_c,
            cpu_temperature: reading.cpu_temp_c,
            available_memory_mb: reading.available_memory_mb,
            total_memory_mb: reading.total_memory_mb,
            timestamp_ms,
        })
    }

    /// True until a tick has published something
    pub fn is_empty(&self) -> bool {
        self.timestamp_ms == 0
    }
}

fn clamp_percent(value: f32) -> f32 {
    value.clamp(0.0, 100.0)
}

/// Static device description, re-read every tick
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device_model: String,
    pub os_version: String,
    /// Logical core count (≥ 1 once populated)
    pub cpu_cores: u32,
    /// Maximum CPU frequency in Hz
    pub max_cpu_freq_hz: u64,
    pub gpu_model: String,
    pub turbo_supported: bool,
}

/// Discrete performance step understood by the native control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoostLevel {
    #[default]
    Off,
    Mid,
    Max,
}

impl BoostLevel {
    /// Map a raw control-surface level. Anything outside 0..=2 falls back to `Off`.
    pub fn from_raw(level: i32) -> Self {
        match level {
            1 => BoostLevel::Mid,
            2 => BoostLevel::Max,
            _ => BoostLevel::Off,
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            BoostLevel::Off => 0,
            BoostLevel::Mid => 1,
            BoostLevel::Max => 2,
        }
    }
}

impl fmt::Display for BoostLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_raw())
    }
}

/// Turbo state as last confirmed by the boost controller.
///
/// Only the two turbo points can be constructed: off is (0, 0), on is (2, 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoostState {
    enabled: bool,
    cpu_level: BoostLevel,
    gpu_level: BoostLevel,
}

impl BoostState {
    pub fn off() -> Self {
        Self {
            enabled: false,
            cpu_level: BoostLevel::Off,
            gpu_level: BoostLevel::Off,
        }
    }

    pub fn turbo() -> Self {
        Self {
            enabled: true,
            cpu_level: BoostLevel::Max,
            gpu_level: BoostLevel::Max,
        }
    }

    /// Fixed two-point mapping from the public toggle
    pub fn for_turbo(enable: bool) -> Self {
        if enable {
            Self::turbo()
        } else {
            Self::off()
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn cpu_level(&self) -> BoostLevel {
        self.cpu_level
    }

    pub fn gpu_level(&self) -> BoostLevel {
        self.gpu_level
    }
}

/// Sampling lifecycle of the performance monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MonitoringLifecycleState {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl fmt::Display for MonitoringLifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MonitoringLifecycleState::Stopped => "stopped",
            MonitoringLifecycleState::Running => "running",
            MonitoringLifecycleState::Paused => "paused",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading() -> TelemetryReading {
        TelemetryReading {
            fps: 60,
            cpu_percent: 20.0,
            gpu_percent: 35.0,
            memory_percent: 50.0,
            battery_temp_c: 31.5,
            cpu_temp_c: 42.0,
            available_memory_mb: 2000,
            total_memory_mb: 4000,
        }
    }

    #[test]
    fn test_snapshot_copies_single_reading() {
        let snapshot = PerformanceSnapshot::from_reading(&reading(), 1_700_000_000_000).unwrap();

        assert_eq!(snapshot.fps, 60);
        assert_eq!(snapshot.cpu_usage, 20.0);
        assert_eq!(snapshot.gpu_usage, 35.0);
        assert_eq!(snapshot.memory_usage, 50.0);
        assert_eq!(snapshot.available_memory_mb, 2000);
        assert_eq!(snapshot.total_memory_mb, 4000);
        assert_eq!(snapshot.timestamp_ms, 1_700_000_000_000);
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn test_snapshot_clamps_percentages() {
        let mut raw = reading();
        raw.cpu_percent = 130.0;
        raw.gpu_percent = -4.0;

        let snapshot = PerformanceSnapshot::from_reading(&raw, 1).unwrap();
        assert_eq!(snapshot.cpu_usage, 100.0);
        assert_eq!(snapshot.gpu_usage, 0.0);
    }

    #[test]
    fn test_snapshot_rejects_inconsistent_memory() {
        let mut raw = reading();
        raw.available_memory_mb = 5000;

        let err = PerformanceSnapshot::from_reading(&raw, 1).unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable(_)));
    }

    #[test]
    fn test_snapshot_rejects_nan() {
        let mut raw = reading();
        raw.cpu_temp_c = f32::NAN;

        assert!(PerformanceSnapshot::from_reading(&raw, 1).is_err());
    }

    #[test]
    fn test_boost_state_mapping() {
        let on = BoostState::for_turbo(true);
        assert!(on.enabled());
        assert_eq!(on.cpu_level().as_raw(), 2);
        assert_eq!(on.gpu_level().as_raw(), 2);

        let off = BoostState::for_turbo(false);
        assert!(!off.enabled());
        assert_eq!(off.cpu_level(), BoostLevel::Off);
        assert_eq!(off.gpu_level(), BoostLevel::Off);
        assert_eq!(BoostState::default(), off);
    }

    #[test]
    fn test_boost_level_raw_fallback() {
        assert_eq!(BoostLevel::from_raw(1), BoostLevel::Mid);
        assert_eq!(BoostLevel::from_raw(2), BoostLevel::Max);
        assert_eq!(BoostLevel::from_raw(7), BoostLevel::Off);
        assert_eq!(BoostLevel::from_raw(-1), BoostLevel::Off);
    }
}
