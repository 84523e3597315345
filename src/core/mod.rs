//! Core module - Configuration, error taxonomy, and shared value types

mod config;
mod error;
mod types;

pub use config::{BoostBackend, BoostConfig, Config, GeneralConfig, MonitorConfig, OutputFormat, OverlayConfig, SourceKind, ThermalConfig};
pub use error::{Error, Result};
pub use types::{BoostLevel, BoostState, DeviceInfo, MonitoringLifecycleState, PerformanceSnapshot, TelemetryReading};
