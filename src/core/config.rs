//! Configuration management

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub boost: BoostConfig,
    #[serde(default)]
    pub thermal: ThermalConfig,
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

        let app_config_dir = config_dir.join("perfboost");

        if !app_config_dir.exists() {
            fs::create_dir_all(&app_config_dir)?;
        }

        Ok(app_config_dir.join("config.toml"))
    }

    /// Load configuration from disk, writing defaults on first run
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.monitor.sample_interval_ms == 0 {
            return Err(Error::Config("monitor.sample_interval_ms must be positive".to_string()));
        }
        if self.overlay.refresh_interval_ms == 0 {
            return Err(Error::Config("overlay.refresh_interval_ms must be positive".to_string()));
        }
        Ok(())
    }
}

/// General runner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// How the runner prints snapshots
    #[serde(default)]
    pub output: OutputFormat,
    /// Enable turbo mode as soon as monitoring starts
    #[serde(default)]
    pub turbo_on_start: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: OutputFormat::Text,
            turbo_on_start: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Performance monitor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Sampling period in milliseconds
    #[serde(default = "default_interval")]
    pub sample_interval_ms: u64,
    /// Which telemetry source to use
    #[serde(default)]
    pub source: SourceKind,
}

fn default_interval() -> u64 { 1000 }
fn default_true() -> bool { true }

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: default_interval(),
            source: SourceKind::Auto,
        }
    }
}

impl MonitorConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// OS-backed source, falling back to simulation
    #[default]
    Auto,
    System,
    Simulated,
}

/// Floating overlay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Refresh period in milliseconds
    #[serde(default = "default_interval")]
    pub refresh_interval_ms: u64,
    /// Whether the detail panel starts visible
    #[serde(default = "default_true")]
    pub start_expanded: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_interval_ms: default_interval(),
            start_expanded: true,
        }
    }
}

impl OverlayConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

/// Boost control settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostConfig {
    #[serde(default)]
    pub backend: BoostBackend,
    /// cpufreq governor file for the boosted core
    #[serde(default = "default_cpu_governor_path")]
    pub cpu_governor_path: PathBuf,
    /// devfreq governor file for the GPU
    #[serde(default = "default_gpu_governor_path")]
    pub gpu_governor_path: PathBuf,
}

fn default_cpu_governor_path() -> PathBuf {
    PathBuf::from("/sys/devices/system/cpu/cpu0/cpufreq/scaling_governor")
}
fn default_gpu_governor_path() -> PathBuf {
    PathBuf::from("/sys/class/kgsl/kgsl-3d0/devfreq/governor")
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            backend: BoostBackend::Auto,
            cpu_governor_path: default_cpu_governor_path(),
            gpu_governor_path: default_gpu_governor_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoostBackend {
    /// sysfs governors when present, dry-run otherwise
    #[default]
    Auto,
    Sysfs,
    DryRun,
}

/// Thermal sensor locations, tried in order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalConfig {
    /// Millidegree files
    #[serde(default = "default_cpu_temp_paths")]
    pub cpu_temp_paths: Vec<PathBuf>,
    /// Decidegree files
    #[serde(default = "default_battery_temp_paths")]
    pub battery_temp_paths: Vec<PathBuf>,
}

fn default_cpu_temp_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/sys/class/thermal/thermal_zone0/temp"),
        PathBuf::from("/sys/class/thermal/thermal_zone1/temp"),
    ]
}
fn default_battery_temp_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/sys/class/power_supply/battery/temp"),
        PathBuf::from("/sys/class/power_supply/batt_temp"),
    ]
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            cpu_temp_paths: default_cpu_temp_paths(),
            battery_temp_paths: default_battery_temp_paths(),
        }
    }
}
