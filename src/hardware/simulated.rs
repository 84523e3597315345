//! Simulated telemetry
//!
//! Placeholder source producing plausible random readings for devices
//! without usable sensors, and for demos.

use crate::core::{DeviceInfo, Result, TelemetryReading};
use crate::hardware::TelemetrySource;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TOTAL_MEMORY_MB: u64 = 8192;

/// Uniform sampler over typical mobile device ranges
pub struct SimulatedTelemetrySource {
    rng: Mutex<StdRng>,
    cores: u32,
}

impl SimulatedTelemetrySource {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic sequence for reproducible runs
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get() as u32)
            .unwrap_or(1);
        Self {
            rng: Mutex::new(rng),
            cores,
        }
    }
}

impl Default for SimulatedTelemetrySource {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySource for SimulatedTelemetrySource {
    fn sample(&self) -> Result<TelemetryReading> {
        let mut rng = self.rng.lock();

        let memory_percent: f32 = rng.gen_range(40.0..90.0);
        let used_mb = (TOTAL_MEMORY_MB as f32 * memory_percent / 100.0) as u64;

        Ok(TelemetryReading {
            fps: rng.gen_range(50..120),
            cpu_percent: rng.gen_range(10.0..90.0),
            gpu_percent: rng.gen_range(20.0..80.0),
            memory_percent,
            battery_temp_c: rng.gen_range(30.0..45.0),
            cpu_temp_c: rng.gen_range(35.0..55.0),
            available_memory_mb: TOTAL_MEMORY_MB.saturating_sub(used_mb),
            total_memory_mb: TOTAL_MEMORY_MB,
        })
    }

    fn device_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo {
            device_model: "Simulated Device".to_string(),
            os_version: "simulated".to_string(),
            cpu_cores: self.cores,
            max_cpu_freq_hz: 2_400_000_000,
            gpu_model: "Adreno 660".to_string(),
            turbo_supported: true,
        })
    }

    fn name(&self) -> &str {
        "Simulated telemetry"
    }
}
