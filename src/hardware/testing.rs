//! Test doubles for the hardware contracts

use crate::core::{BoostLevel, DeviceInfo, Error, Result, TelemetryReading};
use crate::hardware::{BoostController, MaintenanceHook, TelemetrySource};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Returns the same reading every time and counts calls
pub struct FixedTelemetrySource {
    reading: Mutex<TelemetryReading>,
    calls: AtomicUsize,
    failing: AtomicBool,
    info_failing: AtomicBool,
    /// Wall-clock stall before each reading
    delay: Mutex<Duration>,
}

impl FixedTelemetrySource {
    pub fn new(reading: TelemetryReading) -> Self {
        Self {
            reading: Mutex::new(reading),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            info_failing: AtomicBool::new(false),
            delay: Mutex::new(Duration::ZERO),
        }
    }

    /// fps=60, cpu=20, mem=50, 2000/4000 MB
    pub fn standard() -> Self {
        Self::new(TelemetryReading {
            fps: 60,
            cpu_percent: 20.0,
            gpu_percent: 0.0,
            memory_percent: 50.0,
            battery_temp_c: 0.0,
            cpu_temp_c: 0.0,
            available_memory_mb: 2000,
            total_memory_mb: 4000,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_reading(&self, reading: TelemetryReading) {
        *self.reading.lock() = reading;
    }

    pub fn set_info_failing(&self, failing: bool) {
        self.info_failing.store(failing, Ordering::SeqCst);
    }

    /// Block the calling thread this long on every `sample`
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }
}

impl TelemetrySource for FixedTelemetrySource {
    fn sample(&self) -> Result<TelemetryReading> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::SourceUnavailable("sensor offline".to_string()));
        }
        Ok(*self.reading.lock())
    }

    fn device_info(&self) -> Result<DeviceInfo> {
        if self.info_failing.load(Ordering::SeqCst) {
            return Err(Error::SourceUnavailable("build properties unreadable".to_string()));
        }
        Ok(DeviceInfo {
            device_model: "Test Phone".to_string(),
            os_version: "14".to_string(),
            cpu_cores: 8,
            max_cpu_freq_hz: 2_400_000_000,
            gpu_model: "Test GPU".to_string(),
            turbo_supported: true,
        })
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostCall {
    Turbo(bool),
    Cpu(BoostLevel),
    Gpu(BoostLevel),
}

/// Records every command in order; can be told to refuse GPU commands
#[derive(Default)]
pub struct RecordingBoostController {
    calls: Mutex<Vec<BoostCall>>,
    reject_gpu: AtomicBool,
}

impl RecordingBoostController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<BoostCall> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    pub fn set_reject_gpu(&self, reject: bool) {
        self.reject_gpu.store(reject, Ordering::SeqCst);
    }
}

impl BoostController for RecordingBoostController {
    fn set_cpu_boost(&self, level: BoostLevel) -> Result<()> {
        self.calls.lock().push(BoostCall::Cpu(level));
        Ok(())
    }

    fn set_gpu_boost(&self, level: BoostLevel) -> Result<()> {
        if self.reject_gpu.load(Ordering::SeqCst) {
            return Err(Error::PermissionDenied("gpu governor is read-only".to_string()));
        }
        self.calls.lock().push(BoostCall::Gpu(level));
        Ok(())
    }

    fn set_turbo_enabled(&self, enabled: bool) -> Result<()> {
        self.calls.lock().push(BoostCall::Turbo(enabled));
        Ok(())
    }

    fn cpu_temperature(&self) -> Result<f32> {
        Ok(48.5)
    }

    fn battery_temperature(&self) -> Result<f32> {
        Ok(33.0)
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Counts reclaim requests
#[derive(Default)]
pub struct CountingHook {
    count: AtomicUsize,
}

impl CountingHook {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl MaintenanceHook for CountingHook {
    fn reclaim_memory(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}
