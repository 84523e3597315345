//! Performance monitor
//!
//! Owns the telemetry sampling loop and the turbo boost state. The latest
//! snapshot, device info, lifecycle and boost state are published through
//! watch channels: readers always see a whole value, never a partial one,
//! and only the most recent value is retained.

use crate::core::{
    BoostState, DeviceInfo, MonitorConfig, MonitoringLifecycleState, PerformanceSnapshot, Result,
};
use crate::hardware::{BoostController, TelemetrySource};
use crate::periodic::PeriodicTask;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;

/// One tick's worth of work: read, assemble, publish
///
/// Snapshot and device info live in separate channels and are replaced one
/// after the other. A reader between the two sends sees the new snapshot
/// next to the previous device info; each value on its own is always whole.
struct Sampler {
    source: Arc<dyn TelemetrySource>,
    snapshot_tx: watch::Sender<PerformanceSnapshot>,
    info_tx: watch::Sender<DeviceInfo>,
}

impl Sampler {
    fn tick(&self) -> Result<()> {
        let reading = self.source.sample()?;
        let snapshot =
            PerformanceSnapshot::from_reading(&reading, chrono::Utc::now().timestamp_millis())?;
        self.snapshot_tx.send_replace(snapshot);

        // Device info is static in practice; a failed read keeps the last one
        match self.source.device_info() {
            Ok(info) => {
                self.info_tx.send_replace(info);
            }
            Err(e) => log::warn!("Device info unavailable, keeping previous: {}", e),
        }

        log::debug!(
            "Tick: {} fps, cpu {:.1}%, mem {:.1}%",
            snapshot.fps,
            snapshot.cpu_usage,
            snapshot.memory_usage
        );
        Ok(())
    }
}

/// Telemetry sampler with start/stop/pause/resume and turbo control
pub struct PerformanceMonitor {
    runtime: Handle,
    period: Duration,
    sampler: Arc<Sampler>,
    controller: Arc<dyn BoostController>,
    /// At most one sampling loop lives here at a time
    task: Mutex<Option<PeriodicTask>>,
    lifecycle_tx: watch::Sender<MonitoringLifecycleState>,
    boost_tx: watch::Sender<BoostState>,
    /// Serializes turbo command sequences
    boost_lock: Mutex<()>,
}

impl PerformanceMonitor {
    /// Create a stopped monitor. Sampling loops are spawned on `runtime`.
    pub fn new(
        runtime: Handle,
        config: &MonitorConfig,
        source: Arc<dyn TelemetrySource>,
        controller: Arc<dyn BoostController>,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(PerformanceSnapshot::default());
        let (info_tx, _) = watch::channel(DeviceInfo::default());
        let (lifecycle_tx, _) = watch::channel(MonitoringLifecycleState::Stopped);
        let (boost_tx, _) = watch::channel(BoostState::off());

        Self {
            runtime,
            period: config.sample_interval(),
            sampler: Arc::new(Sampler {
                source,
                snapshot_tx,
                info_tx,
            }),
            controller,
            task: Mutex::new(None),
            lifecycle_tx,
            boost_tx,
            boost_lock: Mutex::new(()),
        }
    }

    /// Begin sampling, superseding any loop already running
    pub fn start(&self) {
        let mut slot = self.task.lock();
        self.start_locked(&mut slot);
    }

    fn start_locked(&self, slot: &mut Option<PeriodicTask>) {
        if let Some(previous) = slot.take() {
            previous.cancel();
        }

        let sampler = self.sampler.clone();
        *slot = Some(PeriodicTask::spawn(
            &self.runtime,
            "performance-monitor",
            self.period,
            move || {
                if let Err(e) = sampler.tick() {
                    log::warn!("Skipping telemetry tick: {}", e);
                }
            },
        ));

        self.lifecycle_tx.send_replace(MonitoringLifecycleState::Running);
        log::info!(
            "Performance monitoring started ({}ms period, source: {})",
            self.period.as_millis(),
            self.sampler.source.name()
        );
    }

    /// Cancel sampling and go to `Stopped`
    pub fn stop(&self) {
        let mut slot = self.task.lock();
        let was_running = slot.take().map(|task| task.cancel()).is_some();

        let previous = self.lifecycle_tx.send_replace(MonitoringLifecycleState::Stopped);
        if was_running || previous != MonitoringLifecycleState::Stopped {
            log::info!("Performance monitoring stopped");
        }
    }

    /// Cancel sampling but keep the last snapshot; only meaningful while running
    pub fn pause(&self) {
        let mut slot = self.task.lock();
        let state = *self.lifecycle_tx.borrow();
        if state != MonitoringLifecycleState::Running {
            log::debug!("Pause ignored while {}", state);
            return;
        }

        if let Some(task) = slot.take() {
            task.cancel();
        }
        self.lifecycle_tx.send_replace(MonitoringLifecycleState::Paused);
        log::info!("Performance monitoring paused");
    }

    /// Restart sampling unless a loop is already active
    pub fn resume(&self) {
        let mut slot = self.task.lock();
        let active = slot.as_ref().map_or(false, PeriodicTask::is_active);

        if active {
            self.lifecycle_tx.send_replace(MonitoringLifecycleState::Running);
            return;
        }
        self.start_locked(&mut slot);
    }

    /// Forward the turbo toggle to the boost controller.
    ///
    /// Issues the coarse turbo switch, then the CPU level, then the GPU
    /// level. The first failing command aborts the sequence with
    /// `ControlRejected`; commands already applied are not rolled back and
    /// the published boost state keeps its previous value.
    pub fn set_turbo_mode(&self, enable: bool) -> Result<BoostState> {
        let target = BoostState::for_turbo(enable);
        let _serial = self.boost_lock.lock();

        if let Err(e) = self.apply_boost(enable, target) {
            log::error!("Turbo {} failed: {}", if enable { "on" } else { "off" }, e);
            return Err(e);
        }

        self.boost_tx.send_replace(target);
        log::info!(
            "Turbo mode {} (cpu={}, gpu={})",
            if enable { "enabled" } else { "disabled" },
            target.cpu_level(),
            target.gpu_level()
        );
        Ok(target)
    }

    fn apply_boost(&self, enable: bool, target: BoostState) -> Result<()> {
        self.controller
            .set_turbo_enabled(enable)
            .map_err(|e| e.into_rejection("turbo switch"))?;
        self.controller
            .set_cpu_boost(target.cpu_level())
            .map_err(|e| e.into_rejection("CPU boost"))?;
        self.controller
            .set_gpu_boost(target.gpu_level())
            .map_err(|e| e.into_rejection("GPU boost"))?;
        Ok(())
    }

    /// Current (cpu, battery) temperatures from the boost controller
    pub fn thermals(&self) -> Result<(f32, f32)> {
        let cpu = self.controller.cpu_temperature()?;
        let battery = self.controller.battery_temperature()?;
        Ok((cpu, battery))
    }

    pub fn snapshot(&self) -> PerformanceSnapshot {
        *self.sampler.snapshot_tx.borrow()
    }

    /// Latest device info. Published separately from the snapshot, so it
    /// may lag the snapshot by one tick and is not guaranteed to match it.
    pub fn device_info(&self) -> DeviceInfo {
        self.sampler.info_tx.borrow().clone()
    }

    pub fn lifecycle(&self) -> MonitoringLifecycleState {
        *self.lifecycle_tx.borrow()
    }

    pub fn boost_state(&self) -> BoostState {
        *self.boost_tx.borrow()
    }

    /// Whether a sampling loop is currently active
    pub fn is_sampling(&self) -> bool {
        self.task.lock().as_ref().map_or(false, PeriodicTask::is_active)
    }

    pub fn subscribe_snapshot(&self) -> watch::Receiver<PerformanceSnapshot> {
        self.sampler.snapshot_tx.subscribe()
    }

    pub fn subscribe_device_info(&self) -> watch::Receiver<DeviceInfo> {
        self.sampler.info_tx.subscribe()
    }

    pub fn subscribe_lifecycle(&self) -> watch::Receiver<MonitoringLifecycleState> {
        self.lifecycle_tx.subscribe()
    }

    pub fn subscribe_boost(&self) -> watch::Receiver<BoostState> {
        self.boost_tx.subscribe()
    }
}

impl Drop for PerformanceMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.cancel();
        }
    }
}
