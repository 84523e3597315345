//! Floating overlay refresh loop
//!
//! A display-side sibling of the performance monitor: it polls the same
//! telemetry source on its own timer and pushes four compact fields to an
//! overlay surface. The loop keeps running while the panel is collapsed;
//! collapsing only stops fields from being rendered.

use crate::core::{OverlayConfig, TelemetryReading};
use crate::hardware::{MaintenanceHook, TelemetrySource};
use crate::periodic::PeriodicTask;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;

/// Values shown by the overlay, updated together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OverlayFields {
    pub fps: u32,
    pub cpu_percent: u32,
    pub memory_percent: u32,
    pub temperature_c: i32,
}

impl OverlayFields {
    pub fn from_reading(reading: &TelemetryReading) -> Self {
        Self {
            fps: reading.fps,
            cpu_percent: reading.cpu_percent.clamp(0.0, 100.0) as u32,
            memory_percent: reading.memory_percent.clamp(0.0, 100.0) as u32,
            temperature_c: reading.cpu_temp_c as i32,
        }
    }

    /// Text for the four labels, in display order
    pub fn labels(&self) -> [String; 4] {
        [
            format!("FPS: {}", self.fps),
            format!("CPU: {}%", self.cpu_percent),
            format!("RAM: {}%", self.memory_percent),
            format!("TEMP: {}°C", self.temperature_c),
        ]
    }
}

impl fmt::Display for OverlayFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.labels().join(" | "))
    }
}

/// Display capability handed in by the host window layer
pub trait OverlaySurface: Send + Sync {
    /// Show new field values
    fn render(&self, fields: &OverlayFields);

    /// Show or hide the detail panel
    fn set_details_visible(&self, visible: bool);

    /// Remove the overlay from the screen
    fn release(&self);
}

/// Surface that writes each refresh to the log
#[derive(Debug, Default)]
pub struct LogSurface;

impl OverlaySurface for LogSurface {
    fn render(&self, fields: &OverlayFields) {
        log::info!("[overlay] {}", fields);
    }

    fn set_details_visible(&self, visible: bool) {
        log::debug!("[overlay] details {}", if visible { "shown" } else { "hidden" });
    }

    fn release(&self) {
        log::debug!("[overlay] released");
    }
}

/// State shared with the refresh tick
struct Display {
    source: Arc<dyn TelemetrySource>,
    surface: Arc<dyn OverlaySurface>,
    expanded: AtomicBool,
    /// Set once the surface is gone; a tick still in flight must not draw
    released: AtomicBool,
    fields_tx: watch::Sender<OverlayFields>,
}

impl Display {
    fn refresh(&self) {
        let fields = match self.source.sample() {
            Ok(reading) => OverlayFields::from_reading(&reading),
            Err(e) => {
                log::warn!("Overlay refresh skipped: {}", e);
                return;
            }
        };

        self.fields_tx.send_replace(fields);
        if self.expanded.load(Ordering::SeqCst) && !self.released.load(Ordering::SeqCst) {
            self.surface.render(&fields);
        }
    }
}

/// Periodic overlay refresher with one-shot memory maintenance actions
pub struct OverlayRefreshLoop {
    runtime: Handle,
    period: Duration,
    display: Arc<Display>,
    hook: Arc<dyn MaintenanceHook>,
    slot: Mutex<LoopSlot>,
}

/// Refresh loop and teardown flag, always changed together under one lock
#[derive(Default)]
struct LoopSlot {
    task: Option<PeriodicTask>,
    released: bool,
}

impl OverlayRefreshLoop {
    /// Construct without starting the refresh loop
    pub fn new(
        runtime: Handle,
        config: &OverlayConfig,
        source: Arc<dyn TelemetrySource>,
        surface: Arc<dyn OverlaySurface>,
        hook: Arc<dyn MaintenanceHook>,
    ) -> Self {
        let (fields_tx, _) = watch::channel(OverlayFields::default());

        Self {
            runtime,
            period: config.refresh_interval(),
            display: Arc::new(Display {
                source,
                surface,
                expanded: AtomicBool::new(config.start_expanded),
                released: AtomicBool::new(false),
                fields_tx,
            }),
            hook,
            slot: Mutex::new(LoopSlot::default()),
        }
    }

    /// Start refreshing, replacing any earlier refresh loop
    pub fn start_display(&self) {
        let mut slot = self.slot.lock();
        if slot.released {
            log::warn!("Overlay already torn down, not starting refresh");
            return;
        }
        if let Some(previous) = slot.task.take() {
            previous.cancel();
        }

        let display = self.display.clone();
        slot.task = Some(PeriodicTask::spawn(
            &self.runtime,
            "overlay-refresh",
            self.period,
            move || display.refresh(),
        ));
        log::info!("Overlay refresh started");
    }

    pub fn is_refreshing(&self) -> bool {
        self.slot.lock().task.as_ref().map_or(false, PeriodicTask::is_active)
    }

    pub fn is_expanded(&self) -> bool {
        self.display.expanded.load(Ordering::SeqCst)
    }

    pub fn toggle_expanded(&self) {
        if self.is_expanded() {
            self.collapse();
        } else {
            self.expand();
        }
    }

    pub fn collapse(&self) {
        self.display.expanded.store(false, Ordering::SeqCst);
        self.display.surface.set_details_visible(false);
    }

    /// Show the panel and immediately render the latest fields
    pub fn expand(&self) {
        self.display.expanded.store(true, Ordering::SeqCst);
        self.display.surface.set_details_visible(true);
        let fields = *self.display.fields_tx.borrow();
        self.display.surface.render(&fields);
    }

    /// Latest fields, whether or not they were rendered
    pub fn fields(&self) -> OverlayFields {
        *self.display.fields_tx.borrow()
    }

    pub fn subscribe_fields(&self) -> watch::Receiver<OverlayFields> {
        self.display.fields_tx.subscribe()
    }

    /// Fire-and-forget: reclaim unused memory twice off the refresh context
    pub fn quick_boost(&self) {
        let hook = self.hook.clone();
        self.runtime.spawn_blocking(move || {
            hook.reclaim_memory();
            hook.reclaim_memory();
        });
        log::debug!("Quick boost requested");
    }

    /// Fire-and-forget: reclaim unused memory once
    pub fn memory_clean(&self) {
        let hook = self.hook.clone();
        self.runtime.spawn_blocking(move || hook.reclaim_memory());
        log::debug!("Memory clean requested");
    }

    /// Stop refreshing and release the surface. Safe to call repeatedly,
    /// and before `start_display` was ever called.
    pub fn teardown(&self) {
        let mut slot = self.slot.lock();
        if let Some(task) = slot.task.take() {
            task.cancel();
        }
        if slot.released {
            return;
        }
        slot.released = true;
        self.display.released.store(true, Ordering::SeqCst);
        self.display.surface.release();
        log::info!("Overlay torn down");
    }
}

impl Drop for OverlayRefreshLoop {
    fn drop(&mut self) {
        self.teardown();
    }
}
