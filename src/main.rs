//! PerfBoost - Main entry point
//!
//! Headless runner that samples device telemetry once per period, prints
//! each snapshot, and optionally holds turbo mode until interrupted.

use perfboost_lib::core::{Config, OutputFormat, PerformanceSnapshot};
use perfboost_lib::hardware::{self, AllocatorTrim, TelemetrySource};
use perfboost_lib::monitor::PerformanceMonitor;
use perfboost_lib::overlay::{LogSurface, OverlayRefreshLoop};
use std::sync::Arc;
use tokio::runtime::Handle;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting PerfBoost v{}", env!("CARGO_PKG_VERSION"));

    // Load or create configuration
    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });

    let source = telemetry_source(&config, "monitor");

    let controller = hardware::detect_boost_controller(&config).unwrap_or_else(|e| {
        log::warn!("No boost control available, commands will only be logged: {}", e);
        hardware::dry_run_fallback(&config)
    });

    let monitor = PerformanceMonitor::new(Handle::current(), &config.monitor, source, controller);

    let overlay = if config.overlay.enabled {
        let overlay = OverlayRefreshLoop::new(
            Handle::current(),
            &config.overlay,
            // Own source: sysinfo CPU usage is a delta since that instance's last refresh
            telemetry_source(&config, "overlay"),
            Arc::new(LogSurface),
            Arc::new(AllocatorTrim::new()),
        );
        overlay.start_display();
        Some(overlay)
    } else {
        None
    };

    monitor.start();

    if config.general.turbo_on_start {
        if let Err(e) = monitor.set_turbo_mode(true) {
            log::error!("Could not enable turbo mode: {}", e);
        }
    }

    let mut snapshots = monitor.subscribe_snapshot();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                log::info!("Interrupted, shutting down");
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = *snapshots.borrow_and_update();
                print_snapshot(&snapshot, config.general.output)?;
            }
        }
    }

    // Leave the governors as we found them
    if monitor.boost_state().enabled() {
        if let Err(e) = monitor.set_turbo_mode(false) {
            log::error!("Could not disable turbo mode: {}", e);
        }
    }
    monitor.stop();
    if let Some(overlay) = overlay {
        overlay.teardown();
    }

    Ok(())
}

/// Detect a fresh telemetry source, falling back to simulation
fn telemetry_source(config: &Config, user: &str) -> Arc<dyn TelemetrySource> {
    hardware::detect_telemetry_source(config).unwrap_or_else(|e| {
        log::warn!("Failed to initialize {} telemetry source: {}", user, e);
        hardware::simulated_fallback()
    })
}

fn print_snapshot(snapshot: &PerformanceSnapshot, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(snapshot)?),
        OutputFormat::Text => {
            let time = chrono::DateTime::from_timestamp_millis(snapshot.timestamp_ms)
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "--:--:--".to_string());
            println!(
                "{}  {:>3} fps | CPU {:>5.1}% | GPU {:>5.1}% | RAM {:>5.1}% ({}/{} MB free) | CPU {:.1}°C | BAT {:.1}°C",
                time,
                snapshot.fps,
                snapshot.cpu_usage,
                snapshot.gpu_usage,
                snapshot.memory_usage,
                snapshot.available_memory_mb,
                snapshot.total_memory_mb,
                snapshot.cpu_temperature,
                snapshot.battery_temperature,
            );
        }
    }
    Ok(())
}
