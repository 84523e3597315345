//! PerfBoost - Demo CLI
//!
//! Scripted walkthrough of the monitoring core on simulated telemetry:
//! start, pause, resume, turbo toggling, the overlay's maintenance
//! actions, and shutdown.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

// Import from our library
use perfboost_lib::core::{Config, PerformanceSnapshot};
use perfboost_lib::hardware::{AllocatorTrim, DryRunBoostController, SimulatedTelemetrySource};
use perfboost_lib::monitor::PerformanceMonitor;
use perfboost_lib::overlay::{LogSurface, OverlayRefreshLoop};

fn print_row(label: &str, snapshot: &PerformanceSnapshot) {
    println!(
        "  {:<10} | {:>3} fps | CPU {:>5.1}% | GPU {:>5.1}% | RAM {:>5.1}%",
        label, snapshot.fps, snapshot.cpu_usage, snapshot.gpu_usage, snapshot.memory_usage
    );
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("==============================================");
    println!("   PerfBoost - Demo CLI");
    println!("==============================================\n");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_time()
        .thread_name("perfboost-demo")
        .build()?;

    let config = Config::default();
    let source = Arc::new(SimulatedTelemetrySource::with_seed(2024));
    let controller = Arc::new(DryRunBoostController::new(config.thermal.clone()));

    // 1. Start monitoring
    println!("[1/5] Starting performance monitor...");
    let monitor = PerformanceMonitor::new(
        runtime.handle().clone(),
        &config.monitor,
        source.clone(),
        controller,
    );
    monitor.start();
    for i in 0..3 {
        thread::sleep(Duration::from_millis(1000));
        print_row(&format!("tick {}", i + 1), &monitor.snapshot());
    }
    let info = monitor.device_info();
    println!(
        "      Device: {} ({} cores, {} MHz max, GPU {})\n",
        info.device_model,
        info.cpu_cores,
        info.max_cpu_freq_hz / 1_000_000,
        info.gpu_model
    );

    // 2. Pause
    println!("[2/5] Pausing for 2 seconds...");
    monitor.pause();
    let frozen = monitor.snapshot();
    thread::sleep(Duration::from_secs(2));
    print_row("paused", &monitor.snapshot());
    println!("      Snapshot retained: {}\n", frozen == monitor.snapshot());

    // 3. Resume
    println!("[3/5] Resuming...");
    monitor.resume();
    thread::sleep(Duration::from_millis(1200));
    print_row("resumed", &monitor.snapshot());
    println!("      State: {}\n", monitor.lifecycle());

    // 4. Turbo
    println!("[4/5] Toggling turbo mode...");
    for enable in [true, false] {
        match monitor.set_turbo_mode(enable) {
            Ok(state) => println!(
                "      turbo={} -> cpu level {}, gpu level {}",
                state.enabled(),
                state.cpu_level(),
                state.gpu_level()
            ),
            Err(e) => println!("      turbo={} failed: {}", enable, e),
        }
    }
    println!();

    // 5. Overlay maintenance actions
    println!("[5/5] Overlay quick boost and memory clean...");
    let overlay = OverlayRefreshLoop::new(
        runtime.handle().clone(),
        &config.overlay,
        source,
        Arc::new(LogSurface),
        Arc::new(AllocatorTrim::new()),
    );
    overlay.start_display();
    overlay.quick_boost();
    overlay.memory_clean();
    thread::sleep(Duration::from_millis(1100));
    println!("      Overlay: {}", overlay.fields());
    overlay.teardown();

    monitor.stop();
    println!("\n      Monitor {}", monitor.lifecycle());

    println!("\n==============================================");
    println!("   Demo complete");
    println!("==============================================\n");

    Ok(())
}
