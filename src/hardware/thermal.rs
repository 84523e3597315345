//! Thermal sensor reads via sysfs
//!
//! Sensors are tried in configured order; the first readable one wins.

use crate::core::{Error, Result};
use std::fs;
use std::path::PathBuf;

/// thermal_zone files report millidegrees
const CPU_TEMP_DIVISOR: f32 = 1000.0;
/// power_supply temp files report decidegrees
const BATTERY_TEMP_DIVISOR: f32 = 10.0;

/// CPU temperature in °C from the first readable thermal zone
pub fn read_cpu_temperature(paths: &[PathBuf]) -> Result<f32> {
    read_scaled(paths, CPU_TEMP_DIVISOR)
}

/// Battery temperature in °C from the first readable power_supply entry
pub fn read_battery_temperature(paths: &[PathBuf]) -> Result<f32> {
    read_scaled(paths, BATTERY_TEMP_DIVISOR)
}

fn read_scaled(paths: &[PathBuf], divisor: f32) -> Result<f32> {
    for path in paths {
        let raw = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(_) => continue,
        };
        match raw.trim().parse::<f32>() {
            Ok(value) => return Ok(value / divisor),
            Err(_) => log::debug!("Unparseable thermal value in {:?}: {:?}", path, raw.trim()),
        }
    }

    Err(Error::SourceUnavailable(format!(
        "no readable temperature sensor among {} path(s)",
        paths.len()
    )))
}
