//! NVML GPU queries
//!
//! Direct access to NVIDIA GPU utilization through the NVML library.
//! Absent on devices without an NVIDIA driver; callers treat `None` as
//! "no GPU data".

use nvml_wrapper::Nvml;

/// Holds the NVML library instance and the primary GPU device index.
pub struct NvmlState {
    nvml: Nvml,
    device_index: u32,
    device_name: String,
}

impl NvmlState {
    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

/// Initialize NVML and grab the first GPU device.
/// Returns None if NVML is not available (no NVIDIA driver, no GPU, etc.)
pub fn init_nvml() -> Option<NvmlState> {
    let nvml = match Nvml::init() {
        Ok(n) => n,
        Err(e) => {
            log::debug!("NVML init failed: {}", e);
            return None;
        }
    };

    let device_count = nvml.device_count().ok()?;
    if device_count == 0 {
        log::debug!("NVML: no devices found");
        return None;
    }

    let device = nvml.device_by_index(0).ok()?;
    let device_name = device.name().unwrap_or_else(|_| "NVIDIA GPU".to_string());

    log::info!("NVML initialized: {} (device 0 of {})", device_name, device_count);

    Some(NvmlState {
        nvml,
        device_index: 0,
        device_name,
    })
}

/// GPU engine utilization in percent
pub fn query_gpu_utilization(state: &NvmlState) -> Option<f32> {
    let device = state.nvml.device_by_index(state.device_index).ok()?;
    let utilization = device.utilization_rates().ok()?;
    Some(utilization.gpu as f32)
}
