//! Backend selection - CUDA when available, NdArray (CPU) otherwise
//!
//! The CPU backend is always compiled in. Building with the `cuda` feature
//! adds the CUDA backend, which is used when a GPU is detected at startup.
//! Both are plain inference backends: no autodiff, so no gradient tracking.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// CPU backend, always available
pub type CpuBackend = burn_ndarray::NdArray<f32>;

/// GPU backend
#[cfg(feature = "cuda")]
pub type GpuBackend = burn_cuda::Cuda;

/// Device the classifier runs on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Device {
    /// General-purpose computation
    Cpu,
    /// GPU with the given ordinal
    Gpu(usize),
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "CPU"),
            Device::Gpu(id) => write!(f, "GPU:{}", id),
        }
    }
}

/// Pick the device for inference.
///
/// A detected GPU is only used when the CUDA backend is compiled in; every
/// other case falls back to the CPU silently (logged, never an error).
pub fn select_device() -> Device {
    let gpu_present = is_gpu_available();

    if gpu_present && cfg!(feature = "cuda") {
        info!("GPU detected - running inference on CUDA");
        return Device::Gpu(0);
    }

    if gpu_present {
        debug!("GPU detected but CUDA support is not compiled in - using CPU");
    } else {
        debug!("No GPU detected - using CPU");
    }
    Device::Cpu
}

/// Human-readable backend name for a device
pub fn backend_name(device: Device) -> &'static str {
    match device {
        Device::Cpu => "NdArray (CPU)",
        Device::Gpu(_) => "CUDA (GPU)",
    }
}

/// Check for an NVIDIA GPU usable by the CUDA backend
pub fn is_gpu_available() -> bool {
    if std::env::var("CUDA_VISIBLE_DEVICES").is_ok_and(|v| v.trim() == "-1" || v.trim().is_empty())
    {
        return false;
    }

    #[cfg(target_os = "linux")]
    {
        std::path::Path::new("/proc/driver/nvidia/version").exists()
            || std::path::Path::new("/dev/nvidia0").exists()
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("nvidia-smi.exe")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_display() {
        assert_eq!(Device::Cpu.to_string(), "CPU");
        assert_eq!(Device::Gpu(1).to_string(), "GPU:1");
    }

    #[test]
    fn test_backend_name() {
        assert_eq!(backend_name(Device::Cpu), "NdArray (CPU)");
        assert_eq!(backend_name(Device::Gpu(0)), "CUDA (GPU)");
    }

    #[test]
    fn test_hidden_gpu_is_not_available() {
        std::env::set_var("CUDA_VISIBLE_DEVICES", "-1");
        let available = is_gpu_available();
        std::env::remove_var("CUDA_VISIBLE_DEVICES");
        assert!(!available);
    }

    #[cfg(not(feature = "cuda"))]
    #[test]
    fn test_select_device_without_cuda_is_cpu() {
        assert_eq!(select_device(), Device::Cpu);
    }
}
