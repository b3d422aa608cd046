//! Compute backend probing.
//!
//! The probe runs once at service construction; everything downstream
//! receives the chosen [`Backend`] and never re-probes.

use avatar_domain::Backend;
use candle_core::Device;

/// Pick the fastest backend available on this host.
///
/// Probes in priority order: CUDA, then Metal, then CPU. Pure function
/// of host capabilities; repeated calls give the same answer and the
/// absence of accelerators degrades silently to CPU.
pub fn select_backend() -> Backend {
    if candle_core::utils::cuda_is_available() {
        Backend::Cuda
    } else if candle_core::utils::metal_is_available() {
        Backend::Metal
    } else {
        Backend::Cpu
    }
}

/// Construct the candle device for a chosen backend.
///
/// A positive probe can still fail at construction time (driver trouble,
/// exhausted contexts); that degrades to CPU rather than erroring.
pub fn device_for(backend: Backend) -> Device {
    match backend {
        Backend::Cuda => match Device::new_cuda(0) {
            Ok(device) => {
                tracing::info!("using CUDA device");
                device
            }
            Err(e) => {
                tracing::warn!(error = %e, "CUDA error, falling back to CPU");
                Device::Cpu
            }
        },
        Backend::Metal => match Device::new_metal(0) {
            Ok(device) => {
                tracing::info!("using Metal device");
                device
            }
            Err(e) => {
                tracing::warn!(error = %e, "Metal error, falling back to CPU");
                Device::Cpu
            }
        },
        Backend::Cpu => Device::Cpu,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_is_stable_for_a_fixed_host() {
        assert_eq!(select_backend(), select_backend());
    }

    #[test]
    fn cpu_backend_always_constructs() {
        assert!(matches!(device_for(Backend::Cpu), Device::Cpu));
    }
}
