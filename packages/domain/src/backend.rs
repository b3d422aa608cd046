//! Compute backend kinds.
//!
//! The backend is probed once at service construction and injected from
//! then on; nothing in the pipeline re-probes hardware per call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The compute device class a service runs its inference on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Discrete accelerator (NVIDIA CUDA).
    Cuda,
    /// Unified-memory accelerator (Apple Metal).
    Metal,
    /// General-purpose processor fallback.
    Cpu,
}

impl Backend {
    /// Stable lowercase name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Cuda => "cuda",
            Backend::Metal => "metal",
            Backend::Cpu => "cpu",
        }
    }

    /// True for any non-CPU backend.
    pub fn is_accelerated(&self) -> bool {
        !matches!(self, Backend::Cpu)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
