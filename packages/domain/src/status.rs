//! Uniform availability snapshot for pipeline services.

use crate::backend::Backend;
use serde::{Deserialize, Serialize};

/// Point-in-time health of one service instance.
///
/// Recomputed on demand from the owning service's fields; there is no
/// separate storage and taking a snapshot can never fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// Did initialization complete?
    pub initialized: bool,
    /// Backend the service runs on.
    pub backend: Backend,
    /// Canonical output rate in Hz; `None` for services with no audio clock.
    pub sample_rate: Option<u32>,
    /// Most recent initialization or request failure, if any.
    pub error: Option<String>,
    /// Is the underlying model/tool loaded and usable?
    pub model_available: bool,
}

impl ServiceStatus {
    /// Snapshot for a service whose initialization failed.
    pub fn offline(backend: Backend, error: impl Into<String>) -> Self {
        Self {
            initialized: false,
            backend,
            sample_rate: None,
            error: Some(error.into()),
            model_available: false,
        }
    }
}

/// Read-only health reporting implemented by every pipeline service.
pub trait ServiceHealth {
    /// Current status snapshot. Must never panic.
    fn status(&self) -> ServiceStatus;

    /// Convenience readiness check for callers that only branch on go/no-go.
    fn is_available(&self) -> bool {
        let status = self.status();
        status.initialized && status.model_available
    }
}
