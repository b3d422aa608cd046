//! Unified error for the media pipeline.
//!
//! Every service method converts third-party failures into one of these
//! variants at the component boundary; nothing below a service unwinds
//! past it. Call sites branch on [`ErrorKind`] rather than parsing the
//! message text.

use thiserror::Error;

/// Top-level error covering speech generation and lip-sync compositing.
#[derive(Debug, Clone, Error)]
pub enum MediaError {
    /// A dependency (model weights, runtime, external tool) was missing at
    /// initialization; permanent until process restart.
    #[error("unavailable: {0}")]
    Unavailable(String),
    /// Malformed or unreadable input audio/video; caller-correctable.
    #[error("load failed: {0}")]
    LoadFailed(String),
    /// Transient runtime fault during waveform synthesis.
    #[error("generation failed: {0}")]
    GenerationFailed(String),
    /// The external media tool exited non-zero or could not be run.
    #[error("transcode failed: {0}")]
    TranscodeFailed(String),
    /// Filesystem or encoder fault while writing an output artifact.
    #[error("save failed: {0}")]
    SaveFailed(String),
}

/// Closed failure category for branching at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unavailable,
    LoadFailed,
    GenerationFailed,
    TranscodeFailed,
    SaveFailed,
}

impl MediaError {
    /// The failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MediaError::Unavailable(_) => ErrorKind::Unavailable,
            MediaError::LoadFailed(_) => ErrorKind::LoadFailed,
            MediaError::GenerationFailed(_) => ErrorKind::GenerationFailed,
            MediaError::TranscodeFailed(_) => ErrorKind::TranscodeFailed,
            MediaError::SaveFailed(_) => ErrorKind::SaveFailed,
        }
    }

    /// `LoadFailed` with the offending path folded into the cause.
    pub fn load_failed(path: &std::path::Path, cause: impl std::fmt::Display) -> Self {
        MediaError::LoadFailed(format!("{}: {cause}", path.display()))
    }

    /// `SaveFailed` with the offending path folded into the cause.
    pub fn save_failed(path: &std::path::Path, cause: impl std::fmt::Display) -> Self {
        MediaError::SaveFailed(format!("{}: {cause}", path.display()))
    }
}

/// A specialized `Result` for media pipeline operations.
pub type Result<T> = std::result::Result<T, MediaError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(
            MediaError::Unavailable("model missing".into()).kind(),
            ErrorKind::Unavailable
        );
        assert_eq!(
            MediaError::TranscodeFailed("exit 1".into()).kind(),
            ErrorKind::TranscodeFailed
        );
    }

    #[test]
    fn path_helpers_keep_the_cause() {
        let err = MediaError::load_failed(Path::new("/tmp/voice.wav"), "no such file");
        assert_eq!(err.kind(), ErrorKind::LoadFailed);
        assert!(err.to_string().contains("/tmp/voice.wav"));
        assert!(err.to_string().contains("no such file"));
    }
}
