//! On-disk media artifacts produced by the pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What kind of stream an artifact carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

/// A finished audio or video file on disk.
///
/// Ownership transfers to the caller once the artifact is written; the
/// pipeline does not track its lifetime beyond creation. `duration` is
/// exact for waveforms the pipeline wrote itself and best-effort (probed
/// from the container) for video, `None` when probing failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaArtifact {
    pub path: PathBuf,
    pub kind: MediaKind,
    pub duration: Option<Duration>,
}

impl MediaArtifact {
    pub fn audio(path: impl Into<PathBuf>, duration: Option<Duration>) -> Self {
        Self {
            path: path.into(),
            kind: MediaKind::Audio,
            duration,
        }
    }

    pub fn video(path: impl Into<PathBuf>, duration: Option<Duration>) -> Self {
        Self {
            path: path.into(),
            kind: MediaKind::Video,
            duration,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_tag_the_kind() {
        let audio = MediaArtifact::audio("/tmp/out.wav", Some(Duration::from_secs(3)));
        assert_eq!(audio.kind, MediaKind::Audio);
        assert_eq!(audio.duration, Some(Duration::from_secs(3)));

        let video = MediaArtifact::video("/tmp/out.mp4", None);
        assert_eq!(video.kind, MediaKind::Video);
        assert_eq!(video.path(), Path::new("/tmp/out.mp4"));
    }
}
