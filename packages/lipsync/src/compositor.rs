//! The two-stage lip-sync compositor.
//!
//! Stage A crops the mouth window out of the reference video and rescales
//! it to the canonical square; stage B muxes the request's audio against
//! whichever video stage A produced. Stage A always completes (success or
//! failure) before stage B starts, and a stage-A failure degrades to the
//! uncropped reference video instead of aborting the request.
//!
//! Contract: at most one in-flight composite per instance; methods take
//! `&mut self` and there is no internal locking.

use avatar_domain::{
    Backend, MediaArtifact, MediaError, Result, ServiceHealth, ServiceStatus,
};
use std::path::Path;
use tracing::{info, warn};

use crate::config::CompositorConfig;
use crate::ffmpeg;

/// Process-wide compositor; construct once and inject.
pub struct LipSyncCompositor {
    config: CompositorConfig,
    initialized: bool,
    last_error: Option<String>,
}

impl LipSyncCompositor {
    /// Build the compositor, validating the config and probing for ffmpeg.
    ///
    /// Never returns an error: a failed probe leaves the service in the
    /// failed state with the cause exposed through [`ServiceHealth`].
    pub fn new(config: CompositorConfig) -> Self {
        match config.validate().and_then(|_| ffmpeg::check_ffmpeg()) {
            Ok(()) => Self {
                config,
                initialized: true,
                last_error: None,
            },
            Err(e) => {
                warn!(error = %e, "compositor initialization failed");
                Self {
                    config,
                    initialized: false,
                    last_error: Some(e.to_string()),
                }
            }
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(CompositorConfig::default())
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(MediaError::Unavailable(
                self.last_error
                    .clone()
                    .unwrap_or_else(|| "compositor not initialized".to_string()),
            ))
        }
    }

    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Ok(value)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Stage A: crop the mouth window out of `video`, scale it to the
    /// canonical square, and clip it to the configured maximum duration.
    ///
    /// Callers treat any failure here as "use the uncropped source video",
    /// not as a request abort.
    pub fn crop_mouth_region(&mut self, video: &Path, out: &Path) -> Result<MediaArtifact> {
        self.ensure_ready()?;
        let result = self.run_crop(video, out);
        self.record(result)
    }

    fn run_crop(&self, video: &Path, out: &Path) -> Result<MediaArtifact> {
        if !video.exists() {
            return Err(MediaError::load_failed(video, "no such file"));
        }
        let filter = self.config.crop_filter();
        let max_secs = self.config.max_crop_secs.to_string();
        let video_arg = path_arg(video)?;
        let out_arg = path_arg(out)?;
        ffmpeg::run_ffmpeg(&[
            "-y",
            "-i",
            video_arg,
            "-vf",
            &filter,
            "-t",
            &max_secs,
            "-c:v",
            &self.config.video_codec,
            "-pix_fmt",
            &self.config.pixel_format,
            out_arg,
        ])?;
        Ok(MediaArtifact::video(out, ffmpeg::probe_duration(out)))
    }

    /// Stage B: pair the first audio stream of `audio` with the first
    /// video stream of `video`, re-encoding video with the stage-A codec
    /// and resyncing audio timestamps.
    ///
    /// A missing audio input is a precondition violation and is rejected
    /// before anything is spawned; no silent video is ever emitted.
    pub fn mux(&mut self, audio: &Path, video: &Path, out: &Path) -> Result<MediaArtifact> {
        self.ensure_ready()?;
        let result = self.run_mux(audio, video, out);
        self.record(result)
    }

    fn run_mux(&self, audio: &Path, video: &Path, out: &Path) -> Result<MediaArtifact> {
        if !audio.exists() {
            return Err(MediaError::load_failed(audio, "audio input does not exist"));
        }
        if !video.exists() {
            return Err(MediaError::load_failed(video, "video input does not exist"));
        }
        let audio_arg = path_arg(audio)?;
        let video_arg = path_arg(video)?;
        let out_arg = path_arg(out)?;
        ffmpeg::run_ffmpeg(&[
            "-y",
            "-i",
            audio_arg,
            "-i",
            video_arg,
            "-map",
            "0:a:0",
            "-map",
            "1:v:0",
            "-c:v",
            &self.config.video_codec,
            "-pix_fmt",
            &self.config.pixel_format,
            // Resync audio timestamps so the independently produced
            // streams do not drift apart.
            "-async",
            "1",
            out_arg,
        ])?;
        Ok(MediaArtifact::video(out, ffmpeg::probe_duration(out)))
    }

    /// Full pipeline: stage A into a request-scoped temp file, then stage
    /// B against the cropped clip (or the uncropped reference when the
    /// crop failed).
    pub fn composite(&mut self, audio: &Path, reference: &Path, out: &Path) -> Result<MediaArtifact> {
        self.ensure_ready()?;

        // Removed on every exit path when dropped.
        let cropped = tempfile::Builder::new()
            .prefix("mouth_crop_")
            .suffix(".mp4")
            .tempfile()
            .map_err(|e| MediaError::TranscodeFailed(format!("temp file: {e}")))?;

        // Stage A completes before stage B starts; its outcome picks the
        // video source.
        let video_source = match self.crop_mouth_region(reference, cropped.path()) {
            Ok(_) => cropped.path().to_path_buf(),
            Err(e) => {
                warn!(error = %e, "mouth crop failed; using uncropped reference video");
                reference.to_path_buf()
            }
        };

        let artifact = self.mux(audio, &video_source, out)?;
        info!(out = %out.display(), "lip-sync composite written");
        Ok(artifact)
    }
}

impl ServiceHealth for LipSyncCompositor {
    fn status(&self) -> ServiceStatus {
        ServiceStatus {
            initialized: self.initialized,
            // Transcoding is host-side; no accelerator is involved.
            backend: Backend::Cpu,
            sample_rate: None,
            error: self.last_error.clone(),
            model_available: self.initialized,
        }
    }
}

fn path_arg(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| MediaError::TranscodeFailed(format!("non-UTF-8 path: {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatar_domain::ErrorKind;

    #[test]
    fn invalid_config_fails_closed() {
        let mut config = CompositorConfig::default();
        config.target_width = 0;
        let compositor = LipSyncCompositor::new(config);

        let status = compositor.status();
        assert!(!status.initialized);
        assert!(!status.model_available);
        assert!(status.error.is_some());
        assert_eq!(status.sample_rate, None);
    }

    #[test]
    fn operations_while_unavailable_are_explicit_errors() {
        let mut config = CompositorConfig::default();
        config.max_crop_secs = -1.0;
        let mut compositor = LipSyncCompositor::new(config);

        let err = compositor
            .composite(
                Path::new("/tmp/a.wav"),
                Path::new("/tmp/v.mp4"),
                Path::new("/tmp/out.mp4"),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
    }
}
