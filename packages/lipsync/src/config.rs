//! Typed geometry and codec parameters for the compositor.
//!
//! The crop window is fixed in relative terms and assumes the reference
//! clip is framed so the speaker's mouth sits inside it; no face detection
//! runs. These constants are a compatibility contract, not per-call knobs.

use avatar_domain::{MediaError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A crop rectangle in fractions of the source frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropWindow {
    /// Crop width as a fraction of frame width.
    pub width: f64,
    /// Crop height as a fraction of frame height.
    pub height: f64,
    /// Horizontal offset of the crop's left edge, fraction of frame width.
    pub left: f64,
    /// Vertical offset of the crop's top edge, fraction of frame height.
    pub top: f64,
}

impl CropWindow {
    /// The mouth window: horizontal [35%, 65%], vertical [45%, 75%] of the
    /// frame, which keeps both upper and lower lip inside the square.
    pub const MOUTH: CropWindow = CropWindow {
        width: 0.30,
        height: 0.30,
        left: 0.35,
        top: 0.45,
    };

    fn validate(&self) -> Result<()> {
        let fraction = |v: f64| v > 0.0 && v <= 1.0;
        if !fraction(self.width) || !fraction(self.height) {
            return Err(MediaError::TranscodeFailed(format!(
                "crop size {}x{} must be in (0, 1]",
                self.width, self.height
            )));
        }
        if self.left < 0.0 || self.top < 0.0 {
            return Err(MediaError::TranscodeFailed(format!(
                "crop offset {}:{} must be non-negative",
                self.left, self.top
            )));
        }
        if self.left + self.width > 1.0 || self.top + self.height > 1.0 {
            return Err(MediaError::TranscodeFailed(
                "crop window extends past the frame".into(),
            ));
        }
        Ok(())
    }
}

/// Everything the two ffmpeg stages need, validated before any invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    pub crop: CropWindow,
    /// Canonical output resolution of the cropped clip.
    pub target_width: u32,
    pub target_height: u32,
    /// Ceiling on the cropped clip's duration, in seconds.
    pub max_crop_secs: f64,
    /// Video codec for both stages.
    pub video_codec: String,
    /// Pixel format for both stages.
    pub pixel_format: String,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            crop: CropWindow::MOUTH,
            target_width: 256,
            target_height: 256,
            max_crop_secs: 2.0,
            video_codec: "libx264".to_string(),
            pixel_format: "yuv420p".to_string(),
        }
    }
}

impl CompositorConfig {
    pub fn validate(&self) -> Result<()> {
        self.crop.validate()?;
        if self.target_width == 0 || self.target_height == 0 {
            return Err(MediaError::TranscodeFailed(
                "target resolution must be non-zero".into(),
            ));
        }
        // yuv420p subsampling needs even dimensions.
        if self.target_width % 2 != 0 || self.target_height % 2 != 0 {
            return Err(MediaError::TranscodeFailed(format!(
                "target resolution {}x{} must be even",
                self.target_width, self.target_height
            )));
        }
        if self.max_crop_secs <= 0.0 {
            return Err(MediaError::TranscodeFailed(
                "max_crop_secs must be positive".into(),
            ));
        }
        if self.video_codec.is_empty() || self.pixel_format.is_empty() {
            return Err(MediaError::TranscodeFailed(
                "codec parameters must be non-empty".into(),
            ));
        }
        Ok(())
    }

    /// The stage-A filtergraph: relative crop, then scale to the canonical
    /// square.
    pub fn crop_filter(&self) -> String {
        format!(
            "crop=iw*{:.2}:ih*{:.2}:iw*{:.2}:ih*{:.2},scale={}:{}",
            self.crop.width,
            self.crop.height,
            self.crop.left,
            self.crop.top,
            self.target_width,
            self.target_height
        )
    }

    /// Load a JSON config from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let txt = fs::read_to_string(path)?;
        let cfg: CompositorConfig = serde_json::from_str(&txt)?;
        Ok(cfg)
    }

    /// Save to disk (pretty-printed).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }
}
