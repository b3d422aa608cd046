//! # Avatar Lipsync
//!
//! Composites generated (or uploaded) speech with a short reference video:
//! crop the mouth region, rescale it to a canonical square, then mux the
//! new audio track against the cropped video track. Both stages shell out
//! to ffmpeg; the geometry and codec parameters are part of the
//! compatibility contract and live in [`config::CompositorConfig`].

pub mod compositor;
pub mod config;
pub mod ffmpeg;

pub use compositor::LipSyncCompositor;
pub use config::{CompositorConfig, CropWindow};
