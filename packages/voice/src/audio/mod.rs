//! Host-side audio plumbing: decode, downmix/resample, WAV output.
//!
//! All helpers here consume and produce plain `Vec<f32>`; accelerator
//! tensors never cross this boundary.

pub mod decode;
pub mod resample;
pub mod wav;

pub(crate) use decode::pcm_decode;
