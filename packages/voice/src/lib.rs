//! # Avatar Voice
//!
//! Conversational speech generation for the avatar media pipeline.
//!
//! Wraps the Sesame CSM-1B model (candle) with the Mimi neural codec for
//! token-to-waveform decoding. Everything downstream of this crate speaks
//! mono f32 PCM at the canonical 24 kHz rate.

pub mod audio;
pub mod config;
pub mod device;
pub mod generator;
pub mod segment;
pub mod setup;

pub use config::VoiceConfig;
pub use generator::SpeechService;
pub use segment::{GenerationRequest, SAMPLE_RATE, Segment};
