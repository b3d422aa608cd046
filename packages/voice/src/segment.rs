//! Voice segments and generation requests.

use avatar_domain::{MediaError, Result};
use std::path::Path;

use crate::audio;

/// Canonical sample rate every segment is normalized to (Hz).
pub const SAMPLE_RATE: u32 = 24_000;

/// Upper bound on a single request's duration ceiling (10 minutes).
/// Keeps the frame budget and output buffers at a sane size.
pub const MAX_DURATION_CEILING_MS: f64 = 600_000.0;

/// One unit of conversational audio: who said what, and the waveform.
///
/// The audio is always mono f32 at [`SAMPLE_RATE`]; segments are built
/// normalized and never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Speaker identity (0 or 1 in this domain).
    pub speaker: u32,
    /// Source text of the utterance.
    pub text: String,
    /// Mono waveform at [`SAMPLE_RATE`].
    pub audio: Vec<f32>,
}

impl Segment {
    pub fn new(speaker: u32, text: impl Into<String>, audio: Vec<f32>) -> Self {
        Self {
            speaker,
            text: text.into(),
            audio,
        }
    }

    /// Load a segment from an audio file of arbitrary format, channel
    /// count and sample rate.
    ///
    /// Channels are collapsed by arithmetic average; the waveform is
    /// resampled only when the source rate differs from the canonical
    /// rate. Missing files, unsupported codecs, unknown rates and
    /// zero-length audio all fail with `LoadFailed` and nothing is
    /// partially constructed.
    pub fn from_file(path: impl AsRef<Path>, text: impl Into<String>, speaker: u32) -> Result<Self> {
        let path = path.as_ref();
        let decoded = audio::pcm_decode(path)?;
        if decoded.sample_rate == 0 {
            return Err(MediaError::load_failed(path, "unknown sample rate"));
        }
        if decoded.samples.is_empty() {
            return Err(MediaError::load_failed(path, "zero-length audio"));
        }
        let pcm =
            audio::resample::to_canonical_mono(decoded.samples, decoded.sample_rate, decoded.channels)?;
        Ok(Self::new(speaker, text, pcm))
    }

    pub fn num_samples(&self) -> usize {
        self.audio.len()
    }

    pub fn duration_ms(&self) -> f64 {
        self.audio.len() as f64 * 1000.0 / SAMPLE_RATE as f64
    }
}

/// Everything one `generate` call needs; constructed per call, never stored.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub text: String,
    pub speaker: u32,
    /// Prior utterances biasing voice/style continuity; may be empty.
    pub context: Vec<Segment>,
    /// Hard ceiling on generated length, in milliseconds.
    pub max_duration_ms: f64,
    /// Sampling entropy knob, expected domain 0.1-1.0.
    pub temperature: f64,
    /// Top-k sampling width.
    pub top_k: usize,
}

impl GenerationRequest {
    pub fn new(text: impl Into<String>, speaker: u32) -> Self {
        Self {
            text: text.into(),
            speaker,
            context: Vec::new(),
            max_duration_ms: 10_000.0,
            temperature: 0.9,
            top_k: 50,
        }
    }

    pub fn with_context(mut self, context: Vec<Segment>) -> Self {
        self.context = context;
        self
    }

    pub fn with_max_duration_ms(mut self, ms: f64) -> Self {
        self.max_duration_ms = ms;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(MediaError::GenerationFailed("empty text".into()));
        }
        if !(self.temperature > 0.0 && self.temperature <= 1.0) {
            return Err(MediaError::GenerationFailed(format!(
                "temperature {} out of range (0, 1]",
                self.temperature
            )));
        }
        if !(self.max_duration_ms > 0.0 && self.max_duration_ms <= MAX_DURATION_CEILING_MS) {
            return Err(MediaError::GenerationFailed(format!(
                "max_duration_ms {} out of range (0, {MAX_DURATION_CEILING_MS}]",
                self.max_duration_ms
            )));
        }
        if self.top_k == 0 {
            return Err(MediaError::GenerationFailed("top_k must be >= 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatar_domain::ErrorKind;

    #[test]
    fn request_defaults_match_the_contract() {
        let req = GenerationRequest::new("Hello", 0);
        assert_eq!(req.max_duration_ms, 10_000.0);
        assert_eq!(req.temperature, 0.9);
        assert_eq!(req.top_k, 50);
        assert!(req.context.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn blank_text_fails_validation() {
        let req = GenerationRequest::new("   \n", 0);
        let err = req.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::GenerationFailed);
    }

    #[test]
    fn out_of_range_knobs_fail_validation() {
        assert!(
            GenerationRequest::new("hi", 0)
                .with_temperature(1.5)
                .validate()
                .is_err()
        );
        assert!(
            GenerationRequest::new("hi", 0)
                .with_temperature(0.0)
                .validate()
                .is_err()
        );
        assert!(
            GenerationRequest::new("hi", 0)
                .with_max_duration_ms(0.0)
                .validate()
                .is_err()
        );
        // An absurd duration ceiling must not reach the frame budget.
        assert!(
            GenerationRequest::new("hi", 0)
                .with_max_duration_ms(1e18)
                .validate()
                .is_err()
        );
        assert!(
            GenerationRequest::new("hi", 0)
                .with_max_duration_ms(f64::NAN)
                .validate()
                .is_err()
        );
        assert!(
            GenerationRequest::new("hi", 0)
                .with_max_duration_ms(MAX_DURATION_CEILING_MS)
                .validate()
                .is_ok()
        );
        assert!(
            GenerationRequest::new("hi", 0)
                .with_top_k(0)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn missing_file_is_load_failed() {
        let err = Segment::from_file("/does/not/exist.wav", "hi", 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LoadFailed);
    }

    #[test]
    fn zero_length_audio_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        hound::WavWriter::create(&path, spec).unwrap().finalize().unwrap();

        let err = Segment::from_file(&path, "hi", 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LoadFailed);
    }

    #[test]
    fn loaded_segment_is_canonical_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo48k.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 48_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        // one second of silence-ish stereo
        for i in 0..48_000u32 {
            let s = ((i as f32 * 0.01).sin() * 8000.0) as i16;
            writer.write_sample(s).unwrap();
            writer.write_sample(-s).unwrap();
        }
        writer.finalize().unwrap();

        let seg = Segment::from_file(&path, "prompt", 1).unwrap();
        assert_eq!(seg.speaker, 1);
        // 1 s of source audio stays ~1 s at the canonical rate
        assert!(seg.num_samples().abs_diff(SAMPLE_RATE as usize) <= 1);
        assert!((seg.duration_ms() - 1000.0).abs() < 1.0);
    }
}
