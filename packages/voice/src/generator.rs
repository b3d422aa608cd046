//! The speech generation service.
//!
//! Wraps Sesame CSM-1B: the backbone/decoder transformer samples one Mimi
//! frame per step, and the Mimi codec turns the accumulated frames into a
//! 24 kHz waveform. Initialization fails closed: a service whose assets
//! could not be loaded still constructs, reports `Unavailable`, and never
//! panics at request time.
//!
//! Contract: at most one in-flight `generate` per instance; the methods
//! take `&mut self` and there is no internal locking.

use avatar_domain::{Backend, MediaArtifact, MediaError, Result, ServiceHealth, ServiceStatus};
use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::{LogitsProcessor, Sampling};
use candle_transformers::models::{csm, mimi};
use std::path::Path;
use std::time::Duration;
use tokenizers::Tokenizer;
use tracing::{info, warn};

use crate::audio::wav;
use crate::config::VoiceConfig;
use crate::device;
use crate::segment::{GenerationRequest, SAMPLE_RATE, Segment};
use crate::setup;

/// One Mimi frame covers 80 ms of audio at the canonical rate.
const FRAME_MS: f64 = 80.0;

struct LoadedModel {
    model: csm::Model,
    codec: mimi::Model,
    tokenizer: Tokenizer,
    num_codebooks: usize,
}

enum ModelState {
    Ready(Box<LoadedModel>),
    Failed(String),
}

/// Process-wide speech generator; construct once and inject.
pub struct SpeechService {
    backend: Backend,
    device: Device,
    seed: u64,
    state: ModelState,
    last_error: Option<String>,
}

impl SpeechService {
    /// Build the service, loading model assets onto the probed backend.
    ///
    /// Never returns an error: a failed load leaves the service in the
    /// failed state with the cause exposed through [`ServiceHealth`].
    pub fn new(config: &VoiceConfig) -> Self {
        let backend = if config.cpu {
            Backend::Cpu
        } else {
            device::select_backend()
        };
        let dev = device::device_for(backend);
        let state = match LoadedModel::load(config, &dev) {
            Ok(loaded) => {
                info!(backend = %backend, "speech model ready");
                ModelState::Ready(Box::new(loaded))
            }
            Err(e) => {
                warn!(error = %e, "speech model initialization failed");
                ModelState::Failed(e.to_string())
            }
        };
        Self {
            backend,
            device: dev,
            seed: config.seed,
            state,
            last_error: None,
        }
    }

    /// Generate speech for `request`.
    ///
    /// Returns `Unavailable` immediately when the model never loaded and
    /// `GenerationFailed` on any internal fault; the output duration never
    /// exceeds `request.max_duration_ms`.
    pub fn generate(&mut self, request: &GenerationRequest) -> Result<Segment> {
        let loaded = match &mut self.state {
            ModelState::Ready(loaded) => loaded,
            ModelState::Failed(cause) => {
                warn!(cause = %cause, "generate called while speech model unavailable");
                return Err(MediaError::Unavailable(cause.clone()));
            }
        };
        request.validate()?;
        match run_generation(loaded, request, self.seed, &self.device) {
            Ok(audio) => {
                self.last_error = None;
                Ok(Segment::new(request.speaker, request.text.clone(), audio))
            }
            Err(e) => {
                let err = MediaError::GenerationFailed(e.to_string());
                warn!(error = %err, "speech generation failed");
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Write a waveform to `path` as 16-bit mono WAV at the canonical rate.
    pub fn save_audio(&self, audio: &[f32], path: impl AsRef<Path>) -> Result<MediaArtifact> {
        let path = path.as_ref();
        wav::write_pcm_as_wav(path, audio, SAMPLE_RATE)?;
        let duration = Duration::from_secs_f64(audio.len() as f64 / SAMPLE_RATE as f64);
        info!(path = %path.display(), "audio saved");
        Ok(MediaArtifact::audio(path, Some(duration)))
    }

    /// Build a context segment from an audio file and its transcript.
    pub fn load_voice_prompt(
        &self,
        text: &str,
        path: impl AsRef<Path>,
        speaker: u32,
    ) -> Result<Segment> {
        Segment::from_file(path, text, speaker)
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }
}

impl ServiceHealth for SpeechService {
    fn status(&self) -> ServiceStatus {
        let (initialized, init_error) = match &self.state {
            ModelState::Ready(_) => (true, None),
            ModelState::Failed(cause) => (false, Some(cause.clone())),
        };
        ServiceStatus {
            initialized,
            backend: self.backend,
            sample_rate: Some(SAMPLE_RATE),
            error: init_error.or_else(|| self.last_error.clone()),
            model_available: initialized,
        }
    }
}

impl LoadedModel {
    fn load(config: &VoiceConfig, device: &Device) -> Result<Self> {
        let paths = setup::resolve(config)?;

        let cfg: csm::Config = {
            let bytes = std::fs::read(&paths.config)
                .map_err(|e| MediaError::Unavailable(format!("model config: {e}")))?;
            serde_json::from_slice(&bytes)
                .map_err(|e| MediaError::Unavailable(format!("model config: {e}")))?
        };

        let dtype = device.bf16_default_to_f32();
        let model = {
            let vb = unsafe {
                VarBuilder::from_mmaped_safetensors(&[&paths.weights], dtype, device)
            }
            .map_err(|e| MediaError::Unavailable(format!("model weights: {e}")))?;
            csm::Model::new(&cfg, vb)
                .map_err(|e| MediaError::Unavailable(format!("model build: {e}")))?
        };

        // Mimi runs in f32 regardless of the backbone dtype.
        let codec = {
            let vb = unsafe {
                VarBuilder::from_mmaped_safetensors(&[&paths.codec_weights], DType::F32, device)
            }
            .map_err(|e| MediaError::Unavailable(format!("codec weights: {e}")))?;
            let codec_cfg = mimi::Config::v0_1(Some(cfg.audio_num_codebooks));
            mimi::Model::new(codec_cfg, vb)
                .map_err(|e| MediaError::Unavailable(format!("codec build: {e}")))?
        };

        let tokenizer = Tokenizer::from_file(&paths.tokenizer)
            .map_err(|e| MediaError::Unavailable(format!("tokenizer: {e}")))?;

        Ok(Self {
            model,
            codec,
            tokenizer,
            num_codebooks: cfg.audio_num_codebooks,
        })
    }
}

fn encode_text(tokenizer: &Tokenizer, speaker: u32, text: &str) -> candle_core::Result<Vec<u32>> {
    let prompt = format!("[{speaker}]{text}<|end_of_text|>");
    let encoded = tokenizer
        .encode(prompt, true)
        .map_err(|e| candle_core::Error::Msg(format!("tokenizer: {e}")))?;
    Ok(encoded.get_ids().to_vec())
}

fn run_generation(
    loaded: &mut LoadedModel,
    request: &GenerationRequest,
    seed: u64,
    device: &Device,
) -> candle_core::Result<Vec<f32>> {
    let LoadedModel {
        model,
        codec,
        tokenizer,
        num_codebooks,
    } = loaded;

    model.clear_kv_cache();
    let sampling = Sampling::TopK {
        k: request.top_k,
        temperature: request.temperature,
    };
    let mut lp = LogitsProcessor::from_sampling(seed, sampling);
    let mut pos = 0usize;

    // Prefill prior turns so the generated voice stays consistent. Each
    // turn contributes its text rows, then one row per encoded audio frame.
    for segment in &request.context {
        let ids = encode_text(tokenizer, segment.speaker, &segment.text)?;
        let (tokens, mask) = model.text_tokens_and_mask(&ids)?;
        let _ = model.generate_frame(&tokens, &mask, pos, &mut lp)?;
        pos += tokens.dim(1)?;

        let pcm = Tensor::from_slice(
            segment.audio.as_slice(),
            (1, 1, segment.audio.len()),
            device,
        )?;
        let codes = codec.encode(&pcm)?;
        let frames = codes.dim(2)?;
        for idx in 0..frames {
            let frame: Vec<u32> = codes.i((0, .., idx))?.to_vec1::<u32>()?;
            let (tokens, mask) = model.audio_tokens_and_mask(frame)?;
            let _ = model.generate_frame(&tokens, &mask, pos, &mut lp)?;
            pos += tokens.dim(1)?;
        }
    }

    let ids = encode_text(tokenizer, request.speaker, &request.text)?;
    let (mut tokens, mut mask) = model.text_tokens_and_mask(&ids)?;

    let max_frames = (request.max_duration_ms / FRAME_MS).ceil() as usize;
    let mut generated = Vec::with_capacity(max_frames);
    for _ in 0..max_frames {
        let frame = model.generate_frame(&tokens, &mask, pos, &mut lp)?;
        pos += tokens.dim(1)?;
        // An all-zero frame is the end-of-audio marker.
        let done = frame.iter().all(|&code| code == 0);
        (tokens, mask) = model.audio_tokens_and_mask(frame)?;
        if done {
            break;
        }
        generated.push(tokens.clone());
    }
    if generated.is_empty() {
        candle_core::bail!("model produced no audio frames");
    }

    // (1, frames, codebooks + 1) -> (1, codebooks, frames) for the codec.
    let codes = Tensor::cat(&generated, 1)?
        .narrow(2, 0, *num_codebooks)?
        .t()?;
    let pcm = codec.decode(&codes)?;
    let mut pcm = pcm.i(0)?.i(0)?.to_dtype(DType::F32)?.to_vec1::<f32>()?;

    // Hard ceiling: the caller's duration budget wins over the decoder's
    // last partial frame.
    let max_samples = (request.max_duration_ms / 1000.0 * SAMPLE_RATE as f64) as usize;
    pcm.truncate(max_samples);
    Ok(pcm)
}
