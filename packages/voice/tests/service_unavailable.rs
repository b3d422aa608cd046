//! Fail-closed behavior of the speech service when model assets are
//! missing. Uses bogus local overrides so nothing touches the network.

use avatar_domain::{ErrorKind, ServiceHealth};
use avatar_voice::{GenerationRequest, SAMPLE_RATE, SpeechService, VoiceConfig};
use std::path::PathBuf;

fn offline_config() -> VoiceConfig {
    let mut config = VoiceConfig::default();
    config.cpu = true;
    config.weights = Some(PathBuf::from("/nonexistent/csm/model.safetensors"));
    config.model_config = Some(PathBuf::from("/nonexistent/csm/config.json"));
    config.tokenizer = Some(PathBuf::from("/nonexistent/tokenizer.json"));
    config.codec_weights = Some(PathBuf::from("/nonexistent/mimi/model.safetensors"));
    config
}

#[test]
fn failed_init_constructs_and_reports() {
    let service = SpeechService::new(&offline_config());

    let status = service.status();
    assert!(!status.initialized);
    assert!(!status.model_available);
    assert!(status.error.as_deref().is_some_and(|e| !e.is_empty()));
    assert_eq!(status.sample_rate, Some(SAMPLE_RATE));
    assert!(!service.is_available());
}

#[test]
fn generate_while_unavailable_is_an_explicit_error() {
    let mut service = SpeechService::new(&offline_config());

    let err = service
        .generate(&GenerationRequest::new("Hello", 0))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unavailable);

    // Repeated calls stay unavailable and never panic.
    let err = service
        .generate(&GenerationRequest::new("Hello again", 0))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unavailable);
}

#[test]
fn save_audio_works_without_a_model() {
    let service = SpeechService::new(&offline_config());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");

    // Half a second of a quiet ramp.
    let pcm: Vec<f32> = (0..SAMPLE_RATE as usize / 2)
        .map(|i| (i as f32 / SAMPLE_RATE as f32).sin() * 0.1)
        .collect();
    let artifact = service.save_audio(&pcm, &path).unwrap();

    assert_eq!(artifact.path, path);
    let reported = artifact.duration.unwrap().as_secs_f64();
    assert!((reported - 0.5).abs() < 0.05);

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().sample_rate, SAMPLE_RATE);
    assert_eq!(reader.len() as usize, pcm.len());
}

#[test]
fn voice_prompt_loading_is_independent_of_the_model() {
    let service = SpeechService::new(&offline_config());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prompt.wav");

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for i in 0..16_000u32 {
        writer
            .write_sample(((i as f32 * 0.05).sin() * 10_000.0) as i16)
            .unwrap();
    }
    writer.finalize().unwrap();

    let segment = service.load_voice_prompt("my voice", &path, 1).unwrap();
    assert_eq!(segment.speaker, 1);
    // one second of 16 kHz audio resampled to the canonical rate
    assert!(segment.num_samples().abs_diff(SAMPLE_RATE as usize) <= 1);
}
