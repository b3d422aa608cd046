//! WAV output via hound.

use avatar_domain::{MediaError, Result};
use std::path::Path;

/// Write `pcm` (32-bit float, -1.0..+1.0, mono) to `path` as 16-bit PCM WAV.
pub fn write_pcm_as_wav(path: &Path, pcm: &[f32], sample_rate_hz: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: sample_rate_hz,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer =
        hound::WavWriter::create(path, spec).map_err(|e| MediaError::save_failed(path, e))?;
    for &s in pcm {
        // clip -1.0..+1.0, scale to +/-32767
        let clamped = s.clamp(-1.0, 1.0);
        writer
            .write_sample((clamped * 32767.0) as i16)
            .map_err(|e| MediaError::save_failed(path, e))?;
    }
    writer
        .finalize()
        .map_err(|e| MediaError::save_failed(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SAMPLE_RATE;

    #[test]
    fn round_trips_through_hound() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let pcm: Vec<f32> = (0..SAMPLE_RATE as usize / 2)
            .map(|i| (i as f32 * 0.001).sin() * 0.8)
            .collect();

        write_pcm_as_wav(&path, &pcm, SAMPLE_RATE).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, SAMPLE_RATE);
        assert_eq!(reader.len() as usize, pcm.len());
    }

    #[test]
    fn unwritable_path_is_save_failed() {
        let err = write_pcm_as_wav(
            Path::new("/nonexistent-dir/out.wav"),
            &[0.0, 0.1],
            SAMPLE_RATE,
        )
        .unwrap_err();
        assert_eq!(err.kind(), avatar_domain::ErrorKind::SaveFailed);
    }
}
