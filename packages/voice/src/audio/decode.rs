//! Symphonia-based decode of arbitrary audio files to interleaved f32 PCM.

use avatar_domain::{MediaError, Result};
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::conv::FromSample;

/// Raw decode result before any normalization.
pub(crate) struct DecodedAudio {
    /// Interleaved samples, `frames * channels` long.
    pub samples: Vec<f32>,
    pub channels: usize,
    pub sample_rate: u32,
}

fn append_interleaved<T>(
    samples: &mut Vec<f32>,
    data: std::borrow::Cow<symphonia::core::audio::AudioBuffer<T>>,
) where
    T: symphonia::core::sample::Sample,
    f32: symphonia::core::conv::FromSample<T>,
{
    let channels = data.spec().channels.count();
    for frame in 0..data.frames() {
        for ch in 0..channels {
            samples.push(f32::from_sample(data.chan(ch)[frame]));
        }
    }
}

/// Decode every audio frame of `path`, keeping all channels interleaved.
pub(crate) fn pcm_decode<P: AsRef<std::path::Path>>(path: P) -> Result<DecodedAudio> {
    let path = path.as_ref();

    // Open the media source.
    let src =
        std::fs::File::open(path).map_err(|e| MediaError::load_failed(path, e))?;

    // Create the media source stream.
    let mss = symphonia::core::io::MediaSourceStream::new(Box::new(src), Default::default());

    let hint = symphonia::core::probe::Hint::new();
    let meta_opts: symphonia::core::meta::MetadataOptions = Default::default();
    let fmt_opts: symphonia::core::formats::FormatOptions = Default::default();

    // Probe the media source.
    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|e| MediaError::load_failed(path, e))?;
    let mut format = probed.format;

    // Find the first audio track with a known (decodeable) codec.
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| MediaError::load_failed(path, "no supported audio tracks found"))?;

    let dec_opts: DecoderOptions = Default::default();
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &dec_opts)
        .map_err(|e| MediaError::load_failed(path, format!("unsupported codec: {e}")))?;
    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate.unwrap_or(0);

    let mut samples = Vec::new();
    let mut channels = None;
    // The decode loop.
    while let Ok(packet) = format.next_packet() {
        // Consume any new metadata that has been read since the last packet.
        while !format.metadata().is_latest() {
            format.metadata().pop();
        }

        if packet.track_id() != track_id {
            continue;
        }
        let decoded = decoder
            .decode(&packet)
            .map_err(|e| MediaError::load_failed(path, e))?;
        if channels.is_none() {
            channels = Some(decoded.spec().channels.count());
        }
        match decoded {
            AudioBufferRef::F32(data) => append_interleaved(&mut samples, data),
            AudioBufferRef::F64(data) => append_interleaved(&mut samples, data),
            AudioBufferRef::U8(data) => append_interleaved(&mut samples, data),
            AudioBufferRef::U16(data) => append_interleaved(&mut samples, data),
            AudioBufferRef::U24(data) => append_interleaved(&mut samples, data),
            AudioBufferRef::U32(data) => append_interleaved(&mut samples, data),
            AudioBufferRef::S8(data) => append_interleaved(&mut samples, data),
            AudioBufferRef::S16(data) => append_interleaved(&mut samples, data),
            AudioBufferRef::S24(data) => append_interleaved(&mut samples, data),
            AudioBufferRef::S32(data) => append_interleaved(&mut samples, data),
        }
    }

    Ok(DecodedAudio {
        samples,
        channels: channels.unwrap_or(1),
        sample_rate,
    })
}
