use std::path::Path;

use symphonia::core::{
    audio::SampleBuffer,
    codecs::{CODEC_TYPE_NULL, DecoderOptions},
    errors::Error as SymphoniaError,
    formats::FormatOptions,
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
};

use ndarray::Array2;

use crate::audio::Waveform;
use crate::error::{Result, TimbreError};

/// Decode an audio file into a channel-major f32 waveform.
///
/// The file's native channel count and sample rate are preserved; bringing
/// them to the pipeline's fixed layout is the job of
/// [`normalize`](crate::audio::normalize).
pub fn decode<P: AsRef<Path>>(path: P) -> Result<Waveform> {
    let path = path.as_ref();

    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Hint from extension (optional but helps).
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| {
            TimbreError::Decode(format!(
                "unsupported format or failed to probe {}: {e}",
                path.display()
            ))
        })?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| TimbreError::Decode("no supported audio tracks found".into()))?;

    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| TimbreError::Decode(format!("failed to create decoder: {e}")))?;

    // Decoded interleaved f32 accumulates here.
    let mut interleaved: Vec<f32> = Vec::new();

    // Prefer codec params, fall back to the first decoded buffer's spec.
    let mut sample_rate: Option<u32> = track.codec_params.sample_rate;
    let mut channels: Option<usize> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(_)) => break, // end of stream
            Err(SymphoniaError::ResetRequired) => {
                return Err(TimbreError::Decode(
                    "decoder reset required (chained streams)".into(),
                ));
            }
            Err(e) => return Err(TimbreError::Decode(format!("error reading next packet: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::IoError(_)) | Err(SymphoniaError::DecodeError(_)) => continue,
            Err(SymphoniaError::ResetRequired) => {
                return Err(TimbreError::Decode("decoder reset required mid-stream".into()));
            }
            Err(e) => return Err(TimbreError::Decode(format!("unrecoverable decode error: {e}"))),
        };

        sample_rate.get_or_insert(decoded.spec().rate);
        channels.get_or_insert(decoded.spec().channels.count());

        let mut sbuf = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        sbuf.copy_interleaved_ref(decoded);
        interleaved.extend_from_slice(sbuf.samples());
    }

    let sample_rate =
        sample_rate.ok_or_else(|| TimbreError::Decode("could not determine sample rate".into()))?;
    let channels =
        channels.ok_or_else(|| TimbreError::Decode("could not determine channel count".into()))?;

    if interleaved.is_empty() {
        return Err(TimbreError::EmptyAudio);
    }

    let frames = interleaved.len() / channels;
    let mut planar = Array2::<f32>::zeros((channels, frames));
    for f in 0..frames {
        let base = f * channels;
        for c in 0..channels {
            planar[[c, f]] = interleaved[base + c];
        }
    }

    tracing::debug!(
        path = %path.display(),
        channels,
        sample_rate,
        frames,
        "decoded audio"
    );

    Waveform::new(planar, sample_rate)
}
