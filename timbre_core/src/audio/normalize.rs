//! Waveform normalization: fixed channel count, sample rate and duration.

use audioadapter_buffers::direct::InterleavedSlice;
use ndarray::{Array2, s};
use rubato::{Fft, FixedSync, Resampler};

use crate::audio::Waveform;
use crate::error::{Result, TimbreError};

/// Convert a duration in seconds to a sample count, flooring toward negative
/// infinity so negative shifts round the same way as positive ones truncate.
pub fn seconds_to_samples(t_sec: f64, sample_rate: u32) -> i64 {
    (t_sec * sample_rate as f64).floor() as i64
}

/// Convert a sample count to whole seconds, rounding up.
///
/// Deliberately not the inverse of [`seconds_to_samples`]: the floor/ceil pair
/// over-covers so a clip is never reported shorter than it is.
pub fn samples_to_seconds(samples: usize, sample_rate: u32) -> u64 {
    (samples as f64 / sample_rate as f64).ceil() as u64
}

/// Force the waveform to `target_channels` (1 or 2).
///
/// Mono to stereo duplicates the channel. Reducing keeps the leading channels
/// and drops the rest, which is lossy but documented behavior. Any other
/// target is an explicit configuration error.
pub fn rechannel(wave: Waveform, target_channels: usize) -> Result<Waveform> {
    if target_channels != 1 && target_channels != 2 {
        return Err(TimbreError::UnsupportedChannelTarget {
            requested: target_channels,
        });
    }

    let current = wave.channels();
    if current == target_channels {
        return Ok(wave);
    }

    let rate = wave.sample_rate();
    let samples = wave.into_samples();

    let out = if target_channels == 1 {
        // Lossy: keep the first channel only.
        samples.slice(s![..1, ..]).to_owned()
    } else if current == 1 {
        let mut out = Array2::zeros((2, samples.ncols()));
        out.row_mut(0).assign(&samples.row(0));
        out.row_mut(1).assign(&samples.row(0));
        out
    } else {
        // More than two channels: keep the first two.
        samples.slice(s![..2, ..]).to_owned()
    };

    Ok(Waveform::from_raw(out, rate))
}

/// Resample the waveform to `target_rate`, each channel independently.
///
/// Identity short-circuit when the rate already matches.
pub fn resample(wave: Waveform, target_rate: u32) -> Result<Waveform> {
    if target_rate == 0 {
        return Err(TimbreError::InvalidConfig(
            "target sample rate must be non-zero".into(),
        ));
    }
    if wave.sample_rate() == target_rate {
        return Ok(wave);
    }
    if wave.is_empty() {
        return Err(TimbreError::EmptyAudio);
    }

    let channels = wave.channels();
    let sr_in = wave.sample_rate() as usize;
    let frames_in = wave.len();
    let samples = wave.samples();

    // The adapter wants interleaved frames.
    let mut interleaved = vec![0.0f32; frames_in * channels];
    for f in 0..frames_in {
        for c in 0..channels {
            interleaved[f * channels + c] = samples[[c, f]];
        }
    }

    // Offline processing; fixed input chunking, output length varies.
    let chunk_size: usize = 1024;
    let sub_chunks: usize = 1;

    let mut resampler = Fft::<f32>::new(
        sr_in,
        target_rate as usize,
        chunk_size,
        sub_chunks,
        channels,
        FixedSync::Input,
    )
    .map_err(|e| TimbreError::Resample(format!("failed to construct FFT resampler: {e}")))?;

    let out_frames = resampler.process_all_needed_output_len(frames_in);
    let mut out = vec![0.0f32; out_frames * channels];

    let input_adapter = InterleavedSlice::new(&interleaved, channels, frames_in)
        .map_err(|e| TimbreError::Resample(format!("bad input adapter: {e}")))?;
    let mut output_adapter = InterleavedSlice::new_mut(&mut out, channels, out_frames)
        .map_err(|e| TimbreError::Resample(format!("bad output adapter: {e}")))?;

    let (_frames_read, frames_written) = resampler
        .process_all_into_buffer(&input_adapter, &mut output_adapter, frames_in, None)
        .map_err(|e| TimbreError::Resample(e.to_string()))?;

    let mut planar = Array2::<f32>::zeros((channels, frames_written));
    for f in 0..frames_written {
        for c in 0..channels {
            planar[[c, f]] = out[f * channels + c];
        }
    }

    Ok(Waveform::from_raw(planar, target_rate))
}

/// Truncate or zero-pad the waveform to exactly
/// `seconds_to_samples(target_seconds)` samples per channel.
///
/// Truncation keeps the head and drops the tail. Padding is symmetric, with an
/// odd deficit putting the extra zero at the tail.
pub fn cut_or_pad(wave: Waveform, target_seconds: f64) -> Result<Waveform> {
    let rate = wave.sample_rate();
    let target = seconds_to_samples(target_seconds, rate);
    if target <= 0 {
        return Err(TimbreError::ZeroLengthTarget {
            seconds: target_seconds,
            sample_rate: rate,
        });
    }
    let target = target as usize;

    let current = wave.len();
    if current == target {
        return Ok(wave);
    }

    let channels = wave.channels();
    let samples = wave.into_samples();

    let out = if current > target {
        samples.slice(s![.., ..target]).to_owned()
    } else {
        let deficit = target - current;
        let pad_before = deficit / 2;
        let mut out = Array2::zeros((channels, target));
        out.slice_mut(s![.., pad_before..pad_before + current])
            .assign(&samples);
        out
    };

    Ok(Waveform::from_raw(out, rate))
}
