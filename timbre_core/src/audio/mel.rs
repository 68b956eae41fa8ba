//! Log-mel spectrogram generation.

use std::f32::consts::PI;

use ndarray::Array3;
use rustfft::{FftPlanner, num_complex::Complex};

use crate::audio::{Spectrogram, Waveform};
use crate::error::{Result, TimbreError};

const POWER_FLOOR: f32 = 1e-10;

/// Parameters of the waveform-to-spectrogram transform.
#[derive(Debug, Clone)]
pub struct MelConfig {
    /// Number of mel frequency bins.
    pub n_mels: usize,
    /// FFT window size in samples.
    pub n_fft: usize,
    /// Hop between successive windows; `None` derives `n_fft / 2`.
    pub hop_length: Option<usize>,
    /// Dynamic range clamp in decibels below the spectrogram peak.
    pub top_db: f32,
}

impl Default for MelConfig {
    fn default() -> Self {
        Self {
            n_mels: 90,
            n_fft: 510,
            hop_length: None,
            top_db: 80.0,
        }
    }
}

/// Mel spectrogram computer with a precomputed window and filterbank.
///
/// Bound to one sample rate; feeding it a waveform at any other rate is a
/// shape-consistency error, not a silent reinterpretation.
pub struct MelSpectrogram {
    n_mels: usize,
    n_fft: usize,
    hop_length: usize,
    top_db: f32,
    sample_rate: u32,
    filters: Vec<Vec<f32>>,
    window: Vec<f32>,
}

impl MelSpectrogram {
    pub fn new(config: MelConfig, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(TimbreError::InvalidConfig(
                "sample rate must be non-zero".into(),
            ));
        }
        if config.n_fft < 2 {
            return Err(TimbreError::InvalidConfig(format!(
                "n_fft must be at least 2, got {}",
                config.n_fft
            )));
        }
        if config.n_mels == 0 {
            return Err(TimbreError::InvalidConfig("n_mels must be non-zero".into()));
        }
        let hop_length = config.hop_length.unwrap_or(config.n_fft / 2);
        if hop_length == 0 {
            return Err(TimbreError::InvalidConfig(
                "hop length must be non-zero".into(),
            ));
        }
        if !(config.top_db > 0.0) {
            return Err(TimbreError::InvalidConfig(format!(
                "top_db must be positive, got {}",
                config.top_db
            )));
        }

        let window = hann_window(config.n_fft);
        let filters = mel_filterbank(
            config.n_fft,
            config.n_mels,
            sample_rate,
            0.0,
            sample_rate as f32 / 2.0,
        );

        Ok(Self {
            n_mels: config.n_mels,
            n_fft: config.n_fft,
            hop_length,
            top_db: config.top_db,
            sample_rate,
            filters,
            window,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    /// Number of time frames produced for a waveform of `len` samples.
    ///
    /// Windows are centered (zero padding of `n_fft / 2` at both ends), so for
    /// even `n_fft` this is `len / hop + 1`.
    pub fn num_frames(&self, len: usize) -> usize {
        (len + 2 * (self.n_fft / 2) - self.n_fft) / self.hop_length + 1
    }

    /// Compute the log-mel power spectrogram, shape
    /// (channels, n_mels, frames), in decibels clamped to `top_db` below the
    /// peak. Deterministic for identical inputs and parameters.
    pub fn compute(&self, wave: &Waveform) -> Result<Spectrogram> {
        if wave.sample_rate() != self.sample_rate {
            return Err(TimbreError::SampleRateMismatch {
                expected: self.sample_rate,
                actual: wave.sample_rate(),
            });
        }
        if wave.is_empty() {
            return Err(TimbreError::EmptyAudio);
        }

        let frames = self.num_frames(wave.len());
        let pad = self.n_fft / 2;
        let n_freqs = self.n_fft / 2 + 1;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(self.n_fft);

        let mut out = Array3::<f32>::zeros((wave.channels(), self.n_mels, frames));
        let mut padded = vec![0.0f32; wave.len() + 2 * pad];
        let mut buffer = vec![Complex::new(0.0f32, 0.0); self.n_fft];
        let mut power = vec![0.0f32; n_freqs];

        for (ch, row) in wave.samples().outer_iter().enumerate() {
            padded[..pad].fill(0.0);
            padded[pad + wave.len()..].fill(0.0);
            for (dst, &src) in padded[pad..pad + wave.len()].iter_mut().zip(row.iter()) {
                *dst = src;
            }

            for frame in 0..frames {
                let start = frame * self.hop_length;
                for j in 0..self.n_fft {
                    buffer[j] = Complex::new(padded[start + j] * self.window[j], 0.0);
                }
                fft.process(&mut buffer);

                for (k, p) in power.iter_mut().enumerate() {
                    *p = buffer[k].norm_sqr();
                }
                for (m, filter) in self.filters.iter().enumerate() {
                    let mel: f32 = filter.iter().zip(power.iter()).map(|(f, p)| f * p).sum();
                    out[[ch, m, frame]] = mel;
                }
            }
        }

        // Power to decibel with the dynamic range clamped below the peak.
        out.mapv_inplace(|v| 10.0 * v.max(POWER_FLOOR).log10());
        let peak = out.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let floor = peak - self.top_db;
        out.mapv_inplace(|v| v.max(floor));

        Ok(out)
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / size as f32).cos()))
        .collect()
}

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0_f32.powf(mel / 2595.0) - 1.0)
}

/// Triangular HTK-scale filterbank, (n_mels x n_fft/2+1).
fn mel_filterbank(n_fft: usize, n_mels: usize, sr: u32, fmin: f32, fmax: f32) -> Vec<Vec<f32>> {
    let n_freqs = n_fft / 2 + 1;
    let freq_bins: Vec<f32> = (0..n_freqs)
        .map(|i| i as f32 * sr as f32 / n_fft as f32)
        .collect();

    let mel_min = hz_to_mel(fmin);
    let mel_max = hz_to_mel(fmax);
    let mel_points: Vec<f32> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_min + (mel_max - mel_min) * i as f32 / (n_mels + 1) as f32))
        .collect();

    let mut filters = vec![vec![0.0; n_freqs]; n_mels];

    for i in 0..n_mels {
        let left = mel_points[i];
        let center = mel_points[i + 1];
        let right = mel_points[i + 2];

        for (j, &freq) in freq_bins.iter().enumerate() {
            if freq >= left && freq <= center {
                filters[i][j] = (freq - left) / (center - left);
            } else if freq > center && freq <= right {
                filters[i][j] = (right - freq) / (right - center);
            }
        }
    }

    filters
}
