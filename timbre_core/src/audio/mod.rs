//! Waveform and spectrogram types plus the preprocessing stages that operate
//! on them.

pub mod augment;
pub mod decoder;
pub mod mel;
pub mod normalize;

use ndarray::{Array2, Array3};

use crate::error::{Result, TimbreError};

/// Log-mel power spectrogram in decibels, laid out as
/// (channel, mel bin, time frame).
pub type Spectrogram = Array3<f32>;

/// A multi-channel time-domain signal with its sample rate.
///
/// Samples are laid out as (channel, sample index). Normalization and
/// augmentation consume the waveform and return a new one; operations that
/// would be no-ops return the input untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Array2<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Wrap raw channel-major samples. The rate must be non-zero and at least
    /// one channel must be present.
    pub fn new(samples: Array2<f32>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(TimbreError::InvalidConfig(
                "sample rate must be non-zero".into(),
            ));
        }
        if samples.nrows() == 0 {
            return Err(TimbreError::EmptyAudio);
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Internal constructor for stages that preserve the invariants.
    pub(crate) fn from_raw(samples: Array2<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn channels(&self) -> usize {
        self.samples.nrows()
    }

    /// Number of samples per channel.
    pub fn len(&self) -> usize {
        self.samples.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.ncols() == 0
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &Array2<f32> {
        &self.samples
    }

    pub fn into_samples(self) -> Array2<f32> {
        self.samples
    }
}
