//! Audio preprocessing for genre classification.
//!
//! Decodes waveform files, normalizes them to a fixed channel count, sample
//! rate and duration, converts them to log-mel spectrograms and applies
//! training-time augmentation (random time shift, time/frequency masking).

pub mod audio;
pub mod error;

pub use audio::{Spectrogram, Waveform};
pub use error::{Result, TimbreError};
