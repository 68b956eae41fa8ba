//! End-to-end preprocessing: a synthetic WAV on disk goes through decode,
//! channel/rate/length normalization and spectrogram generation.

use std::path::PathBuf;

use timbre_core::TimbreError;
use timbre_core::audio::mel::{MelConfig, MelSpectrogram};
use timbre_core::audio::{decoder, normalize};

fn write_stereo_sine(dir: &std::path::Path, seconds: f64) -> PathBuf {
    let path = dir.join("tone.wav");
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    let n = (seconds * 44100.0) as usize;
    for i in 0..n {
        let t = i as f32 / 44100.0;
        let left = (2.0 * std::f32::consts::PI * 440.0 * t).sin();
        let right = (2.0 * std::f32::consts::PI * 220.0 * t).sin();
        writer.write_sample((left * i16::MAX as f32 * 0.5) as i16).unwrap();
        writer.write_sample((right * i16::MAX as f32 * 0.5) as i16).unwrap();
    }
    writer.finalize().unwrap();
    path
}

#[test]
fn decode_preserves_channels_and_rate() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_stereo_sine(dir.path(), 2.5);

    let wave = decoder::decode(&path).unwrap();
    assert_eq!(wave.channels(), 2);
    assert_eq!(wave.sample_rate(), 44100);
    assert_eq!(wave.len(), 110250);
}

#[test]
fn decode_missing_file_is_an_io_error() {
    let err = decoder::decode("/definitely/not/here.wav").unwrap_err();
    assert!(matches!(err, TimbreError::Io(_)));
}

#[test]
fn full_pipeline_produces_fixed_spectrogram_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_stereo_sine(dir.path(), 2.5);

    let wave = decoder::decode(&path).unwrap();
    let wave = normalize::rechannel(wave, 1).unwrap();
    let wave = normalize::resample(wave, 22050).unwrap();
    let wave = normalize::cut_or_pad(wave, 3.0).unwrap();
    assert_eq!(wave.channels(), 1);
    assert_eq!(wave.sample_rate(), 22050);
    assert_eq!(wave.len(), 66150);

    let mel = MelSpectrogram::new(MelConfig::default(), 22050).unwrap();
    let spec = mel.compute(&wave).unwrap();
    assert_eq!(spec.dim(), (1, 90, 260));
    assert!(spec.iter().all(|v| v.is_finite()));
}
