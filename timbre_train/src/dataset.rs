//! Manifest-driven dataset loading: each entry is decoded, normalized,
//! optionally augmented and turned into a log-mel spectrogram.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::Deserialize;

use timbre_core::Spectrogram;
use timbre_core::audio::mel::{MelConfig, MelSpectrogram};
use timbre_core::audio::{augment, decoder, normalize};

use crate::error::{Result, TrainError};
use crate::labels::LabelMap;

/// One line of a JSONL manifest, as written by the `timbre_tools` converter.
#[derive(Debug, Deserialize)]
pub struct ManifestEntry {
    pub audio: PathBuf,
    pub label: usize,
}

/// Augmentation knobs applied while loading a training split.
#[derive(Debug, Clone)]
pub struct AugmentConfig {
    /// Largest circular time shift drawn per clip, in seconds.
    pub max_shift_seconds: f64,
}

/// Fixed layout every clip is normalized to before the spectrogram transform.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub channels: usize,
    pub sample_rate: u32,
    pub clip_seconds: f64,
    pub mel: MelConfig,
    /// `Some` only for training splits; validation and test stay clean.
    pub augment: Option<AugmentConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 22050,
            clip_seconds: 3.0,
            mel: MelConfig::default(),
            augment: None,
        }
    }
}

/// A preprocessed clip ready for batching.
#[derive(Debug, Clone)]
pub struct Sample {
    pub spectrogram: Spectrogram,
    pub label: usize,
}

/// An in-memory collection of preprocessed samples.
#[derive(Debug)]
pub struct Dataset {
    samples: Vec<Sample>,
}

impl Dataset {
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Read a JSONL manifest and run every referenced file through the
    /// preprocessing pipeline. Labels must fit the supplied map.
    pub fn load<R: Rng + ?Sized>(
        manifest: &Path,
        config: &PipelineConfig,
        labels: &LabelMap,
        rng: &mut R,
    ) -> Result<Self> {
        let entries = read_manifest(manifest)?;
        let mel = MelSpectrogram::new(config.mel.clone(), config.sample_rate)?;

        let mut samples = Vec::with_capacity(entries.len());
        for entry in &entries {
            if entry.label >= labels.len() {
                return Err(TrainError::LabelOutOfRange {
                    label: entry.label,
                    num_classes: labels.len(),
                });
            }

            let wave = decoder::decode(&entry.audio)?;
            let wave = normalize::rechannel(wave, config.channels)?;
            let wave = normalize::resample(wave, config.sample_rate)?;
            let mut wave = normalize::cut_or_pad(wave, config.clip_seconds)?;

            if let Some(aug) = &config.augment {
                wave = augment::random_time_shift(wave, aug.max_shift_seconds, rng);
            }

            let mut spectrogram = mel.compute(&wave)?;
            if config.augment.is_some() {
                spectrogram = augment::mask_spectrogram_segment(spectrogram, rng);
            }

            samples.push(Sample {
                spectrogram,
                label: entry.label,
            });
        }

        tracing::info!(
            manifest = %manifest.display(),
            samples = samples.len(),
            augmented = config.augment.is_some(),
            "dataset loaded"
        );

        Ok(Self { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut entries = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry = serde_json::from_str::<ManifestEntry>(&line)
            .map_err(|source| TrainError::Manifest {
                line: idx + 1,
                source,
            })?;
        entries.push(entry);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn manifest_parses_entries_and_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.jsonl");
        let mut f = File::create(&path).unwrap();
        writeln!(f, r#"{{"audio": "a.wav", "label": 0}}"#).unwrap();
        writeln!(f).unwrap();
        writeln!(f, r#"{{"audio": "b.wav", "label": 4}}"#).unwrap();

        let entries = read_manifest(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].audio, PathBuf::from("a.wav"));
        assert_eq!(entries[1].label, 4);
    }

    #[test]
    fn malformed_manifest_line_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        let mut f = File::create(&path).unwrap();
        writeln!(f, r#"{{"audio": "a.wav", "label": 0}}"#).unwrap();
        writeln!(f, "not json").unwrap();

        let err = read_manifest(&path).unwrap_err();
        assert!(matches!(err, TrainError::Manifest { line: 2, .. }));
    }
}
