//! Standalone evaluation of persisted weights over a test set.

use std::path::Path;

use burn::module::Module;
use burn::record::CompactRecorder;
use burn::tensor::activation::softmax;
use burn::tensor::backend::Backend;

use crate::batch::SpectrogramBatcher;
use crate::dataset::Dataset;
use crate::error::{Result, TrainError};
use crate::labels::LabelMap;
use crate::metrics::ConfusionMatrix;
use crate::model::{GenreNet, GenreNetConfig};

/// Load persisted parameters and run every test sample individually,
/// accumulating a confusion matrix and logging per-class probabilities plus
/// the winning genre for each clip.
///
/// A missing weights file aborts before any sample is processed.
pub fn evaluate<B: Backend>(
    weights: &Path,
    test_data: &Dataset,
    labels: &LabelMap,
    device: &B::Device,
) -> Result<ConfusionMatrix> {
    // The recorder appends its own extension, so probe both spellings.
    if !weights.exists() && !weights.with_extension("mpk").exists() {
        return Err(TrainError::MissingWeights {
            path: weights.to_path_buf(),
        });
    }

    let model: GenreNet<B> = GenreNetConfig::new(labels.len())
        .init(device)
        .load_file(weights, &CompactRecorder::new(), device)
        .map_err(|e| TrainError::Checkpoint(e.to_string()))?;

    let batcher = SpectrogramBatcher::<B>::new(device.clone());
    let mut matrix = ConfusionMatrix::new(labels.len());

    for sample in test_data.samples() {
        let (image, _) = batcher.batch(&[sample])?;
        let logits = model.forward(image);
        let probs = softmax(logits, 1);
        let probs: Vec<f32> = probs
            .into_data()
            .to_vec()
            .map_err(|e| TrainError::TensorData(format!("{e:?}")))?;

        let predicted = argmax(&probs);
        for (id, p) in probs.iter().enumerate() {
            tracing::info!("{:>9} = {p:.5}", labels.name(id).unwrap_or("?"));
        }
        tracing::info!(
            "predicted {predicted} ({}), true label {} ({})",
            labels.name(predicted).unwrap_or("?"),
            sample.label,
            labels.name(sample.label).unwrap_or("?"),
        );

        matrix.record(sample.label, predicted)?;
    }

    tracing::info!(
        samples = matrix.total(),
        accuracy = matrix.accuracy(),
        "evaluation complete"
    );

    Ok(matrix)
}

fn argmax(values: &[f32]) -> usize {
    values
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::backend::ndarray::NdArrayDevice;

    #[test]
    fn argmax_picks_highest_probability() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), 1);
        assert_eq!(argmax(&[0.9, 0.05, 0.05]), 0);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn missing_weights_abort_before_processing() {
        let device = NdArrayDevice::default();
        let data = Dataset::from_samples(Vec::new());
        let err = evaluate::<NdArray>(
            Path::new("/no/such/weights"),
            &data,
            &LabelMap::five_genres(),
            &device,
        )
        .unwrap_err();
        assert!(matches!(err, TrainError::MissingWeights { .. }));
    }
}
