//! Conversion of preprocessed samples into backend tensors.

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor, TensorData};

use crate::dataset::Sample;
use crate::error::{Result, TrainError};

/// Stacks samples into a (batch, channel, mel, frame) float tensor plus an
/// integer target vector. Every item in a batch must share one spectrogram
/// shape.
#[derive(Debug, Clone)]
pub struct SpectrogramBatcher<B: Backend> {
    device: B::Device,
}

impl<B: Backend> SpectrogramBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    pub fn batch(&self, items: &[&Sample]) -> Result<(Tensor<B, 4>, Tensor<B, 1, Int>)> {
        let first = items
            .first()
            .ok_or_else(|| TrainError::EmptyDataset("cannot batch zero samples".into()))?;

        let (c, m, t) = first.spectrogram.dim();
        let expected = [c, m, t];

        let mut data = Vec::with_capacity(items.len() * c * m * t);
        let mut targets = Vec::with_capacity(items.len());
        for item in items {
            let (ic, im, it) = item.spectrogram.dim();
            if [ic, im, it] != expected {
                return Err(TrainError::ShapeMismatch {
                    expected,
                    actual: [ic, im, it],
                });
            }
            data.extend(item.spectrogram.iter().copied());
            targets.push(item.label as i64);
        }

        let images = Tensor::from_data(
            TensorData::new(data, [items.len(), c, m, t]),
            &self.device,
        );
        let targets = Tensor::from_data(TensorData::new(targets, [items.len()]), &self.device);
        Ok((images, targets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::backend::ndarray::NdArrayDevice;
    use ndarray::Array3;

    fn sample(shape: (usize, usize, usize), label: usize) -> Sample {
        Sample {
            spectrogram: Array3::from_shape_fn(shape, |(c, m, t)| (c + m + t) as f32),
            label,
        }
    }

    #[test]
    fn batch_has_expected_tensor_shapes() {
        let batcher = SpectrogramBatcher::<NdArray>::new(NdArrayDevice::default());
        let a = sample((1, 8, 12), 0);
        let b = sample((1, 8, 12), 3);
        let (images, targets) = batcher.batch(&[&a, &b]).unwrap();
        assert_eq!(images.dims(), [2, 1, 8, 12]);
        assert_eq!(targets.dims(), [2]);
    }

    #[test]
    fn mixed_shapes_are_rejected() {
        let batcher = SpectrogramBatcher::<NdArray>::new(NdArrayDevice::default());
        let a = sample((1, 8, 12), 0);
        let b = sample((1, 8, 13), 1);
        let err = batcher.batch(&[&a, &b]).unwrap_err();
        assert!(matches!(
            err,
            TrainError::ShapeMismatch {
                expected: [1, 8, 12],
                actual: [1, 8, 13],
            }
        ));
    }

    #[test]
    fn empty_batch_is_rejected() {
        let batcher = SpectrogramBatcher::<NdArray>::new(NdArrayDevice::default());
        assert!(batcher.batch(&[]).is_err());
    }
}
