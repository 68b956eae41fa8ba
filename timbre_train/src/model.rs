//! A small convolutional classifier over log-mel spectrograms.

use burn::config::Config;
use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::pool::{
    AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig,
};
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig, PaddingConfig2d, Relu};
use burn::tensor::Tensor;
use burn::tensor::backend::Backend;

#[derive(Config, Debug)]
pub struct GenreNetConfig {
    pub num_classes: usize,
    #[config(default = 1)]
    pub input_channels: usize,
    #[config(default = 0.3)]
    pub dropout: f64,
}

#[derive(Module, Debug)]
pub struct GenreNet<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    conv3: Conv2d<B>,
    pool: MaxPool2d,
    gap: AdaptiveAvgPool2d,
    dropout: Dropout,
    fc: Linear<B>,
    activation: Relu,
}

impl GenreNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> GenreNet<B> {
        GenreNet {
            conv1: Conv2dConfig::new([self.input_channels, 16], [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init(device),
            conv2: Conv2dConfig::new([16, 32], [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init(device),
            conv3: Conv2dConfig::new([32, 64], [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init(device),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            gap: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            dropout: DropoutConfig::new(self.dropout).init(),
            fc: LinearConfig::new(64, self.num_classes).init(device),
            activation: Relu::new(),
        }
    }
}

impl<B: Backend> GenreNet<B> {
    /// Input: (batch, channel, mel, frame) spectrograms.
    /// Output: unnormalized class logits, (batch, num_classes).
    pub fn forward(&self, spectrograms: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.pool.forward(self.activation.forward(self.conv1.forward(spectrograms)));
        let x = self.pool.forward(self.activation.forward(self.conv2.forward(x)));
        let x = self.pool.forward(self.activation.forward(self.conv3.forward(x)));
        let x = self.gap.forward(x);
        let x: Tensor<B, 2> = x.flatten(1, 3);
        let x = self.dropout.forward(x);
        self.fc.forward(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::backend::ndarray::NdArrayDevice;

    #[test]
    fn forward_produces_one_logit_row_per_sample() {
        let device = NdArrayDevice::default();
        let model: GenreNet<NdArray> = GenreNetConfig::new(5).init(&device);
        let input = Tensor::<NdArray, 4>::zeros([3, 1, 90, 260], &device);
        let logits = model.forward(input);
        assert_eq!(logits.dims(), [3, 5]);
    }

    #[test]
    fn forward_handles_small_spectrograms() {
        let device = NdArrayDevice::default();
        let model: GenreNet<NdArray> = GenreNetConfig::new(10).init(&device);
        let input = Tensor::<NdArray, 4>::zeros([1, 1, 16, 24], &device);
        let logits = model.forward(input);
        assert_eq!(logits.dims(), [1, 10]);
    }
}
