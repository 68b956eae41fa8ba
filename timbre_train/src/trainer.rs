//! The supervised training loop: epoch iteration, loss averaging and
//! best-validation checkpointing.

use std::path::{Path, PathBuf};

use burn::config::Config;
use burn::module::{AutodiffModule, Module};
use burn::nn::loss::CrossEntropyLossConfig;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::record::CompactRecorder;
use burn::tensor::ElementConversion;
use burn::tensor::backend::AutodiffBackend;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::batch::SpectrogramBatcher;
use crate::checkpoint::{CheckpointGate, checkpoint_path};
use crate::dataset::{Dataset, Sample};
// No `Result` alias import here: the Config derive below expands serde code
// that spells out `Result<_, E>`, which a one-parameter alias would capture.
use crate::error::TrainError;
use crate::model::{GenreNet, GenreNetConfig};

#[derive(Config, Debug)]
pub struct TrainConfig {
    pub num_classes: usize,
    /// Tag embedded in checkpoint file names.
    pub dataset_tag: String,
    #[config(default = 16)]
    pub batch_size: usize,
    #[config(default = 1e-3)]
    pub learning_rate: f64,
    #[config(default = 50)]
    pub epochs: usize,
    #[config(default = 1)]
    pub input_channels: usize,
}

/// Per-epoch loss history and the checkpoints written along the way.
#[derive(Debug)]
pub struct TrainReport {
    pub train_losses: Vec<f64>,
    pub val_losses: Vec<f64>,
    pub checkpoints: Vec<PathBuf>,
}

/// Mean-loss divisor: the reference implementation divides by
/// `floor(dataset_len / batch_size)`, ignoring a trailing partial batch even
/// though its loss is in the sum. Kept as-is, floored at one so a dataset
/// smaller than a batch does not divide by zero.
fn loss_divisor(dataset_len: usize, batch_size: usize) -> f64 {
    (dataset_len / batch_size).max(1) as f64
}

/// Train a model, checkpointing into `save_dir` whenever the mean validation
/// loss sets a new minimum. Checkpoints are whole-file snapshots written at
/// epoch boundaries. `init_weights` resumes from a persisted snapshot instead
/// of starting fresh.
pub fn train<B: AutodiffBackend, R: Rng + ?Sized>(
    config: &TrainConfig,
    train_data: &Dataset,
    val_data: &Dataset,
    init_weights: Option<&Path>,
    save_dir: Option<&Path>,
    device: &B::Device,
    rng: &mut R,
) -> crate::error::Result<TrainReport> {
    if train_data.is_empty() {
        return Err(TrainError::EmptyDataset("training split".into()));
    }
    if val_data.is_empty() {
        return Err(TrainError::EmptyDataset("validation split".into()));
    }
    let batch_size = config.batch_size.max(1);

    let mut model: GenreNet<B> = GenreNetConfig::new(config.num_classes)
        .with_input_channels(config.input_channels)
        .init(device);
    if let Some(weights) = init_weights {
        model = model
            .load_file(weights, &CompactRecorder::new(), device)
            .map_err(|e| TrainError::Checkpoint(e.to_string()))?;
        tracing::info!(weights = %weights.display(), "resumed from persisted weights");
    }
    let mut optim = AdamConfig::new().init::<B, GenreNet<B>>();
    let loss_fn = CrossEntropyLossConfig::new().init::<B>(device);
    let val_loss_fn = CrossEntropyLossConfig::new().init::<B::InnerBackend>(device);

    let batcher = SpectrogramBatcher::<B>::new(device.clone());
    let val_batcher = SpectrogramBatcher::<B::InnerBackend>::new(device.clone());

    let mut gate = CheckpointGate::new();
    let mut report = TrainReport {
        train_losses: Vec::with_capacity(config.epochs),
        val_losses: Vec::with_capacity(config.epochs),
        checkpoints: Vec::new(),
    };

    for epoch in 0..config.epochs {
        let mut order: Vec<usize> = (0..train_data.len()).collect();
        order.shuffle(rng);

        let mut train_sum = 0.0f64;
        for chunk in order.chunks(batch_size) {
            let items: Vec<&Sample> = chunk.iter().map(|&i| &train_data.samples()[i]).collect();
            let (images, targets) = batcher.batch(&items)?;

            let logits = model.forward(images);
            let loss = loss_fn.forward(logits, targets);
            train_sum += loss.clone().into_scalar().elem::<f64>();

            // Backward pass and parameter update; the step consumes the
            // gradients, leaving none to carry into the next batch.
            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(config.learning_rate, model, grads);
        }

        // Validation: forward and loss only, no updates.
        let val_model = model.valid();
        let mut val_sum = 0.0f64;
        let val_samples = val_data.samples();
        for chunk in val_samples.chunks(batch_size) {
            let items: Vec<&Sample> = chunk.iter().collect();
            let (images, targets) = val_batcher.batch(&items)?;
            let loss = val_loss_fn.forward(val_model.forward(images), targets);
            val_sum += loss.into_scalar().elem::<f64>();
        }

        let mean_train = train_sum / loss_divisor(train_data.len(), batch_size);
        let mean_val = val_sum / loss_divisor(val_data.len(), batch_size);
        tracing::info!(
            epoch,
            mean_train_loss = mean_train,
            mean_val_loss = mean_val,
            "epoch complete"
        );
        report.train_losses.push(mean_train);
        report.val_losses.push(mean_val);

        if gate.improves(mean_val) {
            if let Some(dir) = save_dir {
                let path = checkpoint_path(dir, &config.dataset_tag, epoch, mean_val);
                model
                    .clone()
                    .save_file(&path, &CompactRecorder::new())
                    .map_err(|e| TrainError::Checkpoint(e.to_string()))?;
                tracing::info!(epoch, path = %path.display(), "checkpoint written");
                report.checkpoints.push(path);
            }
        }
    }

    Ok(report)
}
