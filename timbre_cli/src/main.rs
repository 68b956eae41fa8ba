//! Command-line entry point: train a genre classifier or evaluate persisted
//! weights over a test manifest.
#![recursion_limit = "256"]

use std::path::PathBuf;

use anyhow::Result;
use burn::backend::wgpu::WgpuDevice;
use burn::backend::{Autodiff, Wgpu};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use timbre_train::dataset::{AugmentConfig, Dataset, PipelineConfig};
use timbre_train::labels::LabelMap;
use timbre_train::trainer::TrainConfig;
use timbre_train::{eval, trainer};

#[derive(Parser)]
#[command(name = "timbre", about = "Audio genre classification pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train from JSONL manifests, checkpointing on validation improvement.
    Train {
        #[arg(long)]
        train_manifest: PathBuf,
        #[arg(long)]
        val_manifest: PathBuf,
        /// Where checkpoints land; omit to train without persisting.
        #[arg(long)]
        save_dir: Option<PathBuf>,
        /// Resume from a previously written checkpoint instead of starting fresh.
        #[arg(long)]
        init_weights: Option<PathBuf>,
        #[arg(long, default_value_t = 50)]
        epochs: usize,
        #[arg(long, default_value_t = 16)]
        batch_size: usize,
        #[arg(long, default_value_t = 1e-3)]
        learning_rate: f64,
        /// Tag embedded in checkpoint file names.
        #[arg(long, default_value = "genres")]
        tag: String,
        /// Largest random circular time shift per training clip, in seconds.
        #[arg(long, default_value_t = 0.4)]
        max_shift_seconds: f64,
        /// Use the ten GTZAN genres instead of the five-genre custom set.
        #[arg(long)]
        gtzan: bool,
    },
    /// Evaluate persisted weights and print the confusion matrix.
    Eval {
        #[arg(long)]
        weights: PathBuf,
        #[arg(long)]
        test_manifest: PathBuf,
        #[arg(long)]
        gtzan: bool,
    },
}

fn label_map(gtzan: bool) -> LabelMap {
    if gtzan {
        LabelMap::gtzan()
    } else {
        LabelMap::five_genres()
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut rng = rand::rng();

    match cli.command {
        Command::Train {
            train_manifest,
            val_manifest,
            save_dir,
            init_weights,
            epochs,
            batch_size,
            learning_rate,
            tag,
            max_shift_seconds,
            gtzan,
        } => {
            let labels = label_map(gtzan);

            let train_pipeline = PipelineConfig {
                augment: Some(AugmentConfig { max_shift_seconds }),
                ..PipelineConfig::default()
            };
            let val_pipeline = PipelineConfig::default();

            let train_data = Dataset::load(&train_manifest, &train_pipeline, &labels, &mut rng)?;
            let val_data = Dataset::load(&val_manifest, &val_pipeline, &labels, &mut rng)?;

            let config = TrainConfig::new(labels.len(), tag)
                .with_batch_size(batch_size)
                .with_learning_rate(learning_rate)
                .with_epochs(epochs);

            let device = WgpuDevice::default();
            let report = trainer::train::<Autodiff<Wgpu>, _>(
                &config,
                &train_data,
                &val_data,
                init_weights.as_deref(),
                save_dir.as_deref(),
                &device,
                &mut rng,
            )?;

            if let Some(best) = report
                .val_losses
                .iter()
                .cloned()
                .fold(None::<f64>, |acc, l| Some(acc.map_or(l, |a| a.min(l))))
            {
                tracing::info!(
                    best_val_loss = best,
                    checkpoints = report.checkpoints.len(),
                    "training finished"
                );
            }
        }
        Command::Eval {
            weights,
            test_manifest,
            gtzan,
        } => {
            let labels = label_map(gtzan);
            let test_data =
                Dataset::load(&test_manifest, &PipelineConfig::default(), &labels, &mut rng)?;

            let device = WgpuDevice::default();
            let matrix = eval::evaluate::<Wgpu>(&weights, &test_data, &labels, &device)?;
            println!("{matrix}");
            println!("accuracy: {:.3}", matrix.accuracy());
        }
    }

    Ok(())
}
