use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for training and evaluation.
pub type Result<T> = std::result::Result<T, TrainError>;

/// Errors produced while building datasets, training and evaluating.
#[derive(Error, Debug)]
pub enum TrainError {
    /// Every spectrogram in a batch must share one shape.
    #[error("batch items have inconsistent spectrogram shapes: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: [usize; 3],
        actual: [usize; 3],
    },

    #[error("no weights file at {path}")]
    MissingWeights { path: PathBuf },

    #[error("label {label} out of range for {num_classes} classes")]
    LabelOutOfRange { label: usize, num_classes: usize },

    #[error("manifest parse error at line {line}: {source}")]
    Manifest {
        line: usize,
        source: serde_json::Error,
    },

    #[error("dataset is empty: {0}")]
    EmptyDataset(String),

    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    #[error("tensor data error: {0}")]
    TensorData(String),

    #[error(transparent)]
    Audio(#[from] timbre_core::TimbreError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
