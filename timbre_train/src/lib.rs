//! Genre-classifier training: dataset loading and batching, a small
//! convolutional model, the supervised training loop with best-validation
//! checkpointing, and the standalone evaluation routine.

pub mod batch;
pub mod checkpoint;
pub mod dataset;
pub mod error;
pub mod eval;
pub mod labels;
pub mod metrics;
pub mod model;
pub mod trainer;

pub use error::{Result, TrainError};
pub use labels::LabelMap;
