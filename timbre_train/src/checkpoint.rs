//! Best-validation-loss tracking and checkpoint naming.

use std::path::{Path, PathBuf};

/// Tracks the lowest validation loss seen so far. A checkpoint is written
/// only when an epoch sets a new strict minimum.
#[derive(Debug)]
pub struct CheckpointGate {
    best: f64,
}

impl CheckpointGate {
    pub fn new() -> Self {
        Self { best: f64::INFINITY }
    }

    pub fn best(&self) -> f64 {
        self.best
    }

    /// Returns true and records `val_loss` when it is strictly below the best
    /// seen so far.
    pub fn improves(&mut self, val_loss: f64) -> bool {
        if val_loss < self.best {
            self.best = val_loss;
            true
        } else {
            false
        }
    }
}

impl Default for CheckpointGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Checkpoint file stem carrying the epoch index and validation loss; the
/// recorder appends its own extension.
pub fn checkpoint_path(dir: &Path, tag: &str, epoch: usize, val_loss: f64) -> PathBuf {
    dir.join(format!("weights_{tag}_Ep{epoch}_loss{val_loss}"))
}
