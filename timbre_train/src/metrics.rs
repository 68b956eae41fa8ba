//! Confusion-matrix accumulation for evaluation runs.

use std::fmt;

use crate::error::{Result, TrainError};

/// A true-label x predicted-label count grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: Vec<Vec<u64>>,
}

impl ConfusionMatrix {
    pub fn new(num_classes: usize) -> Self {
        Self {
            counts: vec![vec![0; num_classes]; num_classes],
        }
    }

    pub fn num_classes(&self) -> usize {
        self.counts.len()
    }

    pub fn record(&mut self, truth: usize, predicted: usize) -> Result<()> {
        let n = self.num_classes();
        for label in [truth, predicted] {
            if label >= n {
                return Err(TrainError::LabelOutOfRange {
                    label,
                    num_classes: n,
                });
            }
        }
        self.counts[truth][predicted] += 1;
        Ok(())
    }

    pub fn count(&self, truth: usize, predicted: usize) -> u64 {
        self.counts[truth][predicted]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> u64 {
        (0..self.num_classes()).map(|i| self.counts[i][i]).sum()
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.correct() as f64 / total as f64
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    /// Rows are true labels, columns predictions.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "true\\pred")?;
        for p in 0..self.num_classes() {
            write!(f, " {p:>6}")?;
        }
        writeln!(f)?;
        for (truth, row) in self.counts.iter().enumerate() {
            write!(f, "{truth:>9}")?;
            for count in row {
                write!(f, " {count:>6}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_sample_scenario() {
        // Truths [0, 1, 2] against predictions [0, 1, 1].
        let mut m = ConfusionMatrix::new(5);
        m.record(0, 0).unwrap();
        m.record(1, 1).unwrap();
        m.record(2, 1).unwrap();

        assert_eq!(m.count(0, 0), 1);
        assert_eq!(m.count(1, 1), 1);
        assert_eq!(m.count(2, 1), 1);
        for truth in 0..5 {
            for pred in 0..5 {
                if !matches!((truth, pred), (0, 0) | (1, 1) | (2, 1)) {
                    assert_eq!(m.count(truth, pred), 0);
                }
            }
        }
        assert_eq!(m.total(), 3);
        assert_eq!(m.correct(), 2);
        approx::assert_relative_eq!(m.accuracy(), 2.0 / 3.0);
    }

    #[test]
    fn out_of_range_labels_are_rejected() {
        let mut m = ConfusionMatrix::new(5);
        assert!(m.record(5, 0).is_err());
        assert!(m.record(0, 7).is_err());
        assert_eq!(m.total(), 0);
    }

    #[test]
    fn empty_matrix_accuracy_is_zero() {
        let m = ConfusionMatrix::new(3);
        assert_eq!(m.accuracy(), 0.0);
    }
}
