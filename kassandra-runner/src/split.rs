//! Chronological train/test split.
//!
//! The test set is the last `ceil(n * test_size)` rows. Rows are never
//! shuffled: every test date is strictly after every train date.

use thiserror::Error;

use kassandra_core::Dataset;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitError {
    #[error("test_size must be in (0, 1), got {0}")]
    InvalidFraction(f64),

    #[error("{rows} rows cannot be split with test_size {test_size}: both sides need at least one row")]
    TooFewRows { rows: usize, test_size: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub train: Dataset,
    pub test: Dataset,
}

/// Number of trailing rows held out.
pub fn test_rows(n: usize, test_size: f64) -> usize {
    (n as f64 * test_size).ceil() as usize
}

pub fn chronological_split(dataset: &Dataset, test_size: f64) -> Result<TrainTestSplit, SplitError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(SplitError::InvalidFraction(test_size));
    }
    let n = dataset.len();
    let n_test = test_rows(n, test_size);
    if n_test == 0 || n_test >= n {
        return Err(SplitError::TooFewRows {
            rows: n,
            test_size,
        });
    }
    let cut = n - n_test;
    Ok(TrainTestSplit {
        train: dataset.slice(0..cut),
        test: dataset.slice(cut..n),
    })
}
