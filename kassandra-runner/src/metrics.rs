//! Forecast evaluation metrics: pure functions over actual and predicted closes.
//!
//! Both slices are aligned by index. Lengths must match; every function
//! returns 0.0 for empty input.

use serde::{Deserialize, Serialize};

/// Aggregate error metrics for one evaluation window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub rmse: f64,
    pub mae: f64,
    /// Mean absolute percentage error, in percent.
    pub mape: f64,
    /// Share of consecutive moves whose sign the predictions got right, in percent.
    pub direction_accuracy: f64,
    pub n: usize,
}

impl EvaluationMetrics {
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Self {
        assert_eq!(
            actual.len(),
            predicted.len(),
            "actual and predicted must be aligned"
        );
        Self {
            rmse: rmse(actual, predicted),
            mae: mae(actual, predicted),
            mape: mape(actual, predicted),
            direction_accuracy: direction_accuracy(actual, predicted),
            n: actual.len(),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let sse: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    (sse / actual.len() as f64).sqrt()
}

pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Mean absolute percentage error, in percent. Rows with a zero actual are
/// skipped, not divided through; an all-zero `actual` scores 0.
pub fn mape(actual: &[f64], predicted: &[f64]) -> f64 {
    let terms: Vec<f64> = actual
        .iter()
        .zip(predicted)
        .filter(|(a, _)| **a != 0.0)
        .map(|(a, p)| ((a - p) / a).abs())
        .collect();
    if terms.is_empty() {
        return 0.0;
    }
    terms.iter().sum::<f64>() / terms.len() as f64 * 100.0
}

/// Percent of steps where `actual[i+1] > actual[i]` agrees with
/// `predicted[i+1] > predicted[i]`. Flat steps count as "not up".
pub fn direction_accuracy(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() < 2 {
        return 0.0;
    }
    let steps = actual.len() - 1;
    let hits = actual
        .windows(2)
        .zip(predicted.windows(2))
        .filter(|(a, p)| (a[1] > a[0]) == (p[1] > p[0]))
        .count();
    hits as f64 / steps as f64 * 100.0
}
