//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a trailing window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::{closes, Indicator};
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    /// Rolling close mean, named as a rolling-window feature.
    pub fn rolling_mean(period: usize) -> Self {
        Self {
            name: format!("close_rolling_mean_{period}"),
            ..Self::new(period)
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        rolling_mean(&closes(bars), self.period)
    }
}

/// Trailing mean of `values` over `period` entries. Windows containing NaN are NaN.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    // Each window is summed from scratch so a NaN never poisons later windows.
    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = window.iter().sum::<f64>() / period as f64;
    }

    result
}
