//! Rolling sample standard deviation.

use super::{closes, Indicator};
use crate::domain::PriceBar;

/// Trailing sample standard deviation (n - 1 denominator) over `period` entries.
///
/// Windows containing NaN are NaN. A period of 1 has no sample variance and
/// is NaN throughout.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period < 2 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = window.iter().sum::<f64>() / period as f64;
        let ss: f64 = window.iter().map(|v| (v - mean).powi(2)).sum();
        result[i] = (ss / (period as f64 - 1.0)).sqrt();
    }

    result
}

/// Rolling standard deviation of closes.
#[derive(Debug, Clone)]
pub struct RollingStd {
    period: usize,
    name: String,
}

impl RollingStd {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "rolling std period must be >= 2");
        Self {
            period,
            name: format!("close_rolling_std_{period}"),
        }
    }
}

impl Indicator for RollingStd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        rolling_std(&closes(bars), self.period)
    }
}
