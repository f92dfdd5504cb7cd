//! Daily return and realized volatility.
//!
//! return[t]     = close[t] / close[t-1] - 1 (lookback 1)
//! volatility[t] = sample std of the trailing `period` returns (lookback period)

use super::rolling::rolling_std;
use super::{closes, Indicator};
use crate::domain::PriceBar;

/// Simple close-to-close returns. Undefined at index 0 and where the previous close is 0.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    let mut result = vec![f64::NAN; closes.len()];
    for i in 1..closes.len() {
        let prev = closes[i - 1];
        if prev != 0.0 {
            result[i] = closes[i] / prev - 1.0;
        }
    }
    result
}

#[derive(Debug, Clone, Default)]
pub struct DailyReturn;

impl Indicator for DailyReturn {
    fn name(&self) -> &str {
        "daily_return"
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        daily_returns(&closes(bars))
    }
}

/// Realized volatility: rolling standard deviation of daily returns.
#[derive(Debug, Clone)]
pub struct Volatility {
    period: usize,
    name: String,
}

impl Volatility {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "volatility period must be >= 2");
        Self {
            period,
            name: format!("volatility_{period}"),
        }
    }
}

impl Indicator for Volatility {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        rolling_std(&daily_returns(&closes(bars)), self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn returns_basic() {
        let r = DailyReturn.compute(&make_bars(&[100.0, 102.0, 101.0, 105.0]));
        assert!(r[0].is_nan());
        assert_approx(r[1], 0.02, DEFAULT_EPSILON);
        assert_approx(r[2], 101.0 / 102.0 - 1.0, DEFAULT_EPSILON);
        assert_approx(r[3], 105.0 / 101.0 - 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn zero_previous_close_is_undefined() {
        let r = daily_returns(&[0.0, 1.0]);
        assert!(r[1].is_nan());
    }

    #[test]
    fn volatility_first_defined_after_period_returns() {
        let bars = make_bars(&[100.0, 101.0, 100.0, 101.0, 100.0]);
        let v = Volatility::new(3).compute(&bars);
        assert!(v[2].is_nan());
        assert!(v[3].is_finite());
        assert!(v[3] > 0.0);
    }

    #[test]
    fn constant_growth_has_zero_volatility() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let v = Volatility::new(4).compute(&make_bars(&closes));
        assert_approx(v[9], 0.0, 1e-9);
    }

    #[test]
    fn lookbacks() {
        assert_eq!(DailyReturn.lookback(), 1);
        assert_eq!(Volatility::new(20).lookback(), 20);
        assert_eq!(Volatility::new(20).name(), "volatility_20");
    }
}
