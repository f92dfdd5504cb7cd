//! Technical indicators computed from the price series.
//!
//! Every indicator is a pure function of the bar history: bars in, one value
//! per bar out. Warmup values are `f64::NAN`; the missing-data policy turns
//! them into neutral fills later, so nothing here substitutes defaults.
//!
//! # Look-ahead contamination guard
//! No indicator value at bar t may depend on price data from bar t+1 or later.
//! Every indicator must pass the truncated-vs-full series test.

pub mod ema;
pub mod macd;
pub mod returns;
pub mod rolling;
pub mod rsi;
pub mod sma;

pub use ema::ema_of_series;
pub use macd::{Macd, MacdLine};
pub use returns::{daily_returns, DailyReturn, Volatility};
pub use rolling::{rolling_std, RollingStd};
pub use rsi::{Rsi, RsiSmoothing};
pub use sma::{rolling_mean, Sma};

use crate::domain::PriceBar;

/// A single-series indicator over daily bars.
pub trait Indicator: Send + Sync {
    /// Column name (e.g. "sma_20", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading bars that are undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    ///
    /// Returns a `Vec<f64>` of the same length as `bars`; the first
    /// `lookback()` values are `f64::NAN`.
    fn compute(&self, bars: &[PriceBar]) -> Vec<f64>;
}

/// Extract closes from bars.
pub(crate) fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Create synthetic bars from close prices for testing.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
