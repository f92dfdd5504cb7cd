//! Indicator calculator: config to indicator set to frame columns.

use super::config::IndicatorConfig;
use super::fill::fill_derived;
use super::frame::FrameColumn;
use super::schema::ColumnKind;
use crate::domain::PriceBar;
use crate::indicators::{DailyReturn, Indicator, Macd, RollingStd, Rsi, Sma, Volatility};

/// The configured indicators, in canonical column order.
pub fn indicator_set(config: &IndicatorConfig) -> Vec<Box<dyn Indicator>> {
    let mut set: Vec<Box<dyn Indicator>> = Vec::new();
    for &w in &config.sma_windows {
        set.push(Box::new(Sma::new(w)));
    }
    set.push(Box::new(Rsi::with_smoothing(
        config.rsi_period,
        config.rsi_smoothing,
    )));
    set.push(Box::new(Macd::line(
        config.macd_fast,
        config.macd_slow,
        config.macd_signal,
    )));
    set.push(Box::new(Macd::signal(
        config.macd_fast,
        config.macd_slow,
        config.macd_signal,
    )));
    set.push(Box::new(Volatility::new(config.volatility_window)));
    set.push(Box::new(DailyReturn));
    for &w in &config.rolling_windows {
        set.push(Box::new(Sma::rolling_mean(w)));
        set.push(Box::new(RollingStd::new(w)));
    }
    set
}

/// Compute every configured indicator over `bars` and neutral-fill warmups.
///
/// Each defined cell at row t depends on bars up to t, so its observation
/// index is t.
pub fn compute_indicators(bars: &[PriceBar], config: &IndicatorConfig) -> Vec<FrameColumn> {
    indicator_set(config)
        .iter()
        .map(|ind| {
            let values = ind.compute(bars);
            debug_assert_eq!(values.len(), bars.len(), "{} length", ind.name());
            let observed_at = (0..values.len()).map(Some).collect();
            fill_derived(ind.name(), ColumnKind::Indicator, values, observed_at)
        })
        .collect()
}
