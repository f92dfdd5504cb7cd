//! Feature configuration: indicator windows and the sentiment lag policy.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::indicators::RsiSmoothing;

/// Everything that determines the feature schema.
///
/// Two runs with equal configs produce identical schemas, which is what lets
/// a trained estimator accept live rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub indicators: IndicatorConfig,
    pub lags: LagConfig,
}

impl FeatureConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.indicators.validate()?;
        self.lags.validate()
    }
}

/// Technical indicator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub sma_windows: Vec<usize>,
    pub rsi_period: usize,
    pub rsi_smoothing: RsiSmoothing,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub volatility_window: usize,
    /// Windows for rolling close mean/std features. Empty disables them.
    pub rolling_windows: Vec<usize>,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_windows: vec![5, 20],
            rsi_period: 14,
            rsi_smoothing: RsiSmoothing::Simple,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            volatility_window: 20,
            rolling_windows: vec![3, 7, 14],
        }
    }
}

impl IndicatorConfig {
    fn validate(&self) -> Result<(), PipelineError> {
        if self.sma_windows.iter().any(|&w| w == 0) {
            return Err(invalid("SMA windows must be >= 1"));
        }
        if has_duplicates(&self.sma_windows) {
            return Err(invalid("SMA windows must be distinct"));
        }
        if self.rsi_period == 0 {
            return Err(invalid("RSI period must be >= 1"));
        }
        if self.macd_fast == 0 || self.macd_signal == 0 || self.macd_fast >= self.macd_slow {
            return Err(invalid("MACD requires 1 <= fast < slow and signal >= 1"));
        }
        if self.volatility_window < 2 {
            return Err(invalid("volatility window must be >= 2"));
        }
        if self.rolling_windows.iter().any(|&w| w < 2) {
            return Err(invalid("rolling windows must be >= 2"));
        }
        if has_duplicates(&self.rolling_windows) {
            return Err(invalid("rolling windows must be distinct"));
        }
        Ok(())
    }
}

/// Which trailing copies of sentiment/trend columns become features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LagConfig {
    /// Lags in trading dates. Each must be >= 1.
    pub lags: Vec<usize>,
    /// Include the same-day aggregate as a feature. Off by default: same-day
    /// sentiment can reflect that day's price action and is not fully
    /// observable at inference time.
    pub include_same_day: bool,
}

impl Default for LagConfig {
    fn default() -> Self {
        Self {
            lags: vec![1, 2, 3],
            include_same_day: false,
        }
    }
}

impl LagConfig {
    /// Lags in ascending order.
    pub fn sorted_lags(&self) -> Vec<usize> {
        let mut lags = self.lags.clone();
        lags.sort_unstable();
        lags
    }

    fn validate(&self) -> Result<(), PipelineError> {
        if self.lags.iter().any(|&k| k == 0) {
            return Err(invalid(
                "lag 0 is the same-day value; use include_same_day instead",
            ));
        }
        if has_duplicates(&self.lags) {
            return Err(invalid("lags must be distinct"));
        }
        Ok(())
    }
}

fn has_duplicates(values: &[usize]) -> bool {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).any(|w| w[0] == w[1])
}

fn invalid(msg: &str) -> PipelineError {
    PipelineError::InvalidConfig(msg.to_string())
}
