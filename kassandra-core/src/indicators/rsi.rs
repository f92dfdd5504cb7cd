//! Relative Strength Index (RSI).
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss), over the trailing `period`
//! close-to-close changes. Lookback: period.
//! Zero-loss rule: avg_loss == 0 → RSI = 100 exactly, whatever the gains.

use serde::{Deserialize, Serialize};

use super::{closes, Indicator};
use crate::domain::PriceBar;

/// How average gain and loss are carried across bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiSmoothing {
    /// Plain mean of the trailing window.
    #[default]
    Simple,
    /// Wilder's recursive smoothing seeded with the first window mean.
    Wilder,
}

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    smoothing: RsiSmoothing,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self::with_smoothing(period, RsiSmoothing::Simple)
    }

    pub fn with_smoothing(period: usize, smoothing: RsiSmoothing) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            smoothing,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let closes = closes(bars);
        let n = closes.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period + 1 {
            return result;
        }

        // changes[i] = close[i] - close[i-1]; changes[0] is undefined
        let mut changes = vec![f64::NAN; n];
        for i in 1..n {
            changes[i] = closes[i] - closes[i - 1];
        }

        match self.smoothing {
            RsiSmoothing::Simple => {
                for i in self.period..n {
                    let window = &changes[(i + 1 - self.period)..=i];
                    if window.iter().any(|c| c.is_nan()) {
                        continue;
                    }
                    let (gain, loss) = split_gain_loss(window);
                    result[i] = compute_rsi(
                        gain / self.period as f64,
                        loss / self.period as f64,
                    );
                }
            }
            RsiSmoothing::Wilder => {
                let seed = &changes[1..=self.period];
                if seed.iter().any(|c| c.is_nan()) {
                    return result;
                }
                let (gain, loss) = split_gain_loss(seed);
                let mut avg_gain = gain / self.period as f64;
                let mut avg_loss = loss / self.period as f64;
                result[self.period] = compute_rsi(avg_gain, avg_loss);

                let alpha = 1.0 / self.period as f64;
                for i in (self.period + 1)..n {
                    if changes[i].is_nan() {
                        return result;
                    }
                    let gain = changes[i].max(0.0);
                    let loss = (-changes[i]).max(0.0);
                    avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
                    avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;
                    result[i] = compute_rsi(avg_gain, avg_loss);
                }
            }
        }

        result
    }
}

/// Sum of positive changes and sum of absolute negative changes.
fn split_gain_loss(changes: &[f64]) -> (f64, f64) {
    changes.iter().fold((0.0, 0.0), |(g, l), &c| {
        if c > 0.0 {
            (g + c, l)
        } else {
            (g, l - c)
        }
    })
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn rsi_all_gains_is_exactly_100() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_eq!(result[3], 100.0);
        assert_eq!(result[5], 100.0);
    }

    #[test]
    fn rsi_flat_window_is_100() {
        let bars = make_bars(&[50.0; 6]);
        let result = Rsi::new(3).compute(&bars);
        assert_eq!(result[4], 100.0);
    }

    #[test]
    fn rsi_all_losses() {
        let bars = make_bars(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_approx(result[3], 0.0, 1e-9);
    }

    #[test]
    fn rsi_mixed_window() {
        // Changes: +0.34, -0.25, -0.48, +0.72
        // Window at 3: gains 0.34, losses 0.73 → 100 - 100/(1 + 0.34/0.73)
        let bars = make_bars(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = Rsi::new(3).compute(&bars);
        assert!(result[0].is_nan());
        assert!(result[2].is_nan());
        let expected = 100.0 - 100.0 / (1.0 + 0.34 / 0.73);
        assert_approx(result[3], expected, 1e-6);
        // Window at 4: gains 0.72, losses 0.73
        let expected = 100.0 - 100.0 / (1.0 + 0.72 / 0.73);
        assert_approx(result[4], expected, 1e-6);
    }

    #[test]
    fn rsi_bounds() {
        let bars = make_bars(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        for smoothing in [RsiSmoothing::Simple, RsiSmoothing::Wilder] {
            let result = Rsi::with_smoothing(3, smoothing).compute(&bars);
            for (i, &v) in result.iter().enumerate() {
                if !v.is_nan() {
                    assert!((0.0..=100.0).contains(&v), "RSI out of bounds at bar {i}: {v}");
                }
            }
        }
    }

    #[test]
    fn wilder_zero_loss_is_100() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let result = Rsi::with_smoothing(2, RsiSmoothing::Wilder).compute(&bars);
        assert_eq!(result[2], 100.0);
        assert_eq!(result[4], 100.0);
    }

    #[test]
    fn rsi_too_few_bars() {
        let bars = make_bars(&[100.0, 102.0, 101.0, 105.0]);
        assert!(Rsi::new(14).compute(&bars).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::new(14).lookback(), 14);
        assert_eq!(Rsi::new(14).name(), "rsi_14");
    }
}
