//! Moving Average Convergence Divergence (MACD).
//!
//! line   = EMA(fast) - EMA(slow) of closes
//! signal = EMA(signal) of the line
//! Lookback: slow - 1 for the line, slow + signal - 2 for the signal.
//!
//! Exposed as two named instances (one per output) so the single-series
//! `Indicator` trait stays unchanged.

use super::{closes, ema_of_series, Indicator};
use crate::domain::PriceBar;

/// Which MACD output an instance produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Line,
    Signal,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    output: MacdLine,
    name: String,
}

impl Macd {
    pub fn line(fast: usize, slow: usize, signal: usize) -> Self {
        Self::new(fast, slow, signal, MacdLine::Line)
    }

    pub fn signal(fast: usize, slow: usize, signal: usize) -> Self {
        Self::new(fast, slow, signal, MacdLine::Signal)
    }

    fn new(fast: usize, slow: usize, signal: usize, output: MacdLine) -> Self {
        assert!(fast >= 1 && signal >= 1, "MACD periods must be >= 1");
        assert!(fast < slow, "MACD fast period must be shorter than slow period");
        let name = match output {
            MacdLine::Line => "macd".to_string(),
            MacdLine::Signal => "macd_signal".to_string(),
        };
        Self {
            fast,
            slow,
            signal,
            output,
            name,
        }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.output {
            MacdLine::Line => self.slow - 1,
            MacdLine::Signal => self.slow + self.signal - 2,
        }
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let closes = closes(bars);
        let fast = ema_of_series(&closes, self.fast);
        let slow = ema_of_series(&closes, self.slow);
        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        match self.output {
            MacdLine::Line => line,
            MacdLine::Signal => ema_of_series(&line, self.signal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn constant_prices_have_zero_macd() {
        let bars = make_bars(&[50.0; 40]);
        let line = Macd::line(12, 26, 9).compute(&bars);
        let signal = Macd::signal(12, 26, 9).compute(&bars);
        assert!(line[24].is_nan());
        assert_approx(line[25], 0.0, DEFAULT_EPSILON);
        assert!(signal[32].is_nan());
        assert_approx(signal[33], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn small_periods_known_values() {
        // fast=1 → EMA = close; slow=2 → alpha 2/3, seed at 1 = mean(c0,c1)
        // closes 10, 12, 15: slow[1] = 11, slow[2] = 2/3*15 + 1/3*11 = 13.666..
        let bars = make_bars(&[10.0, 12.0, 15.0]);
        let line = Macd::line(1, 2, 1).compute(&bars);
        assert!(line[0].is_nan());
        assert_approx(line[1], 1.0, DEFAULT_EPSILON);
        assert_approx(line[2], 15.0 - (2.0 / 3.0 * 15.0 + 11.0 / 3.0), DEFAULT_EPSILON);
        // signal period 1 is the line itself
        let signal = Macd::signal(1, 2, 1).compute(&bars);
        assert_approx(signal[2], line[2], DEFAULT_EPSILON);
    }

    #[test]
    fn rising_prices_have_positive_macd() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let line = Macd::line(12, 26, 9).compute(&make_bars(&closes));
        assert!(line[59] > 0.0);
    }

    #[test]
    fn lookbacks_and_names() {
        assert_eq!(Macd::line(12, 26, 9).lookback(), 25);
        assert_eq!(Macd::signal(12, 26, 9).lookback(), 33);
        assert_eq!(Macd::line(12, 26, 9).name(), "macd");
        assert_eq!(Macd::signal(12, 26, 9).name(), "macd_signal");
    }
}
