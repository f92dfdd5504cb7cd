//! PriceBar: the daily market data unit that defines the trading calendar.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::series::Dated;

/// OHLCV bar for one instrument on one trading date.
///
/// Price bars are never synthesized: a date without a bar is a date on which
/// the instrument did not trade, and it is absent from the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    /// Returns true if any OHLC field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite())
    }

    /// Basic OHLC sanity check: high >= low, high >= open/close, low <= open/close, prices > 0.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

impl Dated for PriceBar {
    fn date(&self) -> NaiveDate {
        self.date
    }
}
