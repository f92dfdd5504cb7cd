//! Seeded synthetic price collector for offline runs.
//!
//! A random walk over weekdays, starting at 100.0 on a fixed anchor date so
//! that the bar for any given date is the same regardless of the requested
//! range. Same seed and ticker always yield the same series.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{PriceSource, SourceError};
use crate::domain::{DailySeries, PriceBar};

fn anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, 4).expect("anchor date must be valid")
}

#[derive(Debug, Clone)]
pub struct SyntheticPriceSource {
    seed: u64,
}

impl SyntheticPriceSource {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Per-ticker RNG seed, derived by hashing so tickers are independent.
    fn ticker_seed(&self, ticker: &str) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(ticker.as_bytes());
        *hasher.finalize().as_bytes()
    }

    pub fn generate(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Vec<PriceBar> {
        let mut rng = StdRng::from_seed(self.ticker_seed(ticker));
        let mut bars = Vec::new();
        let mut price = 100.0_f64;
        let mut current = start.min(anchor());

        while current <= end {
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                current += Duration::days(1);
                continue;
            }

            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64);

            if current >= start {
                bars.push(PriceBar {
                    date: current,
                    open,
                    high,
                    low,
                    close,
                    volume,
                });
            }

            price = close;
            current += Duration::days(1);
        }

        bars
    }
}

impl PriceSource for SyntheticPriceSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn get_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailySeries<PriceBar>, SourceError> {
        DailySeries::new(self.generate(ticker, start, end)).map_err(|error| SourceError::Series {
            source_name: self.name().to_string(),
            error,
        })
    }
}
