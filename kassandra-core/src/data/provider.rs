//! Collector traits and structured source errors.
//!
//! Collectors abstract over where daily series come from (CSV files, an
//! in-memory fixture, a synthetic generator) so the pipeline never knows.
//! Each returns a validated [`DailySeries`] restricted to `[start, end]`.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{DailySeries, Dated, PriceBar, SentimentAggregate, SeriesError, TrendScore};

/// Errors from collectors.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("malformed record in {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("invalid series from {source_name}: {error}")]
    Series {
        source_name: String,
        error: SeriesError,
    },

    #[error("no data for ticker '{ticker}'")]
    TickerNotFound { ticker: String },

    #[error("source unavailable: {0}")]
    Unavailable(String),
}

pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;

    fn get_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailySeries<PriceBar>, SourceError>;
}

pub trait SentimentSource: Send + Sync {
    fn name(&self) -> &str;

    fn get_sentiment(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailySeries<SentimentAggregate>, SourceError>;
}

pub trait TrendSource: Send + Sync {
    fn name(&self) -> &str;

    fn get_trend(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailySeries<TrendScore>, SourceError>;
}

/// A fixed series served for any ticker. Useful for fixtures and replay.
#[derive(Debug, Clone)]
pub struct InMemorySource<T: Dated + Clone> {
    name: String,
    series: DailySeries<T>,
}

impl<T: Dated + Clone> InMemorySource<T> {
    pub fn new(name: impl Into<String>, series: DailySeries<T>) -> Self {
        Self {
            name: name.into(),
            series,
        }
    }
}

impl PriceSource for InMemorySource<PriceBar> {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_prices(
        &self,
        _ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailySeries<PriceBar>, SourceError> {
        Ok(self.series.range(start, end))
    }
}

impl SentimentSource for InMemorySource<SentimentAggregate> {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_sentiment(
        &self,
        _ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailySeries<SentimentAggregate>, SourceError> {
        Ok(self.series.range(start, end))
    }
}

impl TrendSource for InMemorySource<TrendScore> {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_trend(
        &self,
        _ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailySeries<TrendScore>, SourceError> {
        Ok(self.series.range(start, end))
    }
}
