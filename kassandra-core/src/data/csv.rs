//! CSV-file collectors.
//!
//! Each collector is configured with a path template; `{ticker}` is replaced
//! with the requested ticker (e.g. `data/{ticker}_prices.csv`). Files carry a
//! header row and ISO dates (`YYYY-MM-DD`).

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::provider::{PriceSource, SentimentSource, SourceError, TrendSource};
use crate::domain::{
    aggregate_daily, normalize_search_volume, DailySeries, Dated, PriceBar, RawSearchVolume,
    ScoredItem, SentimentAggregate, TrendScore,
};

fn resolve(template: &str, ticker: &str) -> PathBuf {
    PathBuf::from(template.replace("{ticker}", ticker))
}

fn read_rows<R: DeserializeOwned>(path: &PathBuf) -> Result<Vec<R>, SourceError> {
    let shown = path.display().to_string();
    let mut reader = ::csv::ReaderBuilder::new()
        .trim(::csv::Trim::All)
        .from_path(path)
        .map_err(|e| SourceError::Io {
            path: shown.clone(),
            reason: e.to_string(),
        })?;

    let mut rows = Vec::new();
    for (i, result) in reader.deserialize().enumerate() {
        let row: R = result.map_err(|e| SourceError::Malformed {
            path: shown.clone(),
            reason: format!("row {}: {e}", i + 1),
        })?;
        rows.push(row);
    }
    debug!(path = %shown, rows = rows.len(), "read csv");
    Ok(rows)
}

fn into_series<T: Dated + Clone>(
    name: &str,
    rows: Vec<T>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<DailySeries<T>, SourceError> {
    let series = DailySeries::from_unsorted(rows).map_err(|error| SourceError::Series {
        source_name: name.to_string(),
        error,
    })?;
    Ok(series.range(start, end))
}

/// Daily OHLCV bars: `date,open,high,low,close,volume`.
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    template: String,
}

impl CsvPriceSource {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl PriceSource for CsvPriceSource {
    fn name(&self) -> &str {
        "csv-prices"
    }

    fn get_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailySeries<PriceBar>, SourceError> {
        let rows: Vec<PriceBar> = read_rows(&resolve(&self.template, ticker))?;
        into_series(self.name(), rows, start, end)
    }
}

/// Layout of a sentiment CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentCsvFormat {
    /// One pre-aggregated row per date, columns named after the aggregate
    /// fields. Missing columns default to 0.
    #[default]
    Daily,
    /// One row per scored item: `date,compound[,engagement]`. Aggregated here.
    Items,
}

#[derive(Debug, Clone)]
pub struct CsvSentimentSource {
    template: String,
    format: SentimentCsvFormat,
    name: String,
}

impl CsvSentimentSource {
    pub fn new(name: impl Into<String>, template: impl Into<String>, format: SentimentCsvFormat) -> Self {
        Self {
            template: template.into(),
            format,
            name: name.into(),
        }
    }
}

impl SentimentSource for CsvSentimentSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_sentiment(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailySeries<SentimentAggregate>, SourceError> {
        let path = resolve(&self.template, ticker);
        let rows: Vec<SentimentAggregate> = match self.format {
            SentimentCsvFormat::Daily => read_rows(&path)?,
            SentimentCsvFormat::Items => {
                let items: Vec<ScoredItem> = read_rows(&path)?;
                aggregate_daily(&items)
                    .map_err(|error| SourceError::Series {
                        source_name: self.name.clone(),
                        error,
                    })?
                    .into()
            }
        };
        into_series(&self.name, rows, start, end)
    }
}

/// Layout of a trends CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendCsvFormat {
    /// `date,search_interest` already in [0, 1].
    #[default]
    Scores,
    /// `date,volume` raw counts, normalized by the maximum within the
    /// requested range.
    RawVolume,
}

#[derive(Debug, Clone)]
pub struct CsvTrendSource {
    template: String,
    format: TrendCsvFormat,
}

impl CsvTrendSource {
    pub fn new(template: impl Into<String>, format: TrendCsvFormat) -> Self {
        Self {
            template: template.into(),
            format,
        }
    }
}

impl TrendSource for CsvTrendSource {
    fn name(&self) -> &str {
        "csv-trends"
    }

    fn get_trend(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailySeries<TrendScore>, SourceError> {
        let path = resolve(&self.template, ticker);
        match self.format {
            TrendCsvFormat::Scores => {
                let rows: Vec<TrendScore> = read_rows(&path)?;
                into_series(self.name(), rows, start, end)
            }
            TrendCsvFormat::RawVolume => {
                let raw: Vec<RawSearchVolume> = read_rows(&path)?;
                let in_range: Vec<RawSearchVolume> = raw
                    .into_iter()
                    .filter(|r| r.date >= start && r.date <= end)
                    .collect();
                normalize_search_volume(&in_range).map_err(|error| SourceError::Series {
                    source_name: self.name().to_string(),
                    error,
                })
            }
        }
    }
}
