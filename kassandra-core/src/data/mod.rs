//! Collectors: where daily series come from.

pub mod csv;
pub mod provider;
pub mod synthetic;

pub use self::csv::{
    CsvPriceSource, CsvSentimentSource, CsvTrendSource, SentimentCsvFormat, TrendCsvFormat,
};
pub use provider::{InMemorySource, PriceSource, SentimentSource, SourceError, TrendSource};
pub use synthetic::SyntheticPriceSource;
