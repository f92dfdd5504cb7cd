//! Domain types for Kassandra

pub mod bar;
pub mod sentiment;
pub mod series;
pub mod trend;

pub use bar::PriceBar;
pub use sentiment::{aggregate_daily, ScoredItem, SentimentAggregate, SentimentField};
pub use series::{DailySeries, Dated, SeriesError};
pub use trend::{normalize_search_volume, RawSearchVolume, TrendScore};
