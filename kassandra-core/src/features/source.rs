//! Pipeline inputs and per-source provenance.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{DailySeries, Dated, PriceBar, SentimentAggregate, SentimentField, TrendScore};

/// A secondary (non-price) signal feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    News,
    Reddit,
    Trends,
}

impl SignalSource {
    /// Canonical source order used by schemas and frames.
    pub const ALL: [SignalSource; 3] = [SignalSource::News, SignalSource::Reddit, SignalSource::Trends];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalSource::News => "news",
            SignalSource::Reddit => "reddit",
            SignalSource::Trends => "trends",
        }
    }

    /// Same-day column names this source contributes, in field order.
    pub fn base_columns(&self) -> Vec<String> {
        match self {
            SignalSource::News => sentiment_columns("news", SentimentField::NEWS),
            SignalSource::Reddit => sentiment_columns("reddit", SentimentField::REDDIT),
            SignalSource::Trends => vec!["trend_search_interest".to_string()],
        }
    }
}

impl std::fmt::Display for SignalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn sentiment_columns(prefix: &str, fields: &[SentimentField]) -> Vec<String> {
    fields
        .iter()
        .map(|f| format!("{prefix}_{}", f.as_str()))
        .collect()
}

/// A secondary feed as handed to the pipeline.
///
/// `Unavailable` means the collector could not produce data at all (network
/// down, missing credentials). The pipeline neutral-fills it and records the
/// reason; it is never fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceFeed<T: Dated + Clone> {
    Observed(DailySeries<T>),
    Unavailable { reason: String },
}

impl<T: Dated + Clone> SourceFeed<T> {
    pub fn empty() -> Self {
        SourceFeed::Observed(DailySeries::empty())
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        SourceFeed::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn series(&self) -> Option<&DailySeries<T>> {
        match self {
            SourceFeed::Observed(s) => Some(s),
            SourceFeed::Unavailable { .. } => None,
        }
    }

    /// Drop every record dated after `as_of`.
    pub fn truncate_after(&self, as_of: NaiveDate) -> Self {
        match self {
            SourceFeed::Observed(s) => SourceFeed::Observed(s.truncate_after(as_of)),
            SourceFeed::Unavailable { reason } => SourceFeed::unavailable(reason.clone()),
        }
    }
}

impl<T: Dated + Clone> Default for SourceFeed<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Dated + Clone> From<DailySeries<T>> for SourceFeed<T> {
    fn from(series: DailySeries<T>) -> Self {
        SourceFeed::Observed(series)
    }
}

/// All raw inputs for one ticker.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceInputs {
    pub prices: DailySeries<PriceBar>,
    pub news: SourceFeed<SentimentAggregate>,
    pub reddit: SourceFeed<SentimentAggregate>,
    pub trends: SourceFeed<TrendScore>,
}

impl SourceInputs {
    /// Inputs with price history only; every secondary feed is empty.
    pub fn prices_only(prices: DailySeries<PriceBar>) -> Self {
        Self {
            prices,
            ..Self::default()
        }
    }

    /// The same inputs restricted to records dated on or before `as_of`.
    pub fn truncate_after(&self, as_of: NaiveDate) -> Self {
        Self {
            prices: self.prices.truncate_after(as_of),
            news: self.news.truncate_after(as_of),
            reddit: self.reddit.truncate_after(as_of),
            trends: self.trends.truncate_after(as_of),
        }
    }
}

/// How a secondary source contributed to a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    /// Records were supplied. `matched` landed on trading dates; `off_calendar`
    /// fell on dates with no price bar and were dropped.
    Observed { matched: usize, off_calendar: usize },
    /// The collector ran but returned nothing.
    Empty,
    /// The collector failed; every column from this source is neutral.
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    pub source: SignalSource,
    #[serde(flatten)]
    pub status: SourceStatus,
}

impl SourceReport {
    pub fn is_degraded(&self) -> bool {
        !matches!(self.status, SourceStatus::Observed { matched, .. } if matched > 0)
    }
}
