//! Per-date sentiment aggregates and the fields the pipeline reads from them.
//!
//! Sentiment scoring itself is external: items arrive already scored with a
//! compound polarity in [-1, 1]. This module only aggregates scored items
//! into one record per date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::series::{DailySeries, Dated, SeriesError};

/// Compound scores above this are counted as positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Compound scores below this are counted as negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// Daily sentiment aggregate for one source.
///
/// Every field is 0 when no items were observed for the date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAggregate {
    pub date: NaiveDate,
    #[serde(default)]
    pub mean_sentiment: f64,
    #[serde(default)]
    pub sentiment_volatility: f64,
    #[serde(default)]
    pub positive_ratio: f64,
    #[serde(default)]
    pub negative_ratio: f64,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub engagement: f64,
    #[serde(default)]
    pub engagement_weighted_mean: f64,
}

impl SentimentAggregate {
    /// The all-neutral aggregate for a date with no observations.
    pub fn neutral(date: NaiveDate) -> Self {
        Self {
            date,
            mean_sentiment: 0.0,
            sentiment_volatility: 0.0,
            positive_ratio: 0.0,
            negative_ratio: 0.0,
            volume: 0.0,
            engagement: 0.0,
            engagement_weighted_mean: 0.0,
        }
    }

    /// Aggregate the scored items observed on one date.
    ///
    /// Volatility is the sample standard deviation (0 for fewer than two items).
    /// The engagement-weighted mean falls back to the plain mean when total
    /// engagement is not positive.
    pub fn from_items(date: NaiveDate, items: &[ScoredItem]) -> Self {
        if items.is_empty() {
            return Self::neutral(date);
        }
        let n = items.len() as f64;
        let mean = items.iter().map(|i| i.compound).sum::<f64>() / n;
        let volatility = if items.len() < 2 {
            0.0
        } else {
            let ss: f64 = items.iter().map(|i| (i.compound - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt()
        };
        let positives = items
            .iter()
            .filter(|i| i.compound > POSITIVE_THRESHOLD)
            .count() as f64;
        let negatives = items
            .iter()
            .filter(|i| i.compound < NEGATIVE_THRESHOLD)
            .count() as f64;
        let engagement: f64 = items.iter().map(|i| i.engagement).sum();
        let weighted = if engagement > 0.0 {
            items.iter().map(|i| i.compound * i.engagement).sum::<f64>() / engagement
        } else {
            mean
        };

        Self {
            date,
            mean_sentiment: mean,
            sentiment_volatility: volatility,
            positive_ratio: positives / n,
            negative_ratio: negatives / n,
            volume: n,
            engagement,
            engagement_weighted_mean: weighted,
        }
    }

    /// Read one field.
    pub fn field(&self, field: SentimentField) -> f64 {
        match field {
            SentimentField::MeanSentiment => self.mean_sentiment,
            SentimentField::SentimentVolatility => self.sentiment_volatility,
            SentimentField::PositiveRatio => self.positive_ratio,
            SentimentField::NegativeRatio => self.negative_ratio,
            SentimentField::Volume => self.volume,
            SentimentField::Engagement => self.engagement,
            SentimentField::EngagementWeightedMean => self.engagement_weighted_mean,
        }
    }
}

impl Dated for SentimentAggregate {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// A field of [`SentimentAggregate`] that becomes a frame column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentField {
    MeanSentiment,
    SentimentVolatility,
    PositiveRatio,
    NegativeRatio,
    Volume,
    Engagement,
    EngagementWeightedMean,
}

impl SentimentField {
    /// Fields reported by news feeds.
    pub const NEWS: &'static [SentimentField] = &[
        SentimentField::MeanSentiment,
        SentimentField::SentimentVolatility,
        SentimentField::PositiveRatio,
        SentimentField::NegativeRatio,
        SentimentField::Volume,
    ];

    /// Fields reported by Reddit feeds (news fields plus engagement).
    pub const REDDIT: &'static [SentimentField] = &[
        SentimentField::MeanSentiment,
        SentimentField::SentimentVolatility,
        SentimentField::PositiveRatio,
        SentimentField::NegativeRatio,
        SentimentField::Volume,
        SentimentField::Engagement,
        SentimentField::EngagementWeightedMean,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentField::MeanSentiment => "mean_sentiment",
            SentimentField::SentimentVolatility => "sentiment_volatility",
            SentimentField::PositiveRatio => "positive_ratio",
            SentimentField::NegativeRatio => "negative_ratio",
            SentimentField::Volume => "volume",
            SentimentField::Engagement => "engagement",
            SentimentField::EngagementWeightedMean => "engagement_weighted_mean",
        }
    }
}

/// One externally-scored item (headline or post).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub date: NaiveDate,
    /// Compound polarity in [-1, 1].
    pub compound: f64,
    /// Engagement weight (e.g. post score). 0 for news.
    #[serde(default)]
    pub engagement: f64,
}

/// Group scored items by date and aggregate each day.
pub fn aggregate_daily(items: &[ScoredItem]) -> Result<DailySeries<SentimentAggregate>, SeriesError> {
    let mut by_date: BTreeMap<NaiveDate, Vec<ScoredItem>> = BTreeMap::new();
    for item in items {
        by_date.entry(item.date).or_default().push(item.clone());
    }
    DailySeries::new(
        by_date
            .into_iter()
            .map(|(date, day)| SentimentAggregate::from_items(date, &day))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn item(day: u32, compound: f64, engagement: f64) -> ScoredItem {
        ScoredItem {
            date: d(day),
            compound,
            engagement,
        }
    }

    #[test]
    fn empty_items_are_neutral() {
        let agg = SentimentAggregate::from_items(d(1), &[]);
        assert_eq!(agg, SentimentAggregate::neutral(d(1)));
    }

    #[test]
    fn single_item_has_zero_volatility() {
        let agg = SentimentAggregate::from_items(d(1), &[item(1, 0.6, 0.0)]);
        assert_eq!(agg.mean_sentiment, 0.6);
        assert_eq!(agg.sentiment_volatility, 0.0);
        assert_eq!(agg.volume, 1.0);
        assert_eq!(agg.positive_ratio, 1.0);
    }

    #[test]
    fn ratios_use_thresholds() {
        let items = [
            item(1, 0.5, 0.0),
            item(1, 0.01, 0.0),
            item(1, -0.3, 0.0),
            item(1, -0.04, 0.0),
        ];
        let agg = SentimentAggregate::from_items(d(1), &items);
        assert_eq!(agg.positive_ratio, 0.25);
        assert_eq!(agg.negative_ratio, 0.25);
        assert_eq!(agg.volume, 4.0);
    }

    #[test]
    fn sample_standard_deviation() {
        let agg = SentimentAggregate::from_items(d(1), &[item(1, 0.2, 0.0), item(1, 0.4, 0.0)]);
        // mean 0.3, deviations ±0.1, ss = 0.02, /(n-1) = 0.02
        assert!((agg.sentiment_volatility - 0.02_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn engagement_weighting() {
        let agg = SentimentAggregate::from_items(d(1), &[item(1, 1.0, 3.0), item(1, -1.0, 1.0)]);
        assert_eq!(agg.engagement, 4.0);
        assert!((agg.engagement_weighted_mean - 0.5).abs() < 1e-12);
        assert_eq!(agg.mean_sentiment, 0.0);
    }

    #[test]
    fn zero_engagement_falls_back_to_mean() {
        let agg = SentimentAggregate::from_items(d(1), &[item(1, 0.4, 0.0), item(1, 0.2, 0.0)]);
        assert!((agg.engagement_weighted_mean - agg.mean_sentiment).abs() < 1e-12);
    }

    #[test]
    fn aggregate_daily_groups_and_sorts() {
        let items = [item(3, 0.1, 0.0), item(1, 0.5, 0.0), item(3, 0.3, 0.0)];
        let series = aggregate_daily(&items).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.records()[0].date, d(1));
        assert_eq!(series.records()[1].volume, 2.0);
        assert!((series.records()[1].mean_sentiment - 0.2).abs() < 1e-12);
    }

    #[test]
    fn field_names_are_stable() {
        assert_eq!(SentimentField::MeanSentiment.as_str(), "mean_sentiment");
        assert_eq!(SentimentField::NEWS.len(), 5);
        assert_eq!(SentimentField::REDDIT.len(), 7);
    }
}
