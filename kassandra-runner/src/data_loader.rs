//! Collector orchestration.
//!
//! The four collectors are independent read-only inputs, so they run in
//! parallel on the rayon pool. Failure policy:
//! 1. Price collector fails → fatal, the calendar cannot be derived
//! 2. News, Reddit or trends collector fails → that feed is marked
//!    `Unavailable` with the error text and the run continues
//! 3. A secondary collector that is not configured → empty feed

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

use kassandra_core::data::{
    CsvPriceSource, CsvSentimentSource, CsvTrendSource, PriceSource, SentimentSource,
    SourceError, SyntheticPriceSource, TrendSource,
};
use kassandra_core::domain::{DailySeries, Dated};
use kassandra_core::features::{SourceFeed, SourceInputs};

use crate::config::SourcesSection;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("price collector '{collector}' failed for {ticker}: {error}")]
    Prices {
        collector: String,
        ticker: String,
        error: SourceError,
    },

    #[error("price collector returned no bars for {ticker} in {start}..={end}")]
    NoPrices {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
    },
}

/// The set of collectors a run reads from.
pub struct Collectors {
    pub prices: Box<dyn PriceSource>,
    pub news: Option<Box<dyn SentimentSource>>,
    pub reddit: Option<Box<dyn SentimentSource>>,
    pub trends: Option<Box<dyn TrendSource>>,
}

impl Collectors {
    pub fn prices_only(prices: Box<dyn PriceSource>) -> Self {
        Self {
            prices,
            news: None,
            reddit: None,
            trends: None,
        }
    }

    /// Build collectors from the `[sources]` section. A configured price
    /// file takes precedence over the synthetic generator.
    pub fn from_config(sources: &SourcesSection) -> Self {
        let prices: Box<dyn PriceSource> = match &sources.prices {
            Some(path) => Box::new(CsvPriceSource::new(path.clone())),
            None => Box::new(SyntheticPriceSource::new(sources.seed)),
        };
        Self {
            prices,
            news: sources.news.as_ref().map(|path| {
                Box::new(CsvSentimentSource::new("news", path.clone(), sources.news_format))
                    as Box<dyn SentimentSource>
            }),
            reddit: sources.reddit.as_ref().map(|path| {
                Box::new(CsvSentimentSource::new("reddit", path.clone(), sources.reddit_format))
                    as Box<dyn SentimentSource>
            }),
            trends: sources.trends.as_ref().map(|path| {
                Box::new(CsvTrendSource::new(path.clone(), sources.trends_format))
                    as Box<dyn TrendSource>
            }),
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.prices.name() == "synthetic"
    }
}

impl std::fmt::Debug for Collectors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collectors")
            .field("prices", &self.prices.name())
            .field("news", &self.news.as_ref().map(|s| s.name()))
            .field("reddit", &self.reddit.as_ref().map(|s| s.name()))
            .field("trends", &self.trends.as_ref().map(|s| s.name()))
            .finish()
    }
}

/// Run every collector for `[start, end]` and gather the results.
pub fn load_inputs(
    collectors: &Collectors,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<SourceInputs, LoadError> {
    let ((prices, news), (reddit, trends)) = rayon::join(
        || {
            rayon::join(
                || collectors.prices.get_prices(ticker, start, end),
                || {
                    optional_feed("news", collectors.news.as_deref(), |s| {
                        s.get_sentiment(ticker, start, end)
                    })
                },
            )
        },
        || {
            rayon::join(
                || {
                    optional_feed("reddit", collectors.reddit.as_deref(), |s| {
                        s.get_sentiment(ticker, start, end)
                    })
                },
                || {
                    optional_feed("trends", collectors.trends.as_deref(), |s| {
                        s.get_trend(ticker, start, end)
                    })
                },
            )
        },
    );

    let prices = prices.map_err(|error| LoadError::Prices {
        collector: collectors.prices.name().to_string(),
        ticker: ticker.to_string(),
        error,
    })?;
    if prices.is_empty() {
        return Err(LoadError::NoPrices {
            ticker: ticker.to_string(),
            start,
            end,
        });
    }

    info!(
        ticker,
        %start,
        %end,
        bars = prices.len(),
        collector = collectors.prices.name(),
        "loaded sources"
    );

    Ok(SourceInputs {
        prices,
        news,
        reddit,
        trends,
    })
}

fn optional_feed<S: ?Sized, T, F>(label: &str, source: Option<&S>, fetch: F) -> SourceFeed<T>
where
    T: Dated + Clone,
    F: FnOnce(&S) -> Result<DailySeries<T>, SourceError>,
{
    let Some(source) = source else {
        return SourceFeed::empty();
    };
    match fetch(source) {
        Ok(series) => SourceFeed::Observed(series),
        Err(e) => {
            warn!(source = label, error = %e, "collector failed; continuing without it");
            SourceFeed::unavailable(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kassandra_core::data::InMemorySource;
    use kassandra_core::domain::{PriceBar, SentimentAggregate};

    struct Failing;

    impl SentimentSource for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn get_sentiment(
            &self,
            _ticker: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<DailySeries<SentimentAggregate>, SourceError> {
            Err(SourceError::Unavailable("rate limited".into()))
        }
    }

    impl PriceSource for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn get_prices(
            &self,
            ticker: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<DailySeries<PriceBar>, SourceError> {
            Err(SourceError::TickerNotFound {
                ticker: ticker.to_string(),
            })
        }
    }

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    #[test]
    fn failing_sentiment_degrades() {
        let mut collectors = Collectors::prices_only(Box::new(SyntheticPriceSource::new(1)));
        collectors.news = Some(Box::new(Failing));
        let inputs = load_inputs(&collectors, "DIS", d(1, 1), d(3, 1)).unwrap();
        assert!(!inputs.prices.is_empty());
        assert_eq!(
            inputs.news,
            SourceFeed::unavailable("source unavailable: rate limited")
        );
        assert_eq!(inputs.reddit, SourceFeed::empty());
    }

    #[test]
    fn failing_prices_are_fatal() {
        let collectors = Collectors::prices_only(Box::new(Failing));
        let err = load_inputs(&collectors, "XYZ", d(1, 1), d(3, 1)).unwrap_err();
        assert!(matches!(err, LoadError::Prices { .. }));
    }

    #[test]
    fn empty_price_range_reports_window() {
        // The builder turns this into EmptyPriceSeries or NoTradingDateBefore.
        let collectors = Collectors::prices_only(Box::new(InMemorySource::new(
            "fixture",
            DailySeries::<PriceBar>::empty(),
        )));
        match load_inputs(&collectors, "DIS", d(1, 1), d(3, 1)) {
            Err(LoadError::NoPrices { ticker, start, end }) => {
                assert_eq!(ticker, "DIS");
                assert_eq!((start, end), (d(1, 1), d(3, 1)));
            }
            other => panic!("expected NoPrices, got {other:?}"),
        }
    }

    #[test]
    fn from_config_prefers_price_file() {
        let mut sources = SourcesSection::default();
        assert!(Collectors::from_config(&sources).is_synthetic());
        sources.prices = Some("data/{ticker}.csv".into());
        sources.news = Some("data/{ticker}_news.csv".into());
        let collectors = Collectors::from_config(&sources);
        assert!(!collectors.is_synthetic());
        assert_eq!(collectors.news.as_ref().map(|s| s.name()), Some("news"));
        assert!(collectors.trends.is_none());
    }
}
