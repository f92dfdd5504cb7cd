//! Dataset and live-row construction over collectors.
//!
//! Thin layer between the collectors and the pure core pipeline: fetch the
//! window, hand the series to `kassandra_core`, wrap its errors.

use chrono::{Duration, NaiveDate};
use thiserror::Error;
use tracing::info;

use kassandra_core::features::{self, Dataset, FeatureConfig, FeatureRow, FeatureSchema};
use kassandra_core::PipelineError;

use crate::config::KassandraConfig;
use crate::data_loader::{load_inputs, Collectors, LoadError};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

pub struct DatasetBuilder {
    collectors: Collectors,
    features: FeatureConfig,
    lookback_days: u32,
}

impl DatasetBuilder {
    pub const DEFAULT_LOOKBACK_DAYS: u32 = 400;

    pub fn new(collectors: Collectors, features: FeatureConfig) -> Result<Self, BuildError> {
        features.validate()?;
        Ok(Self {
            collectors,
            features,
            lookback_days: Self::DEFAULT_LOOKBACK_DAYS,
        })
    }

    pub fn from_config(config: &KassandraConfig) -> Result<Self, BuildError> {
        Ok(Self::new(Collectors::from_config(&config.sources), config.features.clone())?
            .with_lookback_days(config.live.lookback_days))
    }

    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = days.max(1);
        self
    }

    pub fn features(&self) -> &FeatureConfig {
        &self.features
    }

    pub fn collectors(&self) -> &Collectors {
        &self.collectors
    }

    pub fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    /// Supervised dataset for `ticker` over `[start, end]`. A window with no
    /// price bars is [`PipelineError::EmptyPriceSeries`].
    pub fn build_dataset(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Dataset, BuildError> {
        let inputs = match load_inputs(&self.collectors, ticker, start, end) {
            Ok(inputs) => inputs,
            Err(LoadError::NoPrices { .. }) => return Err(PipelineError::EmptyPriceSeries.into()),
            Err(e) => return Err(e.into()),
        };
        let dataset = features::build_dataset(&inputs, &self.features)?;
        let fingerprint = dataset.fingerprint();
        info!(
            ticker,
            rows = dataset.len(),
            fingerprint = fingerprint.short(),
            "built dataset"
        );
        Ok(dataset)
    }

    /// Feature row for the last trading date on or before `as_of`. Only the
    /// lookback window ending at `as_of` is fetched.
    pub fn build_feature_row(&self, ticker: &str, as_of: NaiveDate) -> Result<FeatureRow, BuildError> {
        let start = as_of - Duration::days(i64::from(self.lookback_days));
        let inputs = match load_inputs(&self.collectors, ticker, start, as_of) {
            Ok(inputs) => inputs,
            Err(LoadError::NoPrices { .. }) => {
                return Err(PipelineError::NoTradingDateBefore { as_of }.into())
            }
            Err(e) => return Err(e.into()),
        };
        Ok(features::build_feature_row(&inputs, as_of, &self.features)?)
    }

    /// [`Self::build_feature_row`], then require the row's schema to equal
    /// the one the model was trained against.
    pub fn build_feature_row_checked(
        &self,
        ticker: &str,
        as_of: NaiveDate,
        expected: &FeatureSchema,
    ) -> Result<FeatureRow, BuildError> {
        let row = self.build_feature_row(ticker, as_of)?;
        expected.ensure_matches(&row.schema)?;
        Ok(row)
    }
}

impl std::fmt::Debug for DatasetBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetBuilder")
            .field("collectors", &self.collectors)
            .field("features", &self.features)
            .field("lookback_days", &self.lookback_days)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kassandra_core::data::{InMemorySource, SyntheticPriceSource};
    use kassandra_core::domain::{DailySeries, PriceBar};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn synthetic() -> DatasetBuilder {
        DatasetBuilder::new(
            Collectors::prices_only(Box::new(SyntheticPriceSource::new(7))),
            FeatureConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn rejects_invalid_feature_config() {
        let mut cfg = FeatureConfig::default();
        cfg.lags.lags = vec![0];
        let err = DatasetBuilder::new(
            Collectors::prices_only(Box::new(SyntheticPriceSource::new(7))),
            cfg,
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::Pipeline(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn dataset_over_synthetic_prices() {
        let ds = synthetic().build_dataset("DIS", d(2024, 1, 1), d(2024, 6, 30)).unwrap();
        assert!(ds.len() > 100);
        assert!(ds.dates.iter().all(|&t| t <= d(2024, 6, 30)));
    }

    #[test]
    fn live_row_uses_last_trading_date() {
        // 2024-06-08 is a Saturday, so the row belongs to Friday.
        let row = synthetic().build_feature_row("DIS", d(2024, 6, 8)).unwrap();
        assert_eq!(row.date, d(2024, 6, 7));
    }

    fn without_prices() -> DatasetBuilder {
        DatasetBuilder::new(
            Collectors::prices_only(Box::new(InMemorySource::new(
                "fixture",
                DailySeries::<PriceBar>::empty(),
            ))),
            FeatureConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn dataset_without_prices_is_empty_price_series() {
        let err = without_prices()
            .build_dataset("DIS", d(2024, 1, 1), d(2024, 6, 1))
            .unwrap_err();
        assert!(
            matches!(err, BuildError::Pipeline(PipelineError::EmptyPriceSeries)),
            "{err:?}"
        );
    }

    #[test]
    fn live_row_without_history_errors() {
        let err = without_prices().build_feature_row("DIS", d(2024, 6, 8)).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Pipeline(PipelineError::NoTradingDateBefore { .. })
        ));
    }

    #[test]
    fn checked_row_detects_schema_drift() {
        let builder = synthetic();
        let mut other = FeatureConfig::default();
        other.lags.lags = vec![1];
        let trained = FeatureSchema::from_config(&other).unwrap();
        let err = builder
            .build_feature_row_checked("DIS", d(2024, 6, 7), &trained)
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Pipeline(PipelineError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn lookback_is_at_least_one_day() {
        assert_eq!(synthetic().with_lookback_days(0).lookback_days(), 1);
    }
}
