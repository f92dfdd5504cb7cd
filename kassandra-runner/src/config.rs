//! TOML run configuration.
//!
//! ```toml
//! [run]
//! ticker = "DIS"
//! start = "2021-01-16"
//! end = "2026-01-16"
//!
//! [features.lags]
//! lags = [1, 2, 3]
//!
//! [sources]
//! prices = "data/{ticker}_prices.csv"
//! news = "data/{ticker}_news.csv"
//!
//! [model]
//! kind = "ensemble"
//! test_size = 0.2
//! ```
//!
//! Every section and field is optional and falls back to its default.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use kassandra_core::data::{SentimentCsvFormat, TrendCsvFormat};
use kassandra_core::features::FeatureConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("cannot parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KassandraConfig {
    pub run: RunSection,
    pub features: FeatureConfig,
    pub sources: SourcesSection,
    pub model: ModelSection,
    pub live: LiveSection,
    pub output: OutputSection,
}

impl KassandraConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run.ticker.trim().is_empty() {
            return Err(ConfigError::Invalid("run.ticker is empty".into()));
        }
        if self.run.start > self.run.end {
            return Err(ConfigError::Invalid(format!(
                "run.start {} is after run.end {}",
                self.run.start, self.run.end
            )));
        }
        self.features
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.sources.prices.is_none() && !self.sources.synthetic {
            return Err(ConfigError::Invalid(
                "no price source: set sources.prices or sources.synthetic = true".into(),
            ));
        }
        if !(self.model.test_size > 0.0 && self.model.test_size < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "model.test_size must be in (0, 1), got {}",
                self.model.test_size
            )));
        }
        if !(self.model.ridge_lambda > 0.0 && self.model.ridge_lambda.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "model.ridge_lambda must be positive, got {}",
                self.model.ridge_lambda
            )));
        }
        let w = &self.model.weights;
        if w.last_close < 0.0 || w.ridge < 0.0 || !(w.last_close + w.ridge > 0.0) {
            return Err(ConfigError::Invalid(
                "model.weights must be non-negative with a positive sum".into(),
            ));
        }
        if self.live.lookback_days == 0 {
            return Err(ConfigError::Invalid("live.lookback_days must be >= 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSection {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            ticker: "DIS".into(),
            start: NaiveDate::from_ymd_opt(2021, 1, 16).expect("valid default start"),
            end: NaiveDate::from_ymd_opt(2026, 1, 16).expect("valid default end"),
        }
    }
}

/// Where each collector reads from. Paths may contain `{ticker}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesSection {
    pub prices: Option<String>,
    pub news: Option<String>,
    pub news_format: SentimentCsvFormat,
    pub reddit: Option<String>,
    pub reddit_format: SentimentCsvFormat,
    pub trends: Option<String>,
    pub trends_format: TrendCsvFormat,
    /// Use the seeded synthetic price generator instead of a price file.
    pub synthetic: bool,
    pub seed: u64,
}

impl Default for SourcesSection {
    fn default() -> Self {
        Self {
            prices: None,
            news: None,
            news_format: SentimentCsvFormat::Daily,
            reddit: None,
            reddit_format: SentimentCsvFormat::Daily,
            trends: None,
            trends_format: TrendCsvFormat::Scores,
            synthetic: true,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LastClose,
    Ridge,
    #[default]
    Ensemble,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleWeights {
    pub last_close: f64,
    pub ridge: f64,
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            last_close: 0.4,
            ridge: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    pub kind: ModelKind,
    /// Fraction of rows, taken from the end, held out for evaluation.
    pub test_size: f64,
    pub ridge_lambda: f64,
    pub weights: EnsembleWeights,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            kind: ModelKind::Ensemble,
            test_size: 0.2,
            ridge_lambda: 1.0,
            weights: EnsembleWeights::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveSection {
    /// Calendar days of history fetched before `as_of` for a live row.
    pub lookback_days: u32,
}

impl Default for LiveSection {
    fn default() -> Self {
        Self { lookback_days: 400 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub dir: PathBuf,
    pub features_csv: String,
    pub features_parquet: String,
    pub prediction_log: String,
    pub model: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("outputs"),
            features_csv: "processed_features.csv".into(),
            features_parquet: "processed_features.parquet".into(),
            prediction_log: "prediction_log.csv".into(),
            model: "trained_model.json".into(),
        }
    }
}

impl OutputSection {
    pub fn features_csv_path(&self) -> PathBuf {
        self.dir.join(&self.features_csv)
    }

    pub fn features_parquet_path(&self) -> PathBuf {
        self.dir.join(&self.features_parquet)
    }

    pub fn prediction_log_path(&self) -> PathBuf {
        self.dir.join(&self.prediction_log)
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.model)
    }
}
