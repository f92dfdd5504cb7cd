//! Training and prediction runs: wires together dataset, split, estimator,
//! metrics, and artifact.
//!
//! Two entry points:
//! - `run_training()`: builds the dataset, fits on the chronological train
//!   split, evaluates on the held-out tail, returns the artifact. Used by CLI.
//! - `run_prediction()`: rebuilds the live row for `as_of`, checks it against
//!   the artifact's schema, and predicts the next close.

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::info;

use kassandra_core::features::{FeatureRow, SourceReport};
use kassandra_core::Dataset;

use crate::artifact::{ModelArtifact, SCHEMA_VERSION};
use crate::builder::{BuildError, DatasetBuilder};
use crate::config::{ModelKind, ModelSection};
use crate::estimator::{Estimator, EstimatorError, LastClose, Model, Ridge, WeightedEnsemble};
use crate::export::PredictionRecord;
use crate::metrics::EvaluationMetrics;
use crate::split::{chronological_split, SplitError};

/// Errors from a training or prediction run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("build error: {0}")]
    Build(#[from] BuildError),
    #[error("split error: {0}")]
    Split(#[from] SplitError),
    #[error("estimator error: {0}")]
    Estimator(#[from] EstimatorError),
}

/// Result of a training run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifact: ModelArtifact,
    /// Held-out predictions, one per test row, with the realized close.
    pub test_predictions: Vec<PredictionRecord>,
    pub test_rows: usize,
}

/// A next-session forecast from a live feature row.
#[derive(Debug, Clone)]
pub struct LivePrediction {
    pub as_of: NaiveDate,
    /// Trading date of the feature row the forecast was made from.
    pub date: NaiveDate,
    pub predicted: f64,
    pub sources: Vec<SourceReport>,
}

impl LivePrediction {
    pub fn record(&self) -> PredictionRecord {
        PredictionRecord {
            date: self.date,
            actual: None,
            predicted: self.predicted,
        }
    }
}

/// Untrained estimator for the `[model]` section.
pub fn build_model(section: &ModelSection) -> Result<Model, EstimatorError> {
    Ok(match section.kind {
        ModelKind::LastClose => Model::LastClose(LastClose::default()),
        ModelKind::Ridge => Model::Ridge(Ridge::new(section.ridge_lambda)),
        ModelKind::Ensemble => Model::Ensemble(WeightedEnsemble::new(vec![
            (section.weights.last_close, Model::LastClose(LastClose::default())),
            (section.weights.ridge, Model::Ridge(Ridge::new(section.ridge_lambda))),
        ])?),
    })
}

/// Build the dataset over `[start, end]` and train on it.
pub fn run_training(
    builder: &DatasetBuilder,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
    section: &ModelSection,
) -> Result<(Dataset, TrainingOutcome), RunError> {
    let dataset = builder.build_dataset(ticker, start, end)?;
    let outcome = train_on_dataset(&dataset, ticker, builder, section)?;
    Ok((dataset, outcome))
}

/// Train and evaluate on a pre-built dataset: no I/O.
pub fn train_on_dataset(
    dataset: &Dataset,
    ticker: &str,
    builder: &DatasetBuilder,
    section: &ModelSection,
) -> Result<TrainingOutcome, RunError> {
    let split = chronological_split(dataset, section.test_size)?;
    let mut model = build_model(section)?;
    model.fit(&split.train.features, &split.train.targets)?;

    let predicted = model.predict_all(&split.test.features)?;
    let metrics = EvaluationMetrics::compute(&split.test.targets, &predicted);
    info!(
        ticker,
        model = model.name(),
        train = split.train.len(),
        test = split.test.len(),
        rmse = metrics.rmse,
        mae = metrics.mae,
        mape = metrics.mape,
        direction = metrics.direction_accuracy,
        "trained model"
    );

    let test_predictions = split
        .test
        .dates
        .iter()
        .zip(&split.test.targets)
        .zip(&predicted)
        .map(|((&date, &actual), &predicted)| PredictionRecord {
            date,
            actual: Some(actual),
            predicted,
        })
        .collect();

    // Non-empty: the split guarantees at least one train row.
    let train_start = split.train.dates[0];
    let train_end = split.train.dates[split.train.len() - 1];

    let artifact = ModelArtifact {
        schema_version: SCHEMA_VERSION,
        ticker: ticker.to_string(),
        trained_at: Utc::now(),
        feature_config: builder.features().clone(),
        schema_fingerprint: dataset.schema.fingerprint(),
        schema: dataset.schema.clone(),
        dataset_hash: dataset.fingerprint(),
        train_start,
        train_end,
        train_rows: split.train.len(),
        model,
        metrics,
    };

    Ok(TrainingOutcome {
        artifact,
        test_predictions,
        test_rows: split.test.len(),
    })
}

/// Forecast the close of the session after the last trading date <= `as_of`.
pub fn run_prediction(
    builder: &DatasetBuilder,
    artifact: &ModelArtifact,
    ticker: &str,
    as_of: NaiveDate,
) -> Result<LivePrediction, RunError> {
    let row: FeatureRow = builder.build_feature_row_checked(ticker, as_of, &artifact.schema)?;
    let predicted = artifact.model.predict(&row.values)?;
    info!(ticker, %as_of, date = %row.date, predicted, "live prediction");
    Ok(LivePrediction {
        as_of,
        date: row.date,
        predicted,
        sources: row.sources,
    })
}
