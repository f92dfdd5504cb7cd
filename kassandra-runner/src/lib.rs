//! Kassandra Runner: collector orchestration, training, prediction, exports.
//!
//! This crate builds on `kassandra-core` to provide:
//! - TOML run configuration
//! - Parallel collector loading with degraded-source handling
//! - Dataset and live-row construction over collectors
//! - Chronological split, baseline estimators, evaluation metrics
//! - Model artifacts that carry their feature schema
//! - Feature table (CSV, Parquet) and prediction log exports

pub mod artifact;
pub mod builder;
pub mod config;
pub mod data_loader;
pub mod estimator;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod split;

pub use artifact::{ArtifactError, ModelArtifact};
pub use builder::{BuildError, DatasetBuilder};
pub use config::{ConfigError, KassandraConfig, ModelKind};
pub use data_loader::{load_inputs, Collectors, LoadError};
pub use estimator::{Estimator, EstimatorError, Model};
pub use export::{
    append_prediction, read_prediction_log, write_feature_table_csv, write_feature_table_parquet,
    write_prediction_log, PredictionRecord,
};
pub use metrics::EvaluationMetrics;
pub use runner::{
    build_model, run_prediction, run_training, train_on_dataset, LivePrediction, RunError,
    TrainingOutcome,
};
pub use split::{chronological_split, SplitError, TrainTestSplit};
