//! Kassandra Core: domain types, indicators, and the leakage-safe feature
//! pipeline for next-session close prediction.
//!
//! - Domain types (price bars, sentiment aggregates, trend scores, daily series)
//! - Technical indicators over the price series
//! - The feature pipeline: calendar join, missing-data policy, indicators,
//!   lags, target construction with leakage validation, dataset assembly
//! - Collector traits with CSV and synthetic implementations
//! - Dataset fingerprinting

pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod fingerprint;
pub mod indicators;

pub use error::PipelineError;
pub use features::{
    build_dataset, build_feature_row, build_feature_row_checked, Dataset, FeatureConfig,
    FeatureMatrix, FeatureRow, FeatureSchema, SourceInputs,
};
