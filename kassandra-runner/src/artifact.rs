//! Trained-model artifact.
//!
//! The fitted estimator is persisted together with the feature config and
//! the exact schema it was trained on, so a later process can rebuild a live
//! row and refuse it if the columns drifted.

use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use kassandra_core::features::{FeatureConfig, FeatureSchema};
use kassandra_core::fingerprint::DatasetHash;

use crate::estimator::{Estimator, Model};
use crate::metrics::EvaluationMetrics;

/// Current artifact layout version.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact I/O at {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("artifact (de)serialization failed: {0}")]
    Serialize(String),

    #[error("unsupported artifact schema version {found} (max supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("artifact is inconsistent: {0}")]
    Inconsistent(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub ticker: String,
    pub trained_at: DateTime<Utc>,
    pub feature_config: FeatureConfig,
    pub schema: FeatureSchema,
    pub schema_fingerprint: String,
    pub dataset_hash: DatasetHash,
    pub train_start: NaiveDate,
    pub train_end: NaiveDate,
    pub train_rows: usize,
    pub model: Model,
    pub metrics: EvaluationMetrics,
}

impl ModelArtifact {
    pub fn to_json(&self) -> Result<String, ArtifactError> {
        serde_json::to_string_pretty(self).map_err(|e| ArtifactError::Serialize(e.to_string()))
    }

    /// Parse, rejecting newer layout versions and schemas that do not match
    /// their recorded fingerprint or feature config.
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let artifact: Self =
            serde_json::from_str(json).map_err(|e| ArtifactError::Serialize(e.to_string()))?;
        if artifact.schema_version > SCHEMA_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: artifact.schema_version,
                supported: SCHEMA_VERSION,
            });
        }
        if artifact.schema.fingerprint() != artifact.schema_fingerprint {
            return Err(ArtifactError::Inconsistent(
                "schema does not match its fingerprint".into(),
            ));
        }
        let derived = FeatureSchema::from_config(&artifact.feature_config)
            .map_err(|e| ArtifactError::Inconsistent(e.to_string()))?;
        derived
            .ensure_matches(&artifact.schema)
            .map_err(|e| ArtifactError::Inconsistent(e.to_string()))?;
        Ok(artifact)
    }

    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let io_err = |e: std::io::Error| ArtifactError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, self.to_json()?).map_err(io_err)?;
        info!(path = %path.display(), model = %self.model_name(), "saved model artifact");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let json = fs::read_to_string(path).map_err(|e| ArtifactError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::{LastClose, Ridge};
    use kassandra_core::features::FeatureMatrix;

    fn artifact() -> ModelArtifact {
        let config = FeatureConfig::default();
        let schema = FeatureSchema::from_config(&config).unwrap();
        let rows: Vec<Vec<f64>> = (0..10)
            .map(|i| (0..schema.len()).map(|j| (i * j) as f64 % 7.0).collect())
            .collect();
        let y: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let x = FeatureMatrix::from_rows(schema.names(), rows).unwrap();
        let mut model = Model::Ridge(Ridge::new(1.0));
        model.fit(&x, &y).unwrap();

        ModelArtifact {
            schema_version: SCHEMA_VERSION,
            ticker: "DIS".into(),
            trained_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            feature_config: config,
            schema_fingerprint: schema.fingerprint(),
            schema,
            dataset_hash: DatasetHash("ab".repeat(32)),
            train_start: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            train_end: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
            train_rows: 10,
            model,
            metrics: EvaluationMetrics::compute(&[1.0, 2.0], &[1.0, 2.0]),
        }
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/trained_model.json");
        let a = artifact();
        a.save(&path).unwrap();
        let b = ModelArtifact::load(&path).unwrap();
        assert_eq!(a, b);
        assert_eq!(b.model_name(), "ridge");
    }

    #[test]
    fn rejects_newer_version() {
        let mut a = artifact();
        a.schema_version = SCHEMA_VERSION + 1;
        let json = serde_json::to_string(&a).unwrap();
        assert!(matches!(
            ModelArtifact::from_json(&json),
            Err(ArtifactError::UnsupportedVersion { found: 2, supported: 1 })
        ));
    }

    #[test]
    fn missing_version_defaults_to_current() {
        let a = artifact();
        let mut value = serde_json::to_value(&a).unwrap();
        value.as_object_mut().unwrap().remove("schema_version");
        let b = ModelArtifact::from_json(&value.to_string()).unwrap();
        assert_eq!(b.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn rejects_tampered_schema() {
        let mut a = artifact();
        a.schema.columns.pop();
        let json = a.to_json().unwrap();
        assert!(matches!(
            ModelArtifact::from_json(&json),
            Err(ArtifactError::Inconsistent(_))
        ));
    }

    #[test]
    fn rejects_schema_not_derived_from_config() {
        let mut a = artifact();
        a.feature_config.lags.lags = vec![1];
        a.model = Model::LastClose(LastClose::default());
        let json = a.to_json().unwrap();
        assert!(matches!(
            ModelArtifact::from_json(&json),
            Err(ArtifactError::Inconsistent(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ModelArtifact::load(&dir.path().join("absent.json")),
            Err(ArtifactError::Io { .. })
        ));
    }
}
