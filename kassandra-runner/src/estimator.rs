//! Estimator interface and baseline estimators.
//!
//! The pipeline is estimator-agnostic: anything that can fit a feature matrix
//! against next-day closes and predict from one row implements [`Estimator`].
//! The baselines here are serializable so a trained model can be persisted
//! next to its feature schema.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use kassandra_core::features::FeatureMatrix;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimatorError {
    #[error("estimator '{0}' has not been fitted")]
    NotFitted(String),

    #[error("cannot fit on an empty training set")]
    EmptyTrainingSet,

    #[error("expected {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("feature matrix has no '{0}' column")]
    MissingColumn(String),

    #[error("normal equations are singular")]
    Singular,

    #[error("ensemble weights must be non-negative with a positive sum")]
    InvalidWeights,
}

pub trait Estimator: Send + Sync {
    fn name(&self) -> &str;

    fn fit(&mut self, features: &FeatureMatrix, targets: &[f64]) -> Result<(), EstimatorError>;

    fn predict(&self, row: &[f64]) -> Result<f64, EstimatorError>;

    fn predict_all(&self, features: &FeatureMatrix) -> Result<Vec<f64>, EstimatorError> {
        features.rows().map(|row| self.predict(row)).collect()
    }
}

fn check_training_set(features: &FeatureMatrix, targets: &[f64]) -> Result<(), EstimatorError> {
    if features.n_rows() == 0 {
        return Err(EstimatorError::EmptyTrainingSet);
    }
    if features.n_rows() != targets.len() {
        return Err(EstimatorError::DimensionMismatch {
            expected: features.n_rows(),
            actual: targets.len(),
        });
    }
    Ok(())
}

// ── Last close ───────────────────────────────────────────────────────

/// Persistence baseline: tomorrow's close equals today's close.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LastClose {
    close_index: Option<usize>,
    width: usize,
}

impl Estimator for LastClose {
    fn name(&self) -> &str {
        "last_close"
    }

    fn fit(&mut self, features: &FeatureMatrix, targets: &[f64]) -> Result<(), EstimatorError> {
        check_training_set(features, targets)?;
        let idx = features
            .column_index("close")
            .ok_or_else(|| EstimatorError::MissingColumn("close".into()))?;
        self.close_index = Some(idx);
        self.width = features.n_cols();
        Ok(())
    }

    fn predict(&self, row: &[f64]) -> Result<f64, EstimatorError> {
        let idx = self
            .close_index
            .ok_or_else(|| EstimatorError::NotFitted(self.name().into()))?;
        if row.len() != self.width {
            return Err(EstimatorError::DimensionMismatch {
                expected: self.width,
                actual: row.len(),
            });
        }
        Ok(row[idx])
    }
}

// ── Ridge ────────────────────────────────────────────────────────────

/// L2-regularized linear regression on standardized features.
///
/// Features are scaled by their training mean and standard deviation
/// (constant columns keep a scale of 1 and a weight of 0). The target is centered, so the
/// intercept is the training mean of the target and is not penalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ridge {
    lambda: f64,
    means: Vec<f64>,
    scales: Vec<f64>,
    weights: Vec<f64>,
    intercept: f64,
    fitted: bool,
}

impl Ridge {
    pub fn new(lambda: f64) -> Self {
        Self {
            lambda,
            means: Vec::new(),
            scales: Vec::new(),
            weights: Vec::new(),
            intercept: 0.0,
            fitted: false,
        }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl Estimator for Ridge {
    fn name(&self) -> &str {
        "ridge"
    }

    fn fit(&mut self, features: &FeatureMatrix, targets: &[f64]) -> Result<(), EstimatorError> {
        check_training_set(features, targets)?;
        let n = features.n_rows();
        let p = features.n_cols();

        let mut means = vec![0.0; p];
        for row in features.rows() {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v;
            }
        }
        means.iter_mut().for_each(|m| *m /= n as f64);

        let mut scales = vec![0.0; p];
        for row in features.rows() {
            for j in 0..p {
                scales[j] += (row[j] - means[j]).powi(2);
            }
        }
        let mut constant = vec![false; p];
        for (s, c) in scales.iter_mut().zip(constant.iter_mut()) {
            let sd = (*s / n as f64).sqrt();
            *c = sd <= 1e-12;
            *s = if *c { 1.0 } else { sd };
        }

        let y_mean = targets.iter().sum::<f64>() / n as f64;

        // Normal equations: (ZᵀZ + λI) w = Zᵀ(y - ȳ)
        let mut a = vec![vec![0.0; p]; p];
        let mut b = vec![0.0; p];
        let mut z = vec![0.0; p];
        for (row, &y) in features.rows().zip(targets) {
            for j in 0..p {
                z[j] = if constant[j] { 0.0 } else { (row[j] - means[j]) / scales[j] };
            }
            let yc = y - y_mean;
            for i in 0..p {
                b[i] += z[i] * yc;
                for k in i..p {
                    a[i][k] += z[i] * z[k];
                }
            }
        }
        for i in 0..p {
            for k in 0..i {
                a[i][k] = a[k][i];
            }
            a[i][i] += self.lambda;
        }
        // Constant columns get weight 0.
        for (j, _) in constant.iter().enumerate().filter(|(_, c)| **c) {
            a[j][j] = 1.0;
        }

        self.weights = solve(a, b)?;
        self.means = means;
        self.scales = scales;
        self.intercept = y_mean;
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, row: &[f64]) -> Result<f64, EstimatorError> {
        if !self.fitted {
            return Err(EstimatorError::NotFitted(self.name().into()));
        }
        if row.len() != self.weights.len() {
            return Err(EstimatorError::DimensionMismatch {
                expected: self.weights.len(),
                actual: row.len(),
            });
        }
        let dot: f64 = row
            .iter()
            .zip(&self.means)
            .zip(&self.scales)
            .zip(&self.weights)
            .map(|(((x, m), s), w)| (x - m) / s * w)
            .sum();
        Ok(self.intercept + dot)
    }
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, EstimatorError> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < 1e-12 {
            return Err(EstimatorError::Singular);
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let tail: f64 = ((i + 1)..n).map(|k| a[i][k] * x[k]).sum();
        x[i] = (b[i] - tail) / a[i][i];
    }
    Ok(x)
}

// ── Ensemble ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleMember {
    pub weight: f64,
    pub model: Model,
}

/// Weighted average of member predictions. Weights are normalized to sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedEnsemble {
    members: Vec<EnsembleMember>,
}

impl WeightedEnsemble {
    pub fn new(members: Vec<(f64, Model)>) -> Result<Self, EstimatorError> {
        let total: f64 = members.iter().map(|(w, _)| w).sum();
        if members.is_empty() || members.iter().any(|(w, _)| !(*w >= 0.0)) || !(total > 0.0) {
            return Err(EstimatorError::InvalidWeights);
        }
        Ok(Self {
            members: members
                .into_iter()
                .map(|(w, model)| EnsembleMember {
                    weight: w / total,
                    model,
                })
                .collect(),
        })
    }

    pub fn members(&self) -> &[EnsembleMember] {
        &self.members
    }
}

impl Estimator for WeightedEnsemble {
    fn name(&self) -> &str {
        "ensemble"
    }

    fn fit(&mut self, features: &FeatureMatrix, targets: &[f64]) -> Result<(), EstimatorError> {
        for member in &mut self.members {
            member.model.fit(features, targets)?;
        }
        Ok(())
    }

    fn predict(&self, row: &[f64]) -> Result<f64, EstimatorError> {
        let mut total = 0.0;
        for member in &self.members {
            total += member.weight * member.model.predict(row)?;
        }
        Ok(total)
    }
}

// ── Serializable model ───────────────────────────────────────────────

/// Every persisted estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Model {
    LastClose(LastClose),
    Ridge(Ridge),
    Ensemble(WeightedEnsemble),
}

impl Model {
    fn inner(&self) -> &dyn Estimator {
        match self {
            Model::LastClose(m) => m,
            Model::Ridge(m) => m,
            Model::Ensemble(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Estimator {
        match self {
            Model::LastClose(m) => m,
            Model::Ridge(m) => m,
            Model::Ensemble(m) => m,
        }
    }
}

impl Estimator for Model {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn fit(&mut self, features: &FeatureMatrix, targets: &[f64]) -> Result<(), EstimatorError> {
        self.inner_mut().fit(features, targets)
    }

    fn predict(&self, row: &[f64]) -> Result<f64, EstimatorError> {
        self.inner().predict(row)
    }
}
