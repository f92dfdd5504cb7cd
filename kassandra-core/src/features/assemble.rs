//! Dataset assembler: compose the pipeline stages into a training dataset or
//! a single live feature row.

use std::ops::Range;

use chrono::NaiveDate;
use tracing::{debug, info};

use super::config::FeatureConfig;
use super::fill::fill_joined;
use super::frame::UnifiedFrame;
use super::join::join_sources;
use super::lag::lag_columns;
use super::schema::FeatureSchema;
use super::source::{SourceInputs, SourceReport};
use super::target::{construct_targets, validate_no_leakage};
use super::technical::compute_indicators;
use crate::error::PipelineError;
use crate::fingerprint::DatasetHash;

/// Row-major feature matrix with named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    data: Vec<f64>,
    n_rows: usize,
}

impl FeatureMatrix {
    /// Build from row-major data. `data.len()` must equal rows x columns.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self, PipelineError> {
        let n_cols = columns.len();
        let n_rows = rows.len();
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(PipelineError::ColumnLength {
                    name: format!("row {i}"),
                    expected: n_cols,
                    actual: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            columns,
            data,
            n_rows,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row(&self, i: usize) -> &[f64] {
        let w = self.n_cols();
        &self.data[i * w..(i + 1) * w]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.n_rows).map(move |i| self.row(i))
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Copy of one column's values.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let j = self.column_index(name)?;
        Some(self.rows().map(|r| r[j]).collect())
    }

    pub fn get(&self, row: usize, name: &str) -> Option<f64> {
        let j = self.column_index(name)?;
        (row < self.n_rows).then(|| self.row(row)[j])
    }

    /// Row-major values.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    fn slice_rows(&self, range: Range<usize>) -> Self {
        let w = self.n_cols();
        Self {
            columns: self.columns.clone(),
            data: self.data[range.start * w..range.end * w].to_vec(),
            n_rows: range.len(),
        }
    }
}

/// Supervised dataset: one row per trading date that has a next-day target.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub schema: FeatureSchema,
    pub features: FeatureMatrix,
    pub targets: Vec<f64>,
    pub dates: Vec<NaiveDate>,
    pub sources: Vec<SourceReport>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Contiguous row range as a new dataset. Panics if out of bounds.
    pub fn slice(&self, range: Range<usize>) -> Self {
        Self {
            schema: self.schema.clone(),
            features: self.features.slice_rows(range.clone()),
            targets: self.targets[range.clone()].to_vec(),
            dates: self.dates[range].to_vec(),
            sources: self.sources.clone(),
        }
    }

    pub fn fingerprint(&self) -> DatasetHash {
        DatasetHash::of_dataset(self)
    }
}

/// Feature values for one date, for live inference.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub schema: FeatureSchema,
    pub values: Vec<f64>,
    pub sources: Vec<SourceReport>,
}

impl FeatureRow {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.index_of(name).map(|i| self.values[i])
    }
}

/// Join, fill, and extend with indicator and lag columns.
pub fn build_frame(
    inputs: &SourceInputs,
    config: &FeatureConfig,
) -> Result<UnifiedFrame, PipelineError> {
    config.validate()?;
    let joined = join_sources(inputs)?;
    let mut frame = fill_joined(&joined)?;

    let indicators = compute_indicators(&joined.bars, &config.indicators);
    let lags = lag_columns(&frame, &config.lags);
    debug!(
        rows = frame.len(),
        indicators = indicators.len(),
        lags = lags.len(),
        "computed derived columns"
    );
    for column in indicators.into_iter().chain(lags) {
        frame.push_column(column)?;
    }
    Ok(frame)
}

/// Build the supervised dataset. Every calendar row except the last (which
/// has no next-day close) becomes a training row.
pub fn build_dataset(
    inputs: &SourceInputs,
    config: &FeatureConfig,
) -> Result<Dataset, PipelineError> {
    let schema = FeatureSchema::from_config(config)?;
    let frame = build_frame(inputs, config)?;
    let targets = construct_targets(&frame)?;
    validate_no_leakage(&frame, &schema, Some(&targets))?;

    let rows: Vec<usize> = targets.defined_rows().collect();
    let features = gather(&frame, &schema, &rows)?;
    let target_values = rows.iter().filter_map(|&t| targets.values[t]).collect();
    let dates = rows.iter().map(|&t| frame.dates()[t]).collect();

    let dataset = Dataset {
        schema,
        features,
        targets: target_values,
        dates,
        sources: frame.sources().to_vec(),
    };
    info!(
        rows = dataset.len(),
        columns = dataset.features.n_cols(),
        calendar = frame.len(),
        "assembled dataset"
    );
    Ok(dataset)
}

/// Build the feature row for the last trading date on or before `as_of`,
/// using only records dated on or before `as_of`.
pub fn build_feature_row(
    inputs: &SourceInputs,
    as_of: NaiveDate,
    config: &FeatureConfig,
) -> Result<FeatureRow, PipelineError> {
    if inputs.prices.is_empty() {
        return Err(PipelineError::EmptyPriceSeries);
    }
    let visible = inputs.truncate_after(as_of);
    if visible.prices.is_empty() {
        return Err(PipelineError::NoTradingDateBefore { as_of });
    }

    let schema = FeatureSchema::from_config(config)?;
    let frame = build_frame(&visible, config)?;
    validate_no_leakage(&frame, &schema, None)?;

    let last = frame.len() - 1;
    let matrix = gather(&frame, &schema, &[last])?;
    let date = frame.dates()[last];
    debug!(%as_of, %date, "built live feature row");

    Ok(FeatureRow {
        date,
        values: matrix.row(0).to_vec(),
        schema,
        sources: frame.sources().to_vec(),
    })
}

/// [`build_feature_row`], then require its schema to equal `expected`.
pub fn build_feature_row_checked(
    inputs: &SourceInputs,
    as_of: NaiveDate,
    config: &FeatureConfig,
    expected: &FeatureSchema,
) -> Result<FeatureRow, PipelineError> {
    let row = build_feature_row(inputs, as_of, config)?;
    expected.ensure_matches(&row.schema)?;
    Ok(row)
}

/// Extract schema columns at the given rows. Every cell must be finite.
fn gather(
    frame: &UnifiedFrame,
    schema: &FeatureSchema,
    rows: &[usize],
) -> Result<FeatureMatrix, PipelineError> {
    let mut columns = Vec::with_capacity(schema.len());
    for spec in &schema.columns {
        let column = frame.column(&spec.name).ok_or_else(|| {
            PipelineError::schema_mismatch(
                schema.names(),
                frame.columns().iter().map(|c| c.name.clone()).collect(),
            )
        })?;
        columns.push(column);
    }

    let mut out = Vec::with_capacity(rows.len());
    for &t in rows {
        let mut row = Vec::with_capacity(columns.len());
        for column in &columns {
            let v = column.values[t];
            if !v.is_finite() {
                return Err(PipelineError::UndefinedCell {
                    column: column.name.clone(),
                    date: frame.dates()[t],
                });
            }
            row.push(v);
        }
        out.push(row);
    }
    FeatureMatrix::from_rows(schema.names(), out)
}
