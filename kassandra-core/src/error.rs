//! Pipeline error taxonomy.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::SeriesError;

/// Fatal errors raised by the feature pipeline.
///
/// Source-unavailable conditions for sentiment and trend feeds are not errors:
/// they degrade to neutral-filled columns and are recorded as provenance.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("price series is empty: no trading calendar can be derived")]
    EmptyPriceSeries,

    #[error("no trading date on or before {as_of}")]
    NoTradingDateBefore { as_of: NaiveDate },

    #[error("price bar on {date} has non-finite OHLC values")]
    VoidPriceBar { date: NaiveDate },

    #[error("leakage violation: column '{column}' at {date} depends on an observation from {observed}")]
    LeakageViolation {
        column: String,
        date: NaiveDate,
        observed: NaiveDate,
    },

    #[error("schema mismatch: {detail}")]
    SchemaMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
        detail: String,
    },

    #[error("undefined cell in column '{column}' at {date}")]
    UndefinedCell { column: String, date: NaiveDate },

    #[error("column '{name}' has {actual} rows, frame has {expected}")]
    ColumnLength {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid feature configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid series: {0}")]
    Series(#[from] SeriesError),
}

impl PipelineError {
    /// Build a `SchemaMismatch`, describing the first point of divergence.
    pub fn schema_mismatch(expected: Vec<String>, actual: Vec<String>) -> Self {
        let detail = match expected
            .iter()
            .zip(&actual)
            .position(|(e, a)| e != a)
        {
            Some(i) => format!(
                "column {i}: expected '{}', got '{}'",
                expected[i], actual[i]
            ),
            None => format!(
                "expected {} columns, got {}",
                expected.len(),
                actual.len()
            ),
        };
        Self::SchemaMismatch {
            expected,
            actual,
            detail,
        }
    }
}
