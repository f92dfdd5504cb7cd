//! The unified frame: one row per trading date, columns from every source.

use chrono::NaiveDate;

use super::schema::ColumnKind;
use super::source::SourceReport;
use crate::error::PipelineError;

/// A fully filled frame column.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameColumn {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<f64>,
    /// Row index of the latest observation each cell depends on. `None`
    /// marks a neutral fill, which depends on nothing.
    pub observed_at: Vec<Option<usize>>,
}

impl FrameColumn {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether row `t` holds a neutral fill rather than an observation.
    pub fn is_filled(&self, t: usize) -> bool {
        self.observed_at.get(t).is_some_and(|o| o.is_none())
    }
}

/// Rows indexed by the trading calendar (the price series dates).
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedFrame {
    dates: Vec<NaiveDate>,
    columns: Vec<FrameColumn>,
    sources: Vec<SourceReport>,
}

impl UnifiedFrame {
    pub fn new(dates: Vec<NaiveDate>, sources: Vec<SourceReport>) -> Self {
        Self {
            dates,
            columns: Vec::new(),
            sources,
        }
    }

    /// Append a column. Its length must equal the row count and its name
    /// must not already be present.
    pub fn push_column(&mut self, column: FrameColumn) -> Result<(), PipelineError> {
        if column.values.len() != self.dates.len() || column.observed_at.len() != self.dates.len() {
            return Err(PipelineError::ColumnLength {
                name: column.name,
                expected: self.dates.len(),
                actual: column.values.len().min(column.observed_at.len()),
            });
        }
        if self.column(&column.name).is_some() {
            return Err(PipelineError::InvalidConfig(format!(
                "duplicate column '{}'",
                column.name
            )));
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[FrameColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&FrameColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn sources(&self) -> &[SourceReport] {
        &self.sources
    }
}
