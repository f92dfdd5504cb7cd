//! Lag transformer.
//!
//! `<col>_lag_<k>` at row t is the value of `<col>` at row t-k, counted in
//! trading rows, not calendar days. Rows with t < k are undefined and get the
//! neutral fill.

use super::config::LagConfig;
use super::fill::fill_derived;
use super::frame::{FrameColumn, UnifiedFrame};
use super::schema::ColumnKind;

pub fn lag_column_name(base: &str, lag: usize) -> String {
    format!("{base}_lag_{lag}")
}

/// Shift `column` back by `lag` rows, carrying observation indices with it.
pub fn lag_column(column: &FrameColumn, lag: usize) -> FrameColumn {
    let n = column.len();
    let mut values = vec![f64::NAN; n];
    let mut observed_at = vec![None; n];
    for t in lag..n {
        values[t] = column.values[t - lag];
        observed_at[t] = column.observed_at[t - lag];
    }
    let kind = match column.kind {
        ColumnKind::Signal { source } => ColumnKind::Lagged { source, lag },
        other => other,
    };
    fill_derived(&lag_column_name(&column.name, lag), kind, values, observed_at)
}

/// Lag every same-day signal column in `frame` by each configured lag.
pub fn lag_columns(frame: &UnifiedFrame, config: &LagConfig) -> Vec<FrameColumn> {
    let lags = config.sorted_lags();
    frame
        .columns()
        .iter()
        .filter(|c| matches!(c.kind, ColumnKind::Signal { .. }))
        .flat_map(|c| lags.iter().map(move |&k| lag_column(c, k)))
        .collect()
}
