//! Search-interest trend scores.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::series::{DailySeries, Dated, SeriesError};

/// Normalized search interest for one date, in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendScore {
    pub date: NaiveDate,
    pub search_interest: f64,
}

impl Dated for TrendScore {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Raw search volume as reported by a trends provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSearchVolume {
    pub date: NaiveDate,
    pub volume: f64,
}

/// Scale raw volumes into [0, 1] by the series maximum.
///
/// A non-positive maximum yields all zeros. Non-finite volumes are treated as 0.
pub fn normalize_search_volume(
    raw: &[RawSearchVolume],
) -> Result<DailySeries<TrendScore>, SeriesError> {
    let clean = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
    let max = raw.iter().map(|r| clean(r.volume)).fold(0.0, f64::max);
    let scores = raw
        .iter()
        .map(|r| TrendScore {
            date: r.date,
            search_interest: if max > 0.0 { clean(r.volume) / max } else { 0.0 },
        })
        .collect();
    DailySeries::from_unsorted(scores)
}
