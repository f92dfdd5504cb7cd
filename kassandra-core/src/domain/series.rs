//! DailySeries: an ordered, duplicate-free sequence of dated records from one source.

use chrono::NaiveDate;
use thiserror::Error;

/// Anything keyed by a calendar date.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

/// Structural errors in a daily series.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("duplicate date {date} in series")]
    DuplicateDate { date: NaiveDate },

    #[error("series out of order: {date} follows {previous}")]
    OutOfOrder {
        previous: NaiveDate,
        date: NaiveDate,
    },
}

/// Records for a single signal source, strictly increasing by date.
///
/// Produced once by a collector and consumed read-only by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries<T: Dated + Clone> {
    records: Vec<T>,
}

impl<T: Dated + Clone> DailySeries<T> {
    /// Build a series, rejecting duplicate or out-of-order dates.
    pub fn new(records: Vec<T>) -> Result<Self, SeriesError> {
        for pair in records.windows(2) {
            let previous = pair[0].date();
            let date = pair[1].date();
            if date == previous {
                return Err(SeriesError::DuplicateDate { date });
            }
            if date < previous {
                return Err(SeriesError::OutOfOrder { previous, date });
            }
        }
        Ok(Self { records })
    }

    /// Sort records by date, then validate. Duplicates are still an error.
    pub fn from_unsorted(mut records: Vec<T>) -> Result<Self, SeriesError> {
        records.sort_by_key(|r| r.date());
        Self::new(records)
    }

    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date())
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date())
    }

    /// Look up the record for an exact date.
    pub fn get(&self, date: NaiveDate) -> Option<&T> {
        self.records
            .binary_search_by_key(&date, |r| r.date())
            .ok()
            .map(|i| &self.records[i])
    }

    /// Records with `start <= date <= end`.
    pub fn range(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            records: self
                .records
                .iter()
                .filter(|r| r.date() >= start && r.date() <= end)
                .cloned()
                .collect(),
        }
    }

    /// Records dated on or before `as_of`.
    pub fn truncate_after(&self, as_of: NaiveDate) -> Self {
        let cut = self.records.partition_point(|r| r.date() <= as_of);
        Self {
            records: self.records[..cut].to_vec(),
        }
    }
}

impl<T: Dated + Clone> Default for DailySeries<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Dated + Clone> TryFrom<Vec<T>> for DailySeries<T> {
    type Error = SeriesError;

    fn try_from(records: Vec<T>) -> Result<Self, Self::Error> {
        Self::new(records)
    }
}

impl<T: Dated + Clone> From<DailySeries<T>> for Vec<T> {
    fn from(series: DailySeries<T>) -> Self {
        series.records
    }
}
