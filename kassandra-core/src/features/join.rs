//! Calendar joiner: align every source onto the price trading calendar.
//!
//! The price series alone defines the row index. A secondary record lands on
//! a row only when its date exactly equals that row's date; records on
//! weekends, holidays or any other non-trading date are dropped and counted.
//! No value is ever carried forward from an earlier date at this stage.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::source::{SignalSource, SourceFeed, SourceInputs, SourceReport, SourceStatus};
use crate::domain::{Dated, PriceBar, SentimentAggregate, SentimentField, TrendScore};
use crate::error::PipelineError;

/// One secondary column before the missing-data policy runs.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalCells {
    pub name: String,
    pub source: SignalSource,
    /// `Some(v)` where a record was observed on that trading date.
    pub cells: Vec<Option<f64>>,
}

/// Output of the join: the calendar, the bars, and unfilled signal cells.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedFrame {
    pub dates: Vec<NaiveDate>,
    pub bars: Vec<PriceBar>,
    pub signals: Vec<SignalCells>,
    pub sources: Vec<SourceReport>,
}

pub fn join_sources(inputs: &SourceInputs) -> Result<JoinedFrame, PipelineError> {
    let bars = inputs.prices.records();
    if bars.is_empty() {
        return Err(PipelineError::EmptyPriceSeries);
    }
    if let Some(bar) = bars.iter().find(|b| b.is_void()) {
        return Err(PipelineError::VoidPriceBar { date: bar.date });
    }

    let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
    let calendar: HashMap<NaiveDate, usize> =
        dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

    let mut signals = Vec::new();
    let mut sources = Vec::with_capacity(SignalSource::ALL.len());

    for source in SignalSource::ALL {
        let (columns, status) = match source {
            SignalSource::News => {
                join_sentiment(&inputs.news, SentimentField::NEWS, source, &calendar)
            }
            SignalSource::Reddit => {
                join_sentiment(&inputs.reddit, SentimentField::REDDIT, source, &calendar)
            }
            SignalSource::Trends => join_trends(&inputs.trends, &calendar),
        };
        match &status {
            SourceStatus::Unavailable { reason } => {
                warn!(source = %source, %reason, "source unavailable; neutral-filling its columns")
            }
            SourceStatus::Observed {
                matched,
                off_calendar,
            } => debug!(source = %source, matched, off_calendar, "joined source"),
            SourceStatus::Empty => debug!(source = %source, "source returned no records"),
        }
        signals.extend(columns);
        sources.push(SourceReport { source, status });
    }

    Ok(JoinedFrame {
        dates,
        bars: bars.to_vec(),
        signals,
        sources,
    })
}

fn join_sentiment(
    feed: &SourceFeed<SentimentAggregate>,
    fields: &[SentimentField],
    source: SignalSource,
    calendar: &HashMap<NaiveDate, usize>,
) -> (Vec<SignalCells>, SourceStatus) {
    let names = source.base_columns();
    join_records(feed, calendar, names, source, |rec, i| rec.field(fields[i]))
}

fn join_trends(
    feed: &SourceFeed<TrendScore>,
    calendar: &HashMap<NaiveDate, usize>,
) -> (Vec<SignalCells>, SourceStatus) {
    let source = SignalSource::Trends;
    join_records(feed, calendar, source.base_columns(), source, |rec, _| {
        rec.search_interest
    })
}

/// Place each record's column values on its trading row. `value(rec, i)`
/// reads column `i` of `names` from a record.
fn join_records<T, F>(
    feed: &SourceFeed<T>,
    calendar: &HashMap<NaiveDate, usize>,
    names: Vec<String>,
    source: SignalSource,
    value: F,
) -> (Vec<SignalCells>, SourceStatus)
where
    T: Dated + Clone,
    F: Fn(&T, usize) -> f64,
{
    let n = calendar.len();
    let mut columns: Vec<SignalCells> = names
        .into_iter()
        .map(|name| SignalCells {
            name,
            source,
            cells: vec![None; n],
        })
        .collect();

    let series = match feed {
        SourceFeed::Unavailable { reason } => {
            return (
                columns,
                SourceStatus::Unavailable {
                    reason: reason.clone(),
                },
            )
        }
        SourceFeed::Observed(series) => series,
    };
    if series.is_empty() {
        return (columns, SourceStatus::Empty);
    }

    let mut matched = 0;
    let mut off_calendar = 0;
    for record in series.records() {
        let Some(&row) = calendar.get(&record.date()) else {
            off_calendar += 1;
            continue;
        };
        matched += 1;
        for (i, col) in columns.iter_mut().enumerate() {
            let v = value(record, i);
            // A non-finite value carries no signal; leave the cell missing.
            if v.is_finite() {
                col.cells[row] = Some(v);
            }
        }
    }

    (
        columns,
        SourceStatus::Observed {
            matched,
            off_calendar,
        },
    )
}
