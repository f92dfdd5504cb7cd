//! Missing-data policy.
//!
//! Price columns are never filled. Signal cells with no observation and
//! undefined derived cells (indicator warmups, lags reaching before the first
//! row) become the neutral value 0.0 and lose their observation index.
//! Nothing is forward-filled.

use super::frame::{FrameColumn, UnifiedFrame};
use super::join::JoinedFrame;
use super::schema::{ColumnKind, PRICE_COLUMNS};
use crate::domain::PriceBar;
use crate::error::PipelineError;

pub const NEUTRAL: f64 = 0.0;

/// Turn a joined frame into a unified frame holding the price columns and
/// the neutral-filled same-day signal columns.
pub fn fill_joined(joined: &JoinedFrame) -> Result<UnifiedFrame, PipelineError> {
    let mut frame = UnifiedFrame::new(joined.dates.clone(), joined.sources.clone());
    let observed: Vec<Option<usize>> = (0..joined.bars.len()).map(Some).collect();

    for name in PRICE_COLUMNS {
        frame.push_column(FrameColumn {
            name: name.to_string(),
            kind: ColumnKind::Price,
            values: joined.bars.iter().map(|b| price_field(b, name)).collect(),
            observed_at: observed.clone(),
        })?;
    }

    for signal in &joined.signals {
        let (values, observed_at): (Vec<f64>, Vec<Option<usize>>) = signal
            .cells
            .iter()
            .enumerate()
            .map(|(t, cell)| match cell {
                Some(v) => (*v, Some(t)),
                None => (NEUTRAL, None),
            })
            .unzip();
        frame.push_column(FrameColumn {
            name: signal.name.clone(),
            kind: ColumnKind::Signal {
                source: signal.source,
            },
            values,
            observed_at,
        })?;
    }

    Ok(frame)
}

/// Build a derived column, replacing undefined (NaN) cells with the neutral
/// value and clearing their observation index.
pub fn fill_derived(
    name: &str,
    kind: ColumnKind,
    mut values: Vec<f64>,
    mut observed_at: Vec<Option<usize>>,
) -> FrameColumn {
    for (v, obs) in values.iter_mut().zip(observed_at.iter_mut()) {
        if !v.is_finite() {
            *v = NEUTRAL;
            *obs = None;
        }
    }
    FrameColumn {
        name: name.to_string(),
        kind,
        values,
        observed_at,
    }
}

fn price_field(bar: &PriceBar, name: &str) -> f64 {
    match name {
        "open" => bar.open,
        "high" => bar.high,
        "low" => bar.low,
        "close" => bar.close,
        _ => bar.volume as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DailySeries;
    use crate::features::join::join_sources;
    use crate::features::source::SourceInputs;
    use crate::indicators::make_bars;

    #[test]
    fn derived_nan_becomes_neutral() {
        let col = fill_derived(
            "x",
            ColumnKind::Indicator,
            vec![f64::NAN, 2.0, f64::INFINITY],
            vec![Some(0), Some(1), Some(2)],
        );
        assert_eq!(col.values, vec![0.0, 2.0, 0.0]);
        assert_eq!(col.observed_at, vec![None, Some(1), None]);
    }

    #[test]
    fn price_columns_copied_verbatim() {
        let bars = make_bars(&[10.0, 11.0, 12.5]);
        let inputs = SourceInputs::prices_only(DailySeries::new(bars).unwrap());
        let frame = fill_joined(&join_sources(&inputs).unwrap()).unwrap();

        let close = frame.column("close").unwrap();
        assert_eq!(close.values, vec![10.0, 11.0, 12.5]);
        assert_eq!(close.observed_at, vec![Some(0), Some(1), Some(2)]);
        assert_eq!(frame.column("volume").unwrap().values, vec![1000.0; 3]);
    }

    #[test]
    fn missing_signals_neutral() {
        let inputs = SourceInputs::prices_only(DailySeries::new(make_bars(&[1.0, 2.0])).unwrap());
        let frame = fill_joined(&join_sources(&inputs).unwrap()).unwrap();
        let col = frame.column("reddit_engagement").unwrap();
        assert_eq!(col.values, vec![0.0, 0.0]);
        assert!(col.is_filled(0) && col.is_filled(1));
    }
}
