//! Target construction and the leakage check.

use super::frame::UnifiedFrame;
use super::schema::FeatureSchema;
use crate::error::PipelineError;

pub const TARGET_COLUMN: &str = "target";

/// Next trading date's close for every row; the last row has no target.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetColumn {
    pub values: Vec<Option<f64>>,
    pub observed_at: Vec<Option<usize>>,
}

impl TargetColumn {
    /// Rows that carry a target.
    pub fn defined_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(t, v)| v.map(|_| t))
    }
}

pub fn construct_targets(frame: &UnifiedFrame) -> Result<TargetColumn, PipelineError> {
    let close = frame.column("close").ok_or_else(|| {
        PipelineError::schema_mismatch(
            vec!["close".to_string()],
            frame.columns().iter().map(|c| c.name.clone()).collect(),
        )
    })?;
    let n = close.len();
    let mut values = vec![None; n];
    let mut observed_at = vec![None; n];
    for t in 0..n.saturating_sub(1) {
        values[t] = Some(close.values[t + 1]);
        observed_at[t] = Some(t + 1);
    }
    Ok(TargetColumn {
        values,
        observed_at,
    })
}

/// Check that no feature cell depends on anything after its own row, and
/// that every defined target comes from exactly the next row.
pub fn validate_no_leakage(
    frame: &UnifiedFrame,
    schema: &FeatureSchema,
    targets: Option<&TargetColumn>,
) -> Result<(), PipelineError> {
    let dates = frame.dates();
    if dates.is_empty() {
        return Ok(());
    }
    let date_of = |i: usize| dates.get(i).copied().unwrap_or(dates[dates.len() - 1]);

    for spec in &schema.columns {
        let Some(column) = frame.column(&spec.name) else {
            continue;
        };
        for (t, obs) in column.observed_at.iter().enumerate() {
            if let Some(o) = *obs {
                if o > t {
                    return Err(PipelineError::LeakageViolation {
                        column: spec.name.clone(),
                        date: dates[t],
                        observed: date_of(o),
                    });
                }
            }
        }
    }

    if let Some(targets) = targets {
        for t in targets.defined_rows() {
            let obs = targets.observed_at[t];
            if obs != Some(t + 1) {
                return Err(PipelineError::LeakageViolation {
                    column: TARGET_COLUMN.to_string(),
                    date: dates[t],
                    observed: obs.map_or(dates[t], date_of),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DailySeries;
    use crate::features::fill::fill_joined;
    use crate::features::frame::FrameColumn;
    use crate::features::join::join_sources;
    use crate::features::schema::ColumnKind;
    use crate::features::source::SourceInputs;
    use crate::features::FeatureConfig;
    use crate::indicators::make_bars;

    fn frame(closes: &[f64]) -> UnifiedFrame {
        let inputs = SourceInputs::prices_only(DailySeries::new(make_bars(closes)).unwrap());
        fill_joined(&join_sources(&inputs).unwrap()).unwrap()
    }

    #[test]
    fn target_is_next_close() {
        let targets = construct_targets(&frame(&[10.0, 11.0, 12.0])).unwrap();
        assert_eq!(targets.values, vec![Some(11.0), Some(12.0), None]);
        assert_eq!(targets.defined_rows().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn single_row_has_no_target() {
        let targets = construct_targets(&frame(&[10.0])).unwrap();
        assert_eq!(targets.values, vec![None]);
    }

    #[test]
    fn clean_frame_passes() {
        let f = frame(&[10.0, 11.0, 12.0]);
        let schema = FeatureSchema::from_config(&FeatureConfig::default()).unwrap();
        let targets = construct_targets(&f).unwrap();
        assert!(validate_no_leakage(&f, &schema, Some(&targets)).is_ok());
    }

    #[test]
    fn forward_dependency_detected() {
        let mut f = frame(&[10.0, 11.0, 12.0]);
        let mut schema = FeatureSchema::from_config(&FeatureConfig::default()).unwrap();
        f.push_column(FrameColumn {
            name: "peek".into(),
            kind: ColumnKind::Indicator,
            values: vec![11.0, 12.0, 0.0],
            observed_at: vec![Some(1), Some(2), None],
        })
        .unwrap();
        schema.columns.push(schema.columns[5].clone());
        schema.columns.last_mut().unwrap().name = "peek".into();

        let err = validate_no_leakage(&f, &schema, None).unwrap_err();
        match err {
            PipelineError::LeakageViolation {
                column,
                date,
                observed,
            } => {
                assert_eq!(column, "peek");
                assert_eq!(date, f.dates()[0]);
                assert_eq!(observed, f.dates()[1]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn misaligned_target_detected() {
        let f = frame(&[10.0, 11.0, 12.0]);
        let schema = FeatureSchema::from_config(&FeatureConfig::default()).unwrap();
        let mut targets = construct_targets(&f).unwrap();
        targets.observed_at[0] = Some(2);
        assert!(matches!(
            validate_no_leakage(&f, &schema, Some(&targets)),
            Err(PipelineError::LeakageViolation { column, .. }) if column == TARGET_COLUMN
        ));
    }
}
