//! Feature schema: the ordered column list shared by training and inference.

use serde::{Deserialize, Serialize};

use super::config::FeatureConfig;
use super::lag::lag_column_name;
use super::source::SignalSource;
use super::technical::indicator_set;
use crate::error::PipelineError;

/// Current schema layout version.
pub const SCHEMA_VERSION: u32 = 1;

/// Price columns, in canonical order.
pub const PRICE_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

/// What produced a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnKind {
    Price,
    Indicator,
    /// Same-day value of a secondary source.
    Signal { source: SignalSource },
    /// Value of a secondary source `lag` trading dates earlier.
    Lagged { source: SignalSource, lag: usize },
}

/// How missing cells in a column are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPolicy {
    /// Never filled; a missing cell is an error.
    Never,
    /// Missing cells become 0.0.
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: ColumnKind,
    pub fill: FillPolicy,
}

impl ColumnSpec {
    fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        let fill = match kind {
            ColumnKind::Price => FillPolicy::Never,
            _ => FillPolicy::Neutral,
        };
        Self {
            name: name.into(),
            kind,
            fill,
        }
    }
}

/// The ordered list of feature columns a config produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub version: u32,
    pub columns: Vec<ColumnSpec>,
}

impl FeatureSchema {
    /// Derive the schema a config yields. Pure: depends on nothing but the config.
    ///
    /// Order: price columns, indicators, then for each source (news, reddit,
    /// trends) and each of its fields the same-day column when enabled
    /// followed by its lags ascending.
    pub fn from_config(config: &FeatureConfig) -> Result<Self, PipelineError> {
        config.validate()?;

        let mut columns: Vec<ColumnSpec> = PRICE_COLUMNS
            .iter()
            .map(|name| ColumnSpec::new(*name, ColumnKind::Price))
            .collect();

        columns.extend(
            indicator_set(&config.indicators)
                .iter()
                .map(|ind| ColumnSpec::new(ind.name(), ColumnKind::Indicator)),
        );

        let lags = config.lags.sorted_lags();
        for source in SignalSource::ALL {
            for base in source.base_columns() {
                if config.lags.include_same_day {
                    columns.push(ColumnSpec::new(base.clone(), ColumnKind::Signal { source }));
                }
                for &lag in &lags {
                    columns.push(ColumnSpec::new(
                        lag_column_name(&base, lag),
                        ColumnKind::Lagged { source, lag },
                    ));
                }
            }
        }

        Ok(Self {
            version: SCHEMA_VERSION,
            columns,
        })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Error unless `actual` has the same column names in the same order.
    pub fn ensure_matches(&self, actual: &FeatureSchema) -> Result<(), PipelineError> {
        let same = self.columns.len() == actual.columns.len()
            && self
                .columns
                .iter()
                .zip(&actual.columns)
                .all(|(a, b)| a.name == b.name);
        if same {
            Ok(())
        } else {
            Err(PipelineError::schema_mismatch(self.names(), actual.names()))
        }
    }

    /// Stable content hash of the column layout.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.version.to_le_bytes());
        for col in &self.columns {
            hasher.update(col.name.as_bytes());
            hasher.update(&[0]);
        }
        hasher.finalize().to_hex().to_string()
    }
}
