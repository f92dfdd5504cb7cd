//! The feature pipeline.
//!
//! raw daily series -> join -> fill -> {indicators, lags} -> target -> assemble
//!
//! Every stage is a pure function of its inputs. The price series defines the
//! trading calendar; every other source is aligned to it by exact date match.

pub mod assemble;
pub mod config;
pub mod fill;
pub mod frame;
pub mod join;
pub mod lag;
pub mod schema;
pub mod source;
pub mod target;
pub mod technical;

pub use assemble::{
    build_dataset, build_feature_row, build_feature_row_checked, build_frame, Dataset,
    FeatureMatrix, FeatureRow,
};
pub use config::{FeatureConfig, IndicatorConfig, LagConfig};
pub use frame::{FrameColumn, UnifiedFrame};
pub use schema::{ColumnKind, ColumnSpec, FeatureSchema, FillPolicy, SCHEMA_VERSION};
pub use source::{SignalSource, SourceFeed, SourceInputs, SourceReport, SourceStatus};
pub use target::{construct_targets, validate_no_leakage, TargetColumn};
