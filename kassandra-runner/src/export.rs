//! Tabular exports: the processed feature table and the prediction log.
//!
//! - **Feature table**: one row per dataset row, `date`, every schema column
//!   in order, then `target`. Written as CSV and as Parquet.
//! - **Prediction log**: `Date,Actual_Closing_Price,Predicted_Closing_Price`.
//!   Training overwrites it with the held-out predictions; live predictions
//!   are appended with an empty actual.

use std::fs::{self, File, OpenOptions};
use std::path::Path;

use anyhow::{ensure, Context, Result};
use chrono::NaiveDate;
use polars::prelude::*;

use kassandra_core::features::target::TARGET_COLUMN;
use kassandra_core::Dataset;

pub const PREDICTION_LOG_HEADER: [&str; 3] =
    ["Date", "Actual_Closing_Price", "Predicted_Closing_Price"];

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

// ─── Feature table ──────────────────────────────────────────────────

/// Render the feature table as CSV.
pub fn feature_table_csv(dataset: &Dataset) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = Vec::with_capacity(dataset.features.n_cols() + 2);
    header.push("date".to_string());
    header.extend(dataset.features.columns().iter().cloned());
    header.push(TARGET_COLUMN.to_string());
    wtr.write_record(&header)?;

    for (i, date) in dataset.dates.iter().enumerate() {
        let mut record = Vec::with_capacity(header.len());
        record.push(date.to_string());
        record.extend(dataset.features.row(i).iter().map(|v| v.to_string()));
        record.push(dataset.targets[i].to_string());
        wtr.write_record(&record)?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

pub fn write_feature_table_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let csv = feature_table_csv(dataset)?;
    fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))
}

fn feature_table_dataframe(dataset: &Dataset) -> Result<DataFrame> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("invalid epoch")?;
    let days: Vec<i32> = dataset
        .dates
        .iter()
        .map(|d| (*d - epoch).num_days() as i32)
        .collect();

    let mut columns = Vec::with_capacity(dataset.features.n_cols() + 2);
    columns.push(
        Column::new("date".into(), days)
            .cast(&DataType::Date)
            .context("date cast")?,
    );
    for (j, name) in dataset.features.columns().iter().enumerate() {
        let values: Vec<f64> = dataset.features.rows().map(|row| row[j]).collect();
        columns.push(Column::new(name.as_str().into(), values));
    }
    columns.push(Column::new(TARGET_COLUMN.into(), dataset.targets.clone()));

    DataFrame::new(columns).context("dataframe creation")
}

pub fn write_feature_table_parquet(dataset: &Dataset, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let mut df = feature_table_dataframe(dataset)?;
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .with_context(|| format!("failed to write parquet {}", path.display()))?;
    Ok(())
}

// ─── Prediction log ─────────────────────────────────────────────────

/// One prediction log line. `actual` is empty until the close is known.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    pub date: NaiveDate,
    pub actual: Option<f64>,
    pub predicted: f64,
}

impl PredictionRecord {
    fn to_record(&self) -> [String; 3] {
        [
            self.date.to_string(),
            self.actual.map(|v| v.to_string()).unwrap_or_default(),
            self.predicted.to_string(),
        ]
    }
}

/// Replace the log with `records`.
pub fn write_prediction_log(path: &Path, records: &[PredictionRecord]) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut wtr = csv::Writer::from_writer(file);
    wtr.write_record(PREDICTION_LOG_HEADER)?;
    for r in records {
        wtr.write_record(r.to_record())?;
    }
    wtr.flush().context("failed to flush prediction log")?;
    Ok(())
}

/// Append one record, writing the header first if the log is new or empty.
pub fn append_prediction(path: &Path, record: &PredictionRecord) -> Result<()> {
    ensure_parent(path)?;
    let is_new = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut wtr = csv::Writer::from_writer(file);
    if is_new {
        wtr.write_record(PREDICTION_LOG_HEADER)?;
    }
    wtr.write_record(record.to_record())?;
    wtr.flush().context("failed to flush prediction log")?;
    Ok(())
}

pub fn read_prediction_log(path: &Path) -> Result<Vec<PredictionRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers = rdr.headers()?.clone();
    ensure!(
        headers.iter().eq(PREDICTION_LOG_HEADER),
        "unexpected prediction log header: {:?}",
        headers
    );

    let mut out = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let field = |i: usize| record.get(i).unwrap_or("");
        let date = NaiveDate::parse_from_str(field(0), "%Y-%m-%d")
            .with_context(|| format!("row {}: bad date '{}'", line + 1, field(0)))?;
        let actual = match field(1) {
            "" => None,
            s => Some(
                s.parse::<f64>()
                    .with_context(|| format!("row {}: bad actual '{s}'", line + 1))?,
            ),
        };
        let predicted = field(2)
            .parse::<f64>()
            .with_context(|| format!("row {}: bad prediction '{}'", line + 1, field(2)))?;
        out.push(PredictionRecord {
            date,
            actual,
            predicted,
        });
    }
    Ok(out)
}
