//! Kassandra CLI: feature build, training, and live prediction commands.
//!
//! Commands:
//! - `build`: build the dataset and export the feature table (CSV, Parquet)
//! - `train`: build, fit on the chronological train split, evaluate, save the model
//! - `predict`: rebuild the live row for a date and forecast the next close
//! - `schema`: print the feature schema a config produces, as JSON
//! - `config`: print the effective configuration as TOML

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use kassandra_core::features::{FeatureSchema, SourceReport, SourceStatus};
use kassandra_runner::{
    append_prediction, run_prediction, run_training, write_feature_table_csv,
    write_feature_table_parquet, write_prediction_log, DatasetBuilder, EvaluationMetrics,
    KassandraConfig, ModelArtifact,
};

#[derive(Parser)]
#[command(
    name = "kassandra",
    about = "Kassandra: leakage-safe next-close prediction"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command.
#[derive(Args)]
struct RunArgs {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ticker override.
    #[arg(long)]
    ticker: Option<String>,

    /// Start date override (YYYY-MM-DD).
    #[arg(long)]
    start: Option<NaiveDate>,

    /// End date override (YYYY-MM-DD).
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Output directory override.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dataset and export the processed feature table.
    Build {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Train and evaluate a model, then save it with its feature schema.
    Train {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Forecast the next close from the live feature row.
    Predict {
        #[command(flatten)]
        run: RunArgs,

        /// Build the row for the last trading date on or before this date.
        /// Defaults to today.
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Model artifact path. Defaults to the configured output path.
        #[arg(long)]
        model: Option<PathBuf>,
    },
    /// Print the feature schema as JSON.
    Schema {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Print the effective configuration as TOML.
    Config {
        #[command(flatten)]
        run: RunArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Build { run } => run_build(&load_config(&run)?),
        Commands::Train { run } => run_train(&load_config(&run)?),
        Commands::Predict { run, as_of, model } => {
            let as_of = as_of.unwrap_or_else(|| chrono::Local::now().date_naive());
            run_predict(&load_config(&run)?, as_of, model)
        }
        Commands::Schema { run } => {
            let config = load_config(&run)?;
            let schema = FeatureSchema::from_config(&config.features)?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
        Commands::Config { run } => {
            print!("{}", load_config(&run)?.to_toml()?);
            Ok(())
        }
    }
}

/// Config file (or defaults) with command-line overrides applied.
fn load_config(args: &RunArgs) -> Result<KassandraConfig> {
    let mut config = match &args.config {
        Some(path) => KassandraConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => KassandraConfig::default(),
    };
    if let Some(ticker) = &args.ticker {
        config.run.ticker = ticker.clone();
    }
    if let Some(start) = args.start {
        config.run.start = start;
    }
    if let Some(end) = args.end {
        config.run.end = end;
    }
    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn run_build(config: &KassandraConfig) -> Result<()> {
    let builder = DatasetBuilder::from_config(config)?;
    let run = &config.run;
    let dataset = builder
        .build_dataset(&run.ticker, run.start, run.end)
        .with_context(|| format!("failed to build dataset for {}", run.ticker))?;

    let csv_path = config.output.features_csv_path();
    let parquet_path = config.output.features_parquet_path();
    write_feature_table_csv(&dataset, &csv_path)?;
    write_feature_table_parquet(&dataset, &parquet_path)?;

    println!();
    println!("=== Dataset ===");
    println!("Ticker:      {}", run.ticker);
    if let (Some(first), Some(last)) = (dataset.dates.first(), dataset.dates.last()) {
        println!("Range:       {first} .. {last}");
    }
    println!("Rows:        {}", dataset.len());
    println!("Columns:     {}", dataset.features.n_cols());
    println!("Fingerprint: {}", dataset.fingerprint().short());
    print_sources(&dataset.sources);
    println!();
    println!("Features saved to: {}", csv_path.display());
    println!("Features saved to: {}", parquet_path.display());
    Ok(())
}

fn run_train(config: &KassandraConfig) -> Result<()> {
    let builder = DatasetBuilder::from_config(config)?;
    let run = &config.run;
    let (dataset, outcome) = run_training(&builder, &run.ticker, run.start, run.end, &config.model)
        .with_context(|| format!("training failed for {}", run.ticker))?;

    write_feature_table_csv(&dataset, &config.output.features_csv_path())?;
    write_feature_table_parquet(&dataset, &config.output.features_parquet_path())?;
    write_prediction_log(&config.output.prediction_log_path(), &outcome.test_predictions)?;
    let model_path = config.output.model_path();
    outcome.artifact.save(&model_path)?;

    println!();
    println!("=== Training Result ===");
    println!("Ticker:      {}", run.ticker);
    println!("Model:       {}", outcome.artifact.model_name());
    println!(
        "Train:       {} rows ({} .. {})",
        outcome.artifact.train_rows, outcome.artifact.train_start, outcome.artifact.train_end
    );
    println!("Test:        {} rows", outcome.test_rows);
    print_metrics(&outcome.artifact.metrics);
    print_sources(&dataset.sources);
    println!();
    println!("Model saved to: {}", model_path.display());
    println!(
        "Prediction log: {}",
        config.output.prediction_log_path().display()
    );
    Ok(())
}

fn run_predict(config: &KassandraConfig, as_of: NaiveDate, model: Option<PathBuf>) -> Result<()> {
    let model_path = model.unwrap_or_else(|| config.output.model_path());
    let artifact = ModelArtifact::load(&model_path)
        .with_context(|| format!("failed to load model {}", model_path.display()))?;
    if artifact.ticker != config.run.ticker {
        tracing::warn!(
            trained = %artifact.ticker,
            requested = %config.run.ticker,
            "model was trained on a different ticker"
        );
    }

    let builder = DatasetBuilder::from_config(config)?;
    let live = run_prediction(&builder, &artifact, &config.run.ticker, as_of)
        .with_context(|| format!("prediction failed for {} as of {as_of}", config.run.ticker))?;
    let log_path = config.output.prediction_log_path();
    append_prediction(&log_path, &live.record())?;

    println!();
    println!("=== Prediction ===");
    println!("Ticker:      {}", config.run.ticker);
    println!("As of:       {}", live.as_of);
    println!("Row date:    {}", live.date);
    println!("Next close:  {:.4}", live.predicted);
    print_sources(&live.sources);
    println!();
    println!("Appended to: {}", log_path.display());
    Ok(())
}

fn print_metrics(m: &EvaluationMetrics) {
    println!("RMSE:        {:.4}", m.rmse);
    println!("MAE:         {:.4}", m.mae);
    println!("MAPE:        {:.2}%", m.mape);
    println!("Direction:   {:.2}%", m.direction_accuracy);
}

fn print_sources(sources: &[SourceReport]) {
    println!("Sources:");
    for report in sources {
        let status = match &report.status {
            SourceStatus::Observed {
                matched,
                off_calendar,
            } => format!("{matched} matched, {off_calendar} off-calendar"),
            SourceStatus::Empty => "empty".to_string(),
            SourceStatus::Unavailable { reason } => format!("unavailable ({reason})"),
        };
        println!("  {:<8} {status}", report.source.as_str());
    }
}
