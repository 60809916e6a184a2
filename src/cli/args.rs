//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

use crate::pipeline::{
    MissingColumnPolicy, ModelConfig, PipelineConfig, DEFAULT_MODEL_NAME, LABEL_COLUMN,
};

/// csat - Train and score a review-score regression model from an order export
#[derive(Parser, Debug)]
#[command(name = "csat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input dataset path (CSV or Parquet)
    pub data_path: PathBuf,

    /// Model family to train. Only "LinearRegression" is supported.
    #[arg(long, default_value = DEFAULT_MODEL_NAME)]
    pub model_name: String,

    /// Label column to predict
    #[arg(long, default_value = LABEL_COLUMN)]
    pub label: String,

    /// Fraction of rows held out for evaluation (exclusive 0.0 to 1.0)
    #[arg(long, default_value = "0.2", value_parser = validate_test_size)]
    pub test_size: f64,

    /// Seed for the train/test shuffle
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Skip hardcoded cleaning columns that are absent instead of failing
    #[arg(long, default_value = "false")]
    pub skip_missing_columns: bool,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan (very slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,

    /// Write a JSON run record (parameters and metrics) to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,
}

impl Cli {
    /// Build the pipeline configuration from the parsed arguments
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            data_path: self.data_path.clone(),
            model: ModelConfig::new(self.model_name.clone()),
            label: self.label.clone(),
            test_size: self.test_size,
            seed: self.seed,
            missing_columns: if self.skip_missing_columns {
                MissingColumnPolicy::Skip
            } else {
                MissingColumnPolicy::Error
            },
            infer_schema_length: self.infer_schema_length,
        }
    }
}

/// Validator for test_size parameter
fn validate_test_size(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "test_size must be strictly between 0.0 and 1.0, got {}",
            value
        ))
    }
}
