//! Error types for each pipeline stage.
//!
//! Every stage returns its own error type. The pipeline driver wraps them in
//! [`PipelineError`], which records the stage that failed.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while cleaning, splitting or reading tabular data.
#[derive(Debug, Error)]
pub enum DataError {
    /// A column the current step relies on is not present.
    #[error("Column '{column}' not found while {step}")]
    MissingColumn {
        /// Name of the absent column
        column: String,
        /// Step that needed the column (e.g. "dropping timestamp columns")
        step: &'static str,
    },

    /// A column still holds null, NaN or infinite values where none are allowed.
    #[error("Column '{column}' contains {count} missing or non-finite value(s)")]
    MissingValues { column: String, count: usize },

    /// A column that must be numeric holds another dtype.
    #[error("Column '{column}' is not numeric (dtype: {dtype})")]
    NonNumeric { column: String, dtype: String },

    /// Two collections that must line up have different lengths.
    #[error("Shape mismatch: expected {expected} rows, found {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// The dataset has no rows to work with.
    #[error("Dataset is empty")]
    EmptyDataset,

    /// Too few rows to give both sides of a split at least one row.
    #[error("Cannot split {rows} row(s) with test size {test_size}: one side would be empty")]
    TooFewRows { rows: usize, test_size: f64 },

    /// A strategy produced a different kind of output than the caller asked for.
    #[error("Expected {expected} output from the cleaning strategy")]
    UnexpectedOutput { expected: &'static str },

    /// Failure reported by polars.
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Invalid run configuration.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Model {0} not supported")]
    UnsupportedModel(String),

    #[error("Test size must be strictly between 0.0 and 1.0, got {0}")]
    InvalidTestSize(f64),
}

/// Errors raised while reading the input dataset.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Dataset file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported file format: '{extension}'. Supported formats: csv, parquet")]
    UnsupportedFormat { extension: String },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
}

/// Invalid input to a metric calculation.
#[derive(Debug, Error, PartialEq)]
pub enum MetricError {
    #[error("Cannot score an empty set of predictions")]
    Empty,

    #[error("Found input variables with inconsistent numbers of samples: [{y_true}, {y_pred}]")]
    LengthMismatch { y_true: usize, y_pred: usize },
}

/// Errors raised by the model trainer.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Data(#[from] DataError),

    /// The normal equations could not be factorised.
    #[error("Least-squares system is not positive definite (pivot {pivot} at row {row})")]
    Singular { row: usize, pivot: f64 },
}

/// Errors raised while scoring the trained model.
#[derive(Debug, Error)]
pub enum EvaluateError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Metric(#[from] MetricError),
}

/// A failed pipeline run, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Error while ingesting the data: {0}")]
    Ingest(#[from] IngestError),

    #[error("Error in preprocessing data: {0}")]
    Preprocess(#[source] DataError),

    #[error("Error in splitting data: {0}")]
    Split(#[source] DataError),

    #[error("Error in training model: {0}")]
    Train(#[from] TrainError),

    #[error("Error in evaluating model: {0}")]
    Evaluate(#[from] EvaluateError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl PipelineError {
    /// Short name of the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Ingest(_) => "ingest",
            PipelineError::Preprocess(_) => "preprocess",
            PipelineError::Split(_) => "split",
            PipelineError::Train(_) => "train",
            PipelineError::Evaluate(_) => "evaluate",
            PipelineError::Configuration(_) => "configuration",
        }
    }
}
