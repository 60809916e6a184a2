//! Dataset loader for CSV and Parquet files

use polars::prelude::*;
use std::path::Path;

use crate::error::IngestError;

/// Load a dataset from a file (CSV or Parquet based on extension)
///
/// # Arguments
/// * `path` - Path to the dataset
/// * `infer_schema_length` - Number of CSV rows used for schema inference (0 = full scan)
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<DataFrame, IngestError> {
    tracing::info!("Ingesting data from {}", path.display());

    let df = scan_dataset(path, infer_schema_length)?
        .collect()
        .map_err(|source| IngestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(rows = df.height(), columns = df.width(), "dataset loaded");
    Ok(df)
}

/// Get column names from a dataset without loading the data
pub fn get_column_names(path: &Path) -> Result<Vec<String>, IngestError> {
    let schema = scan_dataset(path, 100)?
        .collect_schema()
        .map_err(|source| IngestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(schema.iter_names().map(|name| name.to_string()).collect())
}

/// Estimated in-memory size of a dataset in megabytes
pub fn estimated_size_mb(df: &DataFrame) -> f64 {
    df.estimated_size() as f64 / (1024.0 * 1024.0)
}

fn scan_dataset(path: &Path, infer_schema_length: usize) -> Result<LazyFrame, IngestError> {
    if !path.exists() {
        return Err(IngestError::NotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    // 0 means full scan
    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let read_error = |source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    };

    match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(schema_length)
            .finish()
            .map_err(read_error),
        "parquet" => LazyFrame::scan_parquet(path, Default::default()).map_err(read_error),
        _ => Err(IngestError::UnsupportedFormat { extension }),
    }
}
