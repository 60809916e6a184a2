//! Data cleaning strategies and the context that runs them
//!
//! Two strategies exist: [`PreprocessStrategy`] turns the raw order export into
//! an all-numeric table without missing values, and [`SplitStrategy`] separates
//! the label and partitions rows into train/test sets. Callers pick one
//! explicitly through [`DataStrategy`] and run it with [`DataCleaning`].

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, DataError};

/// Label column predicted by the model
pub const LABEL_COLUMN: &str = "review_score";

/// Date/timestamp columns removed before training
pub const TIMESTAMP_COLUMNS: [&str; 5] = [
    "order_approved_at",
    "order_delivered_carrier_date",
    "order_delivered_customer_date",
    "order_estimated_delivery_date",
    "order_purchase_timestamp",
];

/// Product size/weight columns whose gaps are filled with the column median
pub const MEDIAN_FILL_COLUMNS: [&str; 4] = [
    "product_weight_g",
    "product_length_cm",
    "product_height_cm",
    "product_width_cm",
];

/// Free-text review column
pub const REVIEW_TEXT_COLUMN: &str = "review_comment_message";

/// Placeholder written into empty review texts
pub const REVIEW_TEXT_PLACEHOLDER: &str = "No review";

/// Identifier columns that carry no signal
pub const IDENTIFIER_COLUMNS: [&str; 2] = ["customer_zip_code_prefix", "order_item_id"];

/// Default fraction of rows held out for testing
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Default seed for the train/test shuffle
pub const DEFAULT_SEED: u64 = 42;

/// What to do when a hardcoded column is absent from the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingColumnPolicy {
    /// Fail with [`DataError::MissingColumn`]
    #[default]
    Error,
    /// Log a warning and carry on without the column
    Skip,
}

/// Output of a cleaning strategy
#[derive(Debug, Clone)]
pub enum CleanedData {
    Processed(DataFrame),
    Split(DataSplit),
}

impl CleanedData {
    /// Unwrap the preprocessed table
    pub fn into_processed(self) -> Result<DataFrame, DataError> {
        match self {
            CleanedData::Processed(df) => Ok(df),
            CleanedData::Split(_) => Err(DataError::UnexpectedOutput {
                expected: "preprocessed",
            }),
        }
    }

    /// Unwrap the train/test split
    pub fn into_split(self) -> Result<DataSplit, DataError> {
        match self {
            CleanedData::Split(split) => Ok(split),
            CleanedData::Processed(_) => Err(DataError::UnexpectedOutput { expected: "split" }),
        }
    }
}

/// Four-way train/test split with the original row positions of each side
#[derive(Debug, Clone)]
pub struct DataSplit {
    pub x_train: DataFrame,
    pub x_test: DataFrame,
    pub y_train: Series,
    pub y_test: Series,
    /// Row positions (in the pre-split table) that went to the training side
    pub train_rows: Vec<usize>,
    /// Row positions (in the pre-split table) that went to the test side
    pub test_rows: Vec<usize>,
}

/// The cleaning strategy to run
#[derive(Debug, Clone)]
pub enum DataStrategy {
    Preprocess(PreprocessStrategy),
    Split(SplitStrategy),
}

impl DataStrategy {
    pub fn handle_data(&self, data: &DataFrame) -> Result<CleanedData, DataError> {
        match self {
            DataStrategy::Preprocess(strategy) => {
                strategy.handle_data(data).map(CleanedData::Processed)
            }
            DataStrategy::Split(strategy) => strategy.handle_data(data).map(CleanedData::Split),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            DataStrategy::Preprocess(_) => "preprocess",
            DataStrategy::Split(_) => "split",
        }
    }
}

/// Runs one strategy over a borrowed dataset
pub struct DataCleaning<'a> {
    data: &'a DataFrame,
    strategy: DataStrategy,
}

impl<'a> DataCleaning<'a> {
    pub fn new(data: &'a DataFrame, strategy: DataStrategy) -> Self {
        Self { data, strategy }
    }

    /// Run the chosen strategy. Errors are returned unchanged.
    pub fn run(&self) -> Result<CleanedData, DataError> {
        tracing::debug!(
            strategy = self.strategy.name(),
            rows = self.data.height(),
            columns = self.data.width(),
            "running cleaning strategy"
        );
        self.strategy.handle_data(self.data)
    }
}

/// Preprocessing for the order-level satisfaction export
#[derive(Debug, Clone)]
pub struct PreprocessStrategy {
    pub missing_columns: MissingColumnPolicy,
    /// Label column, passed through untouched for [`SplitStrategy`] to validate
    pub label: String,
}

impl Default for PreprocessStrategy {
    fn default() -> Self {
        Self {
            missing_columns: MissingColumnPolicy::default(),
            label: LABEL_COLUMN.to_string(),
        }
    }
}

impl PreprocessStrategy {
    pub fn new(missing_columns: MissingColumnPolicy) -> Self {
        Self {
            missing_columns,
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Produce an all-numeric table with no missing values.
    ///
    /// Steps, in order:
    /// 1. Drop the timestamp columns
    /// 2. Fill the product size/weight columns with their medians
    /// 3. Fill empty review texts with a placeholder
    /// 4. Keep numeric columns only
    /// 5. Drop the identifier columns
    /// 6. Median-fill anything still missing; drop columns with no observed value
    ///
    /// The label column is never filled or dropped here, whatever its dtype.
    pub fn handle_data(&self, data: &DataFrame) -> Result<DataFrame, DataError> {
        let mut df = self.drop_columns(
            data.clone(),
            &TIMESTAMP_COLUMNS,
            "dropping timestamp columns",
        )?;

        for name in MEDIAN_FILL_COLUMNS {
            if name == self.label {
                continue;
            }
            if !self.has_column(&df, name, "filling product dimensions")? {
                continue;
            }
            let column = df.column(name)?;
            if !column.dtype().is_primitive_numeric() {
                return Err(DataError::NonNumeric {
                    column: name.to_string(),
                    dtype: column.dtype().to_string(),
                });
            }
            if let Some(filled) = fill_with_median(column)? {
                df.with_column(filled)?;
            }
        }

        if self.has_column(&df, REVIEW_TEXT_COLUMN, "filling review text")? {
            let filled = fill_text(df.column(REVIEW_TEXT_COLUMN)?, REVIEW_TEXT_PLACEHOLDER)?;
            df.with_column(filled)?;
        }

        let numeric: Vec<Column> = df
            .get_columns()
            .iter()
            .filter(|col| {
                col.dtype().is_primitive_numeric() || col.name().as_str() == self.label
            })
            .cloned()
            .collect();
        tracing::debug!(
            kept = numeric.len(),
            dropped = df.width() - numeric.len(),
            "selected numeric columns"
        );
        let df = DataFrame::new(numeric)?;

        let df = self.drop_columns(df, &IDENTIFIER_COLUMNS, "dropping identifier columns")?;

        fill_remaining_gaps(df, &self.label)
    }

    fn has_column(
        &self,
        df: &DataFrame,
        name: &str,
        step: &'static str,
    ) -> Result<bool, DataError> {
        if df.get_column_index(name).is_some() {
            return Ok(true);
        }
        match self.missing_columns {
            MissingColumnPolicy::Error => Err(DataError::MissingColumn {
                column: name.to_string(),
                step,
            }),
            MissingColumnPolicy::Skip => {
                tracing::warn!(column = name, step, "column not found, skipping");
                Ok(false)
            }
        }
    }

    fn drop_columns(
        &self,
        mut df: DataFrame,
        names: &[&str],
        step: &'static str,
    ) -> Result<DataFrame, DataError> {
        for &name in names {
            if self.has_column(&df, name, step)? {
                df = df.drop(name)?;
            }
        }
        Ok(df)
    }
}

/// Label separation plus a seeded train/test partition
#[derive(Debug, Clone)]
pub struct SplitStrategy {
    pub label: String,
    pub test_size: f64,
    pub seed: u64,
}

impl Default for SplitStrategy {
    fn default() -> Self {
        Self {
            label: LABEL_COLUMN.to_string(),
            test_size: DEFAULT_TEST_SIZE,
            seed: DEFAULT_SEED,
        }
    }
}

impl SplitStrategy {
    pub fn new(
        label: impl Into<String>,
        test_size: f64,
        seed: u64,
    ) -> Result<Self, ConfigurationError> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(ConfigurationError::InvalidTestSize(test_size));
        }
        Ok(Self {
            label: label.into(),
            test_size,
            seed,
        })
    }

    /// Separate the label and shuffle rows into train/test sets.
    ///
    /// The test side gets `ceil(rows * test_size)` rows. The same seed always
    /// yields the same partition for the same input.
    pub fn handle_data(&self, data: &DataFrame) -> Result<DataSplit, DataError> {
        let label = data
            .column(&self.label)
            .map_err(|_| DataError::MissingColumn {
                column: self.label.clone(),
                step: "splitting features from label",
            })?;

        let rows = data.height();
        if rows == 0 {
            return Err(DataError::EmptyDataset);
        }
        if !label.dtype().is_primitive_numeric() {
            return Err(DataError::NonNumeric {
                column: self.label.clone(),
                dtype: label.dtype().to_string(),
            });
        }
        let missing = missing_count(label)?;
        if missing > 0 {
            return Err(DataError::MissingValues {
                column: self.label.clone(),
                count: missing,
            });
        }

        let n_test = (rows as f64 * self.test_size).ceil() as usize;
        if n_test == 0 || n_test >= rows {
            return Err(DataError::TooFewRows {
                rows,
                test_size: self.test_size,
            });
        }

        let y = label.as_materialized_series().cast(&DataType::Float64)?;
        let x = data.drop(&self.label)?;

        let mut positions: Vec<usize> = (0..rows).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        positions.shuffle(&mut rng);
        let train_rows = positions.split_off(n_test);
        let test_rows = positions;

        let train_idx = to_idx(&train_rows);
        let test_idx = to_idx(&test_rows);

        tracing::debug!(
            train = train_rows.len(),
            test = test_rows.len(),
            seed = self.seed,
            "split dataset"
        );

        Ok(DataSplit {
            x_train: x.take(&train_idx)?,
            x_test: x.take(&test_idx)?,
            y_train: y.take(&train_idx)?,
            y_test: y.take(&test_idx)?,
            train_rows,
            test_rows,
        })
    }
}

fn to_idx(rows: &[usize]) -> IdxCa {
    IdxCa::from_vec(
        "idx".into(),
        rows.iter().map(|&row| row as IdxSize).collect(),
    )
}

/// Median of the finite values. Even counts average the two middle values.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut observed: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if observed.is_empty() {
        return None;
    }
    observed.sort_by(|a, b| a.total_cmp(b));
    let mid = observed.len() / 2;
    if observed.len() % 2 == 0 {
        Some((observed[mid - 1] + observed[mid]) / 2.0)
    } else {
        Some(observed[mid])
    }
}

/// Fill nulls, NaNs and infinities in a numeric column with its median.
///
/// Returns `None` when the column has no observed value to take a median of.
fn fill_with_median(column: &Column) -> Result<Option<Column>, DataError> {
    let floats = column.cast(&DataType::Float64)?;
    let ca = floats.f64()?;
    let values: Vec<Option<f64>> = ca.iter().map(|v| v.filter(|x| x.is_finite())).collect();
    let observed: Vec<f64> = values.iter().flatten().copied().collect();

    let Some(fill) = median(&observed) else {
        return Ok(None);
    };

    let filled: Vec<f64> = values.into_iter().map(|v| v.unwrap_or(fill)).collect();
    Ok(Some(Column::new(column.name().clone(), filled)))
}

fn fill_text(column: &Column, placeholder: &str) -> Result<Column, DataError> {
    let strings = column.cast(&DataType::String)?;
    let ca = strings.as_materialized_series().str()?;
    let filled: Vec<&str> = ca.iter().map(|v| v.unwrap_or(placeholder)).collect();
    Ok(Column::new(column.name().clone(), filled))
}

/// Count of nulls and non-finite values in a numeric column
fn missing_count(column: &Column) -> Result<usize, DataError> {
    let floats = column.cast(&DataType::Float64)?;
    let ca = floats.f64()?;
    Ok(ca.iter().filter(|v| v.map_or(true, |x| !x.is_finite())).count())
}

fn fill_remaining_gaps(mut df: DataFrame, label: &str) -> Result<DataFrame, DataError> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .filter(|name| name != label)
        .collect();

    for name in names {
        let column = df.column(&name)?;
        let missing = missing_count(column)?;
        if missing == 0 {
            continue;
        }
        match fill_with_median(column)? {
            Some(filled) => {
                tracing::debug!(column = %name, missing, "median-filled remaining gaps");
                df.with_column(filled)?;
            }
            None => {
                tracing::warn!(column = %name, "column has no observed values, dropping");
                df = df.drop(&name)?;
            }
        }
    }

    Ok(df)
}
