//! Model training
//!
//! Only ordinary least-squares linear regression is supported. The model family
//! is chosen by name through [`ModelConfig`]; unknown names are rejected before
//! anything is fitted or logged.

use std::fmt;
use std::str::FromStr;

use faer::Mat;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{ConfigurationError, DataError, TrainError};
use crate::report::ExperimentTracker;

/// Model trained when no name is given
pub const DEFAULT_MODEL_NAME: &str = "LinearRegression";

/// Diagonal jitter (relative to the row count) added to the normal equations.
/// Keeps the system positive definite when features are collinear.
const RIDGE_JITTER: f64 = 1e-8;

/// Model selection by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model_name: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
        }
    }
}

impl ModelConfig {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
        }
    }

    /// Resolve the configured name to a supported model family
    pub fn kind(&self) -> Result<ModelKind, ConfigurationError> {
        self.model_name.parse()
    }
}

/// Supported model families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    LinearRegression,
}

impl FromStr for ModelKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LinearRegression" => Ok(ModelKind::LinearRegression),
            other => Err(ConfigurationError::UnsupportedModel(other.to_string())),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::LinearRegression => write!(f, "LinearRegression"),
        }
    }
}

/// Fitted ordinary least-squares regression with intercept
#[derive(Debug, Clone, Serialize)]
pub struct LinearRegression {
    feature_names: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegression {
    /// Fit on a numeric feature table and a target of the same length.
    ///
    /// Features are standardised before solving the normal equations with a
    /// Cholesky factorisation; coefficients are reported on the original scale.
    /// Constant features get a zero coefficient.
    pub fn fit(x: &DataFrame, y: &Series) -> Result<Self, TrainError> {
        let n_samples = x.height();
        if n_samples == 0 {
            return Err(DataError::EmptyDataset.into());
        }
        if y.len() != n_samples {
            return Err(DataError::ShapeMismatch {
                expected: n_samples,
                actual: y.len(),
            }
            .into());
        }

        let feature_names: Vec<String> = x
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let columns = feature_columns(x, &feature_names)?;
        let target = target_values(y)?;

        let y_mean = target.iter().sum::<f64>() / n_samples as f64;

        if columns.is_empty() {
            return Ok(Self {
                feature_names,
                coefficients: Vec::new(),
                intercept: y_mean,
            });
        }

        let stats: Vec<(f64, f64)> = columns.iter().map(|col| mean_and_std(col)).collect();

        // Standardised design matrix Z (n_samples x n_features)
        let n_features = columns.len();
        let mut z = Mat::<f64>::zeros(n_samples, n_features);
        for (col_idx, (col, &(mean, std))) in columns.iter().zip(&stats).enumerate() {
            if std == 0.0 {
                continue;
            }
            for (row_idx, &val) in col.iter().enumerate() {
                z[(row_idx, col_idx)] = (val - mean) / std;
            }
        }

        let mut y_centered = Mat::<f64>::zeros(n_samples, 1);
        for (row_idx, &val) in target.iter().enumerate() {
            y_centered[(row_idx, 0)] = val - y_mean;
        }

        // Normal equations: (Z^T Z + jitter * I) b = Z^T y
        let mut gram = z.transpose() * &z;
        let rhs = z.transpose() * &y_centered;
        let jitter = RIDGE_JITTER * n_samples as f64;
        for i in 0..n_features {
            gram[(i, i)] += jitter;
        }

        let scaled = cholesky_solve(&gram, &rhs)?;

        let coefficients: Vec<f64> = scaled
            .iter()
            .zip(&stats)
            .map(|(&b, &(_, std))| if std == 0.0 { 0.0 } else { b / std })
            .collect();
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&stats)
                .map(|(coef, (mean, _))| coef * mean)
                .sum::<f64>();

        Ok(Self {
            feature_names,
            coefficients,
            intercept,
        })
    }

    /// Predict one value per row of `x`. Columns are matched by training feature name.
    pub fn predict(&self, x: &DataFrame) -> Result<Vec<f64>, DataError> {
        let columns = feature_columns(x, &self.feature_names)?;
        let mut predictions = vec![self.intercept; x.height()];
        for (col, coef) in columns.iter().zip(&self.coefficients) {
            for (pred, val) in predictions.iter_mut().zip(col) {
                *pred += coef * val;
            }
        }
        Ok(predictions)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

#[derive(Debug, Clone)]
enum Fitted {
    Linear(LinearRegression),
}

/// A fitted regressor. Produced once by [`train_model`] and never modified.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    fitted: Fitted,
}

impl TrainedModel {
    pub fn kind(&self) -> ModelKind {
        match &self.fitted {
            Fitted::Linear(_) => ModelKind::LinearRegression,
        }
    }

    pub fn predict(&self, x: &DataFrame) -> Result<Vec<f64>, DataError> {
        match &self.fitted {
            Fitted::Linear(model) => model.predict(x),
        }
    }

    pub fn feature_names(&self) -> &[String] {
        match &self.fitted {
            Fitted::Linear(model) => model.feature_names(),
        }
    }

    pub fn coefficients(&self) -> &[f64] {
        match &self.fitted {
            Fitted::Linear(model) => model.coefficients(),
        }
    }

    pub fn intercept(&self) -> f64 {
        match &self.fitted {
            Fitted::Linear(model) => model.intercept(),
        }
    }
}

/// Train the configured model and log its parameters to `tracker`.
///
/// An unsupported model name fails before fitting, and nothing is logged.
pub fn train_model(
    x_train: &DataFrame,
    y_train: &Series,
    config: &ModelConfig,
    tracker: &mut dyn ExperimentTracker,
) -> Result<TrainedModel, TrainError> {
    let kind = config.kind()?;

    let fitted = match kind {
        ModelKind::LinearRegression => Fitted::Linear(LinearRegression::fit(x_train, y_train)?),
    };
    let model = TrainedModel { fitted };

    tracing::info!(
        model = %kind,
        samples = x_train.height(),
        features = model.feature_names().len(),
        "model trained"
    );

    tracker.log_param("model_name", json!(kind.to_string()));
    tracker.log_param("n_samples", json!(x_train.height()));
    tracker.log_param("n_features", json!(model.feature_names().len()));
    tracker.log_param("intercept", json!(model.intercept()));
    for (name, coef) in model.feature_names().iter().zip(model.coefficients()) {
        tracker.log_param(&format!("coef.{}", name), json!(coef));
    }

    Ok(model)
}

/// Extract the named columns as Float64 vectors, rejecting non-finite values and non-numeric dtypes
pub(crate) fn feature_columns(
    df: &DataFrame,
    names: &[String],
) -> Result<Vec<Vec<f64>>, DataError> {
    names
        .iter()
        .map(|name| {
            let column = df.column(name).map_err(|_| DataError::MissingColumn {
                column: name.clone(),
                step: "building the feature matrix",
            })?;
            numeric_values(name, column.as_materialized_series())
        })
        .collect()
}

/// Target series as a Float64 vector, rejecting non-finite values and non-numeric dtypes
pub(crate) fn target_values(y: &Series) -> Result<Vec<f64>, DataError> {
    numeric_values(y.name().as_str(), y)
}

fn numeric_values(name: &str, series: &Series) -> Result<Vec<f64>, DataError> {
    if !series.dtype().is_primitive_numeric() {
        return Err(DataError::NonNumeric {
            column: name.to_string(),
            dtype: series.dtype().to_string(),
        });
    }

    let floats = series.cast(&DataType::Float64)?;
    let values: Vec<Option<f64>> = floats.f64()?.iter().collect();
    let missing = values
        .iter()
        .filter(|v| v.map_or(true, |x| !x.is_finite()))
        .count();
    if missing > 0 {
        return Err(DataError::MissingValues {
            column: name.to_string(),
            count: missing,
        });
    }

    Ok(values.into_iter().flatten().collect())
}

/// Population mean and standard deviation
fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Solve `a * x = b` for symmetric positive-definite `a` (b is a single column)
fn cholesky_solve(a: &Mat<f64>, b: &Mat<f64>) -> Result<Vec<f64>, TrainError> {
    let n = a.nrows();
    let mut l = Mat::<f64>::zeros(n, n);

    // A = L * L^T
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[(i, j)];
            for k in 0..j {
                sum -= l[(i, k)] * l[(j, k)];
            }
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return Err(TrainError::Singular { row: i, pivot: sum });
                }
                l[(i, i)] = sum.sqrt();
            } else {
                l[(i, j)] = sum / l[(j, j)];
            }
        }
    }

    // L * y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[(i, 0)];
        for j in 0..i {
            sum -= l[(i, j)] * y[j];
        }
        y[i] = sum / l[(i, i)];
    }

    // L^T * x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[(j, i)] * x[j];
        }
        x[i] = sum / l[(i, i)];
    }

    Ok(x)
}
