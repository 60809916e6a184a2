//! Regression metrics: MSE, RMSE and R²

use serde::{Deserialize, Serialize};

use crate::error::MetricError;

/// Regression metric to score predictions with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Mse,
    Rmse,
    R2,
}

impl Metric {
    /// Every supported metric
    pub const ALL: [Metric; 3] = [Metric::Mse, Metric::Rmse, Metric::R2];

    /// Key used when logging the metric
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Mse => "mse",
            Metric::Rmse => "rmse",
            Metric::R2 => "r2",
        }
    }

    /// Score predictions against ground truth
    pub fn score(&self, y_true: &[f64], y_pred: &[f64]) -> Result<f64, MetricError> {
        match self {
            Metric::Mse => mean_squared_error(y_true, y_pred),
            Metric::Rmse => root_mean_squared_error(y_true, y_pred),
            Metric::R2 => r2_score(y_true, y_pred),
        }
    }
}

fn check_lengths(y_true: &[f64], y_pred: &[f64]) -> Result<(), MetricError> {
    if y_true.len() != y_pred.len() {
        return Err(MetricError::LengthMismatch {
            y_true: y_true.len(),
            y_pred: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(MetricError::Empty);
    }
    Ok(())
}

fn sum_squared_residuals(y_true: &[f64], y_pred: &[f64]) -> f64 {
    y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p) * (t - p))
        .sum()
}

/// Mean of squared elementwise differences
pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64, MetricError> {
    check_lengths(y_true, y_pred)?;
    Ok(sum_squared_residuals(y_true, y_pred) / y_true.len() as f64)
}

/// Square root of [`mean_squared_error`]
pub fn root_mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64, MetricError> {
    Ok(mean_squared_error(y_true, y_pred)?.sqrt())
}

/// Coefficient of determination, `1 - SS_res / SS_tot`.
///
/// When `y_true` is constant (`SS_tot == 0`) the ratio is undefined: perfect
/// predictions score 1.0 and anything else scores 0.0.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Result<f64, MetricError> {
    check_lengths(y_true, y_pred)?;

    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean) * (t - mean)).sum();
    let ss_res = sum_squared_residuals(y_true, y_pred);

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }

    Ok(1.0 - ss_res / ss_tot)
}
