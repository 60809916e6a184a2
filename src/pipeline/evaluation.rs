//! Model evaluation on the held-out split

use polars::prelude::*;
use serde::Serialize;

use crate::error::EvaluateError;
use crate::pipeline::metrics::Metric;
use crate::pipeline::training::{target_values, TrainedModel};
use crate::report::ExperimentTracker;

/// Scores of one evaluation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EvaluationScores {
    pub r2: f64,
    pub rmse: f64,
    pub mse: f64,
}

impl EvaluationScores {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Mse => self.mse,
            Metric::Rmse => self.rmse,
            Metric::R2 => self.r2,
        }
    }

    fn set(&mut self, metric: Metric, value: f64) {
        match metric {
            Metric::Mse => self.mse = value,
            Metric::Rmse => self.rmse = value,
            Metric::R2 => self.r2 = value,
        }
    }
}

/// Predict on the test features and score against the test labels.
///
/// Every metric in [`Metric::ALL`] is computed and logged to `tracker`.
pub fn evaluate_model(
    model: &TrainedModel,
    x_test: &DataFrame,
    y_test: &Series,
    tracker: &mut dyn ExperimentTracker,
) -> Result<EvaluationScores, EvaluateError> {
    let predictions = model.predict(x_test)?;
    let y_true = target_values(y_test)?;

    let mut scores = EvaluationScores::default();
    for metric in Metric::ALL {
        let value = metric.score(&y_true, &predictions)?;
        scores.set(metric, value);
        tracker.log_metric(metric.name(), value);
    }

    tracing::info!(
        r2 = scores.r2,
        rmse = scores.rmse,
        mse = scores.mse,
        "model evaluated"
    );

    Ok(scores)
}
