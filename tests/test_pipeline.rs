//! End-to-end tests for the training pipeline

use std::time::Duration;

use csat::error::{ConfigurationError, DataError, IngestError, PipelineError, TrainError};
use csat::pipeline::{
    run_training_pipeline, MissingColumnPolicy, ModelConfig, PipelineConfig, Stage, StageObserver,
};
use csat::report::{NoopTracker, RunRecorder};
use polars::prelude::*;

#[path = "common/mod.rs"]
mod common;

use common::*;

/// Records stage callbacks in order
#[derive(Default)]
struct RecordingObserver {
    started: Vec<Stage>,
    finished: Vec<Stage>,
}

impl StageObserver for RecordingObserver {
    fn on_start(&mut self, stage: Stage) {
        self.started.push(stage);
    }

    fn on_finish(&mut self, stage: Stage, _elapsed: Duration) {
        self.finished.push(stage);
    }
}

#[test]
fn test_full_pipeline_on_csv() {
    let mut df = create_orders_dataframe(10_000, 42);
    let (_dir, path) = create_temp_csv(&mut df);

    let config = PipelineConfig::new(&path);
    let mut recorder = RunRecorder::new();
    let mut observer = RecordingObserver::default();

    let outcome = run_training_pipeline(&config, &mut recorder, &mut observer).unwrap();

    assert!(outcome.r2().is_finite());
    assert!(outcome.rmse().is_finite());
    assert!(outcome.rmse() >= 0.0);
    assert_eq!(outcome.rows_loaded, 10_000);
    assert_eq!(outcome.train_rows, 8_000);
    assert_eq!(outcome.test_rows, 2_000);
    assert_eq!(outcome.timings.len(), Stage::ALL.len());

    assert_eq!(observer.started, Stage::ALL.to_vec());
    assert_eq!(observer.finished, Stage::ALL.to_vec());

    assert_eq!(recorder.metric("r2"), Some(outcome.r2()));
    assert_eq!(recorder.metric("rmse"), Some(outcome.rmse()));
    assert!(recorder.metric("mse").is_some());
    assert!(recorder.params().contains_key("model_name"));
    assert!(recorder.params().contains_key("seed"));
}

#[test]
fn test_full_pipeline_on_parquet() {
    let mut df = create_orders_dataframe(2_000, 3);
    let (_dir, path) = create_temp_parquet(&mut df);

    let outcome =
        run_training_pipeline(&PipelineConfig::new(&path), &mut NoopTracker, &mut ()).unwrap();

    assert!(outcome.r2().is_finite());
    assert_eq!(outcome.test_rows, 400);
}

#[test]
fn test_pipeline_is_deterministic() {
    let mut df = create_orders_dataframe(3_000, 5);
    let (_dir, path) = create_temp_csv(&mut df);
    let config = PipelineConfig::new(&path);

    let first = run_training_pipeline(&config, &mut NoopTracker, &mut ()).unwrap();
    let second = run_training_pipeline(&config, &mut NoopTracker, &mut ()).unwrap();

    assert_eq!(first.r2(), second.r2());
    assert_eq!(first.rmse(), second.rmse());
    assert_eq!(first.model.coefficients(), second.model.coefficients());
}

#[test]
fn test_retained_columns_exclude_dropped() {
    let mut df = create_orders_dataframe(500, 6);
    let (_dir, path) = create_temp_csv(&mut df);

    let outcome =
        run_training_pipeline(&PipelineConfig::new(&path), &mut NoopTracker, &mut ()).unwrap();

    let features = outcome.model.feature_names();
    for dropped in ["order_approved_at", "customer_zip_code_prefix", "order_id", "review_score"] {
        assert!(
            !features.iter().any(|f| f == dropped),
            "'{}' should not be a feature",
            dropped
        );
    }
    assert!(features.iter().any(|f| f == "price"));
    // Label is retained after preprocessing but is not a feature
    assert_eq!(outcome.columns_retained, features.len() + 1);
}

#[test]
fn test_missing_file_fails_at_ingest() {
    let config = PipelineConfig::new("/nonexistent/orders.csv");
    let mut observer = RecordingObserver::default();

    let err = run_training_pipeline(&config, &mut NoopTracker, &mut observer).unwrap_err();

    assert_eq!(err.stage(), "ingest");
    assert!(matches!(err, PipelineError::Ingest(IngestError::NotFound(_))));
    assert_eq!(observer.started, vec![Stage::Ingest]);
    assert!(observer.finished.is_empty());
}

#[test]
fn test_unsupported_model_fails_at_train() {
    let mut df = create_orders_dataframe(200, 7);
    let (_dir, path) = create_temp_csv(&mut df);
    let mut config = PipelineConfig::new(&path);
    config.model = ModelConfig::new("RandomForest");
    let mut recorder = RunRecorder::new();

    let err = run_training_pipeline(&config, &mut recorder, &mut ()).unwrap_err();

    assert_eq!(err.stage(), "train");
    assert!(matches!(
        err,
        PipelineError::Train(TrainError::Configuration(ConfigurationError::UnsupportedModel(_)))
    ));
    assert!(!recorder.params().contains_key("model_name"));
    assert!(recorder.metrics().is_empty());
}

#[test]
fn test_invalid_test_size_fails_before_ingest() {
    let mut config = PipelineConfig::new("/nonexistent/orders.csv");
    config.test_size = 1.5;
    let mut observer = RecordingObserver::default();

    let err = run_training_pipeline(&config, &mut NoopTracker, &mut observer).unwrap_err();

    assert_eq!(err.stage(), "configuration");
    assert!(observer.started.is_empty());
}

#[test]
fn test_missing_column_fails_at_preprocess() {
    let df = create_orders_dataframe(200, 8);
    let mut df = df.drop("order_purchase_timestamp").unwrap();
    let (_dir, path) = create_temp_csv(&mut df);

    let err =
        run_training_pipeline(&PipelineConfig::new(&path), &mut NoopTracker, &mut ()).unwrap_err();

    assert_eq!(err.stage(), "preprocess");
    assert!(err.to_string().contains("order_purchase_timestamp"));
}

#[test]
fn test_skip_policy_tolerates_missing_columns() {
    let df = create_orders_dataframe(300, 9);
    let mut df = df
        .drop("order_purchase_timestamp")
        .unwrap()
        .drop("order_item_id")
        .unwrap();
    let (_dir, path) = create_temp_csv(&mut df);
    let mut config = PipelineConfig::new(&path);
    config.missing_columns = MissingColumnPolicy::Skip;

    let outcome = run_training_pipeline(&config, &mut NoopTracker, &mut ()).unwrap();

    assert!(outcome.r2().is_finite());
}

#[test]
fn test_missing_label_fails_at_split() {
    let df = create_orders_dataframe(200, 10);
    let mut df = df.drop("review_score").unwrap();
    let (_dir, path) = create_temp_csv(&mut df);

    let err =
        run_training_pipeline(&PipelineConfig::new(&path), &mut NoopTracker, &mut ()).unwrap_err();

    assert_eq!(err.stage(), "split");
    assert!(matches!(
        err,
        PipelineError::Split(DataError::MissingColumn { ref column, .. }) if column == "review_score"
    ));
}

#[test]
fn test_label_gaps_are_not_filled() {
    let mut df = create_orders_dataframe(200, 14);
    let labels: Vec<Option<i64>> = column_values(&df, "review_score")
        .into_iter()
        .enumerate()
        .map(|(i, v)| if i % 50 == 1 { None } else { v.map(|v| v as i64) })
        .collect();
    df.with_column(Column::new("review_score".into(), labels))
        .unwrap();
    let (_dir, path) = create_temp_csv(&mut df);

    let err =
        run_training_pipeline(&PipelineConfig::new(&path), &mut NoopTracker, &mut ()).unwrap_err();

    assert_eq!(err.stage(), "split");
    assert!(
        matches!(
            err,
            PipelineError::Split(DataError::MissingValues { ref column, count: 4 })
                if column == "review_score"
        ),
        "Unexpected error: {:?}",
        err
    );
}

#[test]
fn test_text_label_reported_as_non_numeric() {
    let mut df = create_orders_dataframe(200, 15);
    let labels: Vec<&str> = (0..200).map(|i| if i == 3 { "n/a" } else { "4" }).collect();
    df.with_column(Column::new("review_score".into(), labels))
        .unwrap();
    let (_dir, path) = create_temp_csv(&mut df);

    let err =
        run_training_pipeline(&PipelineConfig::new(&path), &mut NoopTracker, &mut ()).unwrap_err();

    assert_eq!(err.stage(), "split");
    assert!(
        matches!(
            err,
            PipelineError::Split(DataError::NonNumeric { ref column, .. })
                if column == "review_score"
        ),
        "Unexpected error: {:?}",
        err
    );
}

#[test]
fn test_custom_label_passes_through_preprocess() {
    let mut df = create_orders_dataframe(500, 16);
    let (_dir, path) = create_temp_csv(&mut df);
    let mut config = PipelineConfig::new(&path);
    config.label = "freight_value".to_string();

    let outcome = run_training_pipeline(&config, &mut NoopTracker, &mut ()).unwrap();

    let features = outcome.model.feature_names();
    assert!(!features.iter().any(|f| f == "freight_value"));
    assert!(features.iter().any(|f| f == "review_score"));
}

#[test]
fn test_custom_seed_changes_split() {
    let mut df = create_orders_dataframe(1_000, 12);
    let (_dir, path) = create_temp_csv(&mut df);

    let mut config = PipelineConfig::new(&path);
    let a = run_training_pipeline(&config, &mut NoopTracker, &mut ()).unwrap();
    config.seed = 7;
    let b = run_training_pipeline(&config, &mut NoopTracker, &mut ()).unwrap();

    assert_ne!(a.rmse(), b.rmse());
}

#[test]
fn test_loaded_frame_has_expected_schema() {
    let mut df = create_orders_dataframe(100, 13);
    let (_dir, path) = create_temp_csv(&mut df);

    let loaded = csat::pipeline::load_dataset(&path, 10_000).unwrap();

    assert_eq!(loaded.shape(), df.shape());
    assert_eq!(loaded.column("review_score").unwrap().dtype(), &DataType::Int64);
    assert_eq!(loaded.column("order_approved_at").unwrap().dtype(), &DataType::String);
}
