//! Pipeline driver: ingest → preprocess → split → train → evaluate

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::PipelineError;
use crate::pipeline::cleaning::{
    DataCleaning, DataStrategy, MissingColumnPolicy, PreprocessStrategy, SplitStrategy,
    DEFAULT_SEED, DEFAULT_TEST_SIZE, LABEL_COLUMN,
};
use crate::pipeline::evaluation::{evaluate_model, EvaluationScores};
use crate::pipeline::loader::{estimated_size_mb, load_dataset};
use crate::pipeline::training::{train_model, ModelConfig, TrainedModel};
use crate::report::ExperimentTracker;

/// Default number of CSV rows used for schema inference
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 10_000;

/// Settings for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub data_path: PathBuf,
    pub model: ModelConfig,
    pub label: String,
    pub test_size: f64,
    pub seed: u64,
    pub missing_columns: MissingColumnPolicy,
    pub infer_schema_length: usize,
}

impl PipelineConfig {
    /// Default settings for the given dataset
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            model: ModelConfig::default(),
            label: LABEL_COLUMN.to_string(),
            test_size: DEFAULT_TEST_SIZE,
            seed: DEFAULT_SEED,
            missing_columns: MissingColumnPolicy::default(),
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
        }
    }
}

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingest,
    Preprocess,
    Split,
    Train,
    Evaluate,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Ingest,
        Stage::Preprocess,
        Stage::Split,
        Stage::Train,
        Stage::Evaluate,
    ];

    /// Human-readable title for headers
    pub fn title(&self) -> &'static str {
        match self {
            Stage::Ingest => "Ingest Data",
            Stage::Preprocess => "Preprocess",
            Stage::Split => "Train/Test Split",
            Stage::Train => "Train Model",
            Stage::Evaluate => "Evaluate Model",
        }
    }

    /// 1-based position in the pipeline
    pub fn number(&self) -> u8 {
        match self {
            Stage::Ingest => 1,
            Stage::Preprocess => 2,
            Stage::Split => 3,
            Stage::Train => 4,
            Stage::Evaluate => 5,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Ingest => "ingest",
            Stage::Preprocess => "preprocess",
            Stage::Split => "split",
            Stage::Train => "train",
            Stage::Evaluate => "evaluate",
        };
        write!(f, "{}", name)
    }
}

/// Hooks called around each stage, used by the CLI for progress output
pub trait StageObserver {
    fn on_start(&mut self, _stage: Stage) {}
    fn on_finish(&mut self, _stage: Stage, _elapsed: Duration) {}
}

impl StageObserver for () {}

/// Everything a successful run produces
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub scores: EvaluationScores,
    pub model: TrainedModel,
    pub rows_loaded: usize,
    pub columns_loaded: usize,
    /// Estimated in-memory size of the raw dataset
    pub memory_mb: f64,
    pub columns_retained: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub timings: Vec<(Stage, Duration)>,
}

impl PipelineOutcome {
    pub fn r2(&self) -> f64 {
        self.scores.r2
    }

    pub fn rmse(&self) -> f64 {
        self.scores.rmse
    }
}

/// Run the full pipeline.
///
/// The first failure aborts the run. It is logged once here, at error level
/// with the failing stage, and returned unchanged.
pub fn run_training_pipeline(
    config: &PipelineConfig,
    tracker: &mut dyn ExperimentTracker,
    observer: &mut dyn StageObserver,
) -> Result<PipelineOutcome, PipelineError> {
    let result = run_stages(config, tracker, observer);
    if let Err(err) = &result {
        tracing::error!(stage = err.stage(), error = %err, "pipeline failed");
    }
    result
}

fn run_stages(
    config: &PipelineConfig,
    tracker: &mut dyn ExperimentTracker,
    observer: &mut dyn StageObserver,
) -> Result<PipelineOutcome, PipelineError> {
    let split_strategy = SplitStrategy::new(config.label.clone(), config.test_size, config.seed)?;
    let mut timings = Vec::with_capacity(Stage::ALL.len());

    tracker.log_param("data_path", json!(config.data_path.display().to_string()));
    tracker.log_param("label", json!(config.label));
    tracker.log_param("test_size", json!(config.test_size));
    tracker.log_param("seed", json!(config.seed));

    let raw = timed(Stage::Ingest, observer, &mut timings, || {
        load_dataset(&config.data_path, config.infer_schema_length)
    })?;
    let (rows_loaded, columns_loaded) = raw.shape();
    let memory_mb = estimated_size_mb(&raw);
    tracing::debug!(memory_mb, "raw dataset size");

    let processed = timed(Stage::Preprocess, observer, &mut timings, || {
        let strategy = DataStrategy::Preprocess(
            PreprocessStrategy::new(config.missing_columns).with_label(config.label.clone()),
        );
        DataCleaning::new(&raw, strategy).run()?.into_processed()
    })
    .map_err(PipelineError::Preprocess)?;
    drop(raw);

    let split = timed(Stage::Split, observer, &mut timings, || {
        DataCleaning::new(&processed, DataStrategy::Split(split_strategy))
            .run()?
            .into_split()
    })
    .map_err(PipelineError::Split)?;

    let model = timed(Stage::Train, observer, &mut timings, || {
        train_model(&split.x_train, &split.y_train, &config.model, &mut *tracker)
    })?;

    let scores = timed(Stage::Evaluate, observer, &mut timings, || {
        evaluate_model(&model, &split.x_test, &split.y_test, &mut *tracker)
    })?;

    Ok(PipelineOutcome {
        scores,
        model,
        rows_loaded,
        columns_loaded,
        memory_mb,
        columns_retained: processed.width(),
        train_rows: split.train_rows.len(),
        test_rows: split.test_rows.len(),
        timings,
    })
}

fn timed<T, E>(
    stage: Stage,
    observer: &mut dyn StageObserver,
    timings: &mut Vec<(Stage, Duration)>,
    work: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    observer.on_start(stage);
    tracing::debug!(%stage, "stage started");
    let start = Instant::now();
    let value = work()?;
    let elapsed = start.elapsed();
    timings.push((stage, elapsed));
    observer.on_finish(stage, elapsed);
    tracing::info!(%stage, elapsed_ms = elapsed.as_millis() as u64, "stage finished");
    Ok(value)
}
