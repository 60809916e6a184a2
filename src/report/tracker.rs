//! Experiment tracking
//!
//! Training and evaluation take an explicit `&mut dyn ExperimentTracker` and
//! log parameters and metrics into it. [`RunRecorder`] keeps them in memory and
//! can export a JSON run record; [`NoopTracker`] discards everything.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

/// Sink for run parameters and metrics
pub trait ExperimentTracker {
    fn log_param(&mut self, key: &str, value: Value);
    fn log_metric(&mut self, key: &str, value: f64);
}

/// Tracker that drops everything it is given
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracker;

impl ExperimentTracker for NoopTracker {
    fn log_param(&mut self, _key: &str, _value: Value) {}
    fn log_metric(&mut self, _key: &str, _value: f64) {}
}

/// Metadata about the run
#[derive(Debug, Serialize)]
pub struct RunMetadata {
    /// Timestamp of the export (ISO 8601 format)
    pub timestamp: String,
    /// csat version
    pub csat_version: String,
    /// Input dataset path
    pub input_file: String,
}

/// Complete run record as written to disk
#[derive(Debug, Serialize)]
pub struct RunRecord<'a> {
    pub metadata: RunMetadata,
    pub params: &'a BTreeMap<String, Value>,
    pub metrics: &'a BTreeMap<String, f64>,
}

/// In-memory tracker; later values for the same key overwrite earlier ones
#[derive(Debug, Default, Clone)]
pub struct RunRecorder {
    params: BTreeMap<String, Value>,
    metrics: BTreeMap<String, f64>,
}

impl RunRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(&self) -> &BTreeMap<String, Value> {
        &self.params
    }

    pub fn metrics(&self) -> &BTreeMap<String, f64> {
        &self.metrics
    }

    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).copied()
    }

    /// True when nothing has been logged
    pub fn is_empty(&self) -> bool {
        self.params.is_empty() && self.metrics.is_empty()
    }

    pub fn record(&self, input_file: &Path) -> RunRecord<'_> {
        RunRecord {
            metadata: RunMetadata {
                timestamp: Utc::now().to_rfc3339(),
                csat_version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: input_file.display().to_string(),
            },
            params: &self.params,
            metrics: &self.metrics,
        }
    }

    /// Write the run record to a pretty-printed JSON file
    pub fn export(&self, input_file: &Path, output_path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.record(input_file))
            .context("Failed to serialize run record to JSON")?;

        std::fs::write(output_path, json)
            .with_context(|| format!("Failed to write run record to {}", output_path.display()))?;

        tracing::info!(path = %output_path.display(), "run record written");
        Ok(())
    }
}

impl ExperimentTracker for RunRecorder {
    fn log_param(&mut self, key: &str, value: Value) {
        self.params.insert(key.to_string(), value);
    }

    fn log_metric(&mut self, key: &str, value: f64) {
        self.metrics.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recorder_overwrites_keys() {
        let mut recorder = RunRecorder::new();
        recorder.log_metric("rmse", 1.5);
        recorder.log_metric("rmse", 1.2);
        assert_eq!(recorder.metric("rmse"), Some(1.2));
        assert_eq!(recorder.metrics().len(), 1);
    }

    #[test]
    fn test_recorder_empty() {
        let mut recorder = RunRecorder::new();
        assert!(recorder.is_empty());
        recorder.log_param("model_name", json!("LinearRegression"));
        assert!(!recorder.is_empty());
    }

    #[test]
    fn test_export_writes_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("run.json");

        let mut recorder = RunRecorder::new();
        recorder.log_param("seed", json!(42));
        recorder.log_metric("r2", 0.25);
        recorder.export(Path::new("orders.csv"), &out).unwrap();

        let parsed: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(parsed["params"]["seed"], json!(42));
        assert_eq!(parsed["metrics"]["r2"], json!(0.25));
        assert_eq!(parsed["metadata"]["input_file"], json!("orders.csv"));
    }
}
