//! Progress spinners using indicatif

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::pipeline::{Stage, StageObserver};
use crate::utils::{print_step_header, print_step_time};

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("    {spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Finish a spinner with a success message
pub fn finish_with_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✅ {}", message));
}

/// Finish a spinner with a failure message
pub fn finish_with_failure(pb: &ProgressBar, message: &str) {
    pb.abandon_with_message(format!("❌ {}", message));
}

fn running_message(stage: Stage) -> &'static str {
    match stage {
        Stage::Ingest => "Reading dataset...",
        Stage::Preprocess => "Cleaning columns...",
        Stage::Split => "Splitting train/test sets...",
        Stage::Train => "Fitting model...",
        Stage::Evaluate => "Scoring predictions...",
    }
}

fn done_message(stage: Stage) -> &'static str {
    match stage {
        Stage::Ingest => "Dataset loaded",
        Stage::Preprocess => "Preprocessing complete",
        Stage::Split => "Split complete",
        Stage::Train => "Model trained",
        Stage::Evaluate => "Evaluation complete",
    }
}

/// Prints a step header and shows a spinner while each stage runs
#[derive(Default)]
pub struct ConsoleObserver {
    spinner: Option<ProgressBar>,
}

impl ConsoleObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the running stage (if any) as failed
    pub fn fail(&mut self, message: &str) {
        if let Some(pb) = self.spinner.take() {
            finish_with_failure(&pb, message);
        }
    }
}

impl StageObserver for ConsoleObserver {
    fn on_start(&mut self, stage: Stage) {
        print_step_header(stage.number(), stage.title());
        self.spinner = Some(create_spinner(running_message(stage)));
    }

    fn on_finish(&mut self, stage: Stage, elapsed: Duration) {
        if let Some(pb) = self.spinner.take() {
            finish_with_success(&pb, done_message(stage));
        }
        print_step_time(elapsed);
    }
}
