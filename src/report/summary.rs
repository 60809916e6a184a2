//! Training run summary table

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{PipelineOutcome, Stage};

/// Summary of a finished training run
#[derive(Debug, Default)]
pub struct TrainingSummary {
    pub rows_loaded: usize,
    pub columns_loaded: usize,
    pub memory_mb: f64,
    pub columns_retained: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub model_name: String,
    pub r2: f64,
    pub rmse: f64,
    pub mse: f64,
    pub timings: Vec<(Stage, Duration)>,
}

impl TrainingSummary {
    pub fn from_outcome(outcome: &PipelineOutcome) -> Self {
        Self {
            rows_loaded: outcome.rows_loaded,
            columns_loaded: outcome.columns_loaded,
            memory_mb: outcome.memory_mb,
            columns_retained: outcome.columns_retained,
            train_rows: outcome.train_rows,
            test_rows: outcome.test_rows,
            model_name: outcome.model.kind().to_string(),
            r2: outcome.scores.r2,
            rmse: outcome.scores.rmse,
            mse: outcome.scores.mse,
            timings: outcome.timings.clone(),
        }
    }

    pub fn total_time(&self) -> Duration {
        self.timings.iter().map(|(_, elapsed)| *elapsed).sum()
    }

    /// Build the results table
    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("📁 Rows Loaded"),
            Cell::new(self.rows_loaded),
        ]);
        table.add_row(vec![
            Cell::new("💾 Memory"),
            Cell::new(format!("{:.1} MB", self.memory_mb)),
        ]);
        table.add_row(vec![
            Cell::new("🧹 Columns (raw → cleaned)"),
            Cell::new(format!("{} → {}", self.columns_loaded, self.columns_retained)),
        ]);
        table.add_row(vec![
            Cell::new("✂️  Train / Test Rows"),
            Cell::new(format!("{} / {}", self.train_rows, self.test_rows)),
        ]);
        table.add_row(vec![Cell::new("🧠 Model"), Cell::new(&self.model_name)]);

        let r2_color = if self.r2 >= 0.5 {
            Color::Green
        } else if self.r2 >= 0.1 {
            Color::Yellow
        } else {
            Color::Red
        };
        table.add_row(vec![
            Cell::new("📈 R²"),
            Cell::new(format!("{:.4}", self.r2))
                .fg(r2_color)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("📏 RMSE"),
            Cell::new(format!("{:.4}", self.rmse))
                .fg(Color::Cyan)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("📐 MSE"),
            Cell::new(format!("{:.4}", self.mse)),
        ]);
        table.add_row(vec![
            Cell::new("⏱️  Total Time"),
            Cell::new(format!("{:.2}s", self.total_time().as_secs_f64())),
        ]);

        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("TRAINING SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        // Indent the table
        for line in self.table().to_string().lines() {
            println!("    {}", line);
        }

        if !self.timings.is_empty() {
            println!();
            println!(
                "    {} {}",
                style("⏱").cyan(),
                style("STAGE TIMINGS").white().bold()
            );
            println!("    {}", style("─".repeat(50)).dim());
            for (stage, elapsed) in &self.timings {
                println!(
                    "        {} {:<18} {}",
                    style("•").dim(),
                    stage.title(),
                    style(format!("{:.2}s", elapsed.as_secs_f64())).dim()
                );
            }
        }
    }
}
