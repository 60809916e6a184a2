//! csat: Review-Score Regression CLI
//!
//! Ingests an order export, cleans it, trains a linear regression on the
//! review score and reports R² and RMSE on a held-out split.

use anyhow::Result;
use clap::Parser;

use csat::cli::Cli;
use csat::pipeline::run_training_pipeline;
use csat::report::{RunRecorder, TrainingSummary};
use csat::utils::{
    init_logging, print_banner, print_completion, print_config, print_info, print_success,
    ConsoleObserver,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.pipeline_config();

    // Print styled banner and configuration card
    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&config);

    let mut recorder = RunRecorder::new();
    let mut observer = ConsoleObserver::new();

    // The driver has already logged the failure; exit non-zero with it
    let outcome = match run_training_pipeline(&config, &mut recorder, &mut observer) {
        Ok(outcome) => outcome,
        Err(err) => {
            observer.fail(&format!("{} stage failed", err.stage()));
            return Err(err.into());
        }
    };

    println!();
    print_success(&format!(
        "R² = {:.4}, RMSE = {:.4}",
        outcome.r2(),
        outcome.rmse()
    ));

    TrainingSummary::from_outcome(&outcome).display();

    if let Some(report_path) = &cli.report {
        if let Err(err) = recorder.export(&config.data_path, report_path) {
            tracing::error!(error = %err, "failed to write run record");
            return Err(err);
        }
        println!();
        print_info(&format!("Run record written to {}", report_path.display()));
    }

    print_completion();

    Ok(())
}
