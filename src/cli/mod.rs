// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `prepare` — corpus + word vectors → IMDB_* tensor files
//   2. `train`   — tensors → trained model, test accuracy
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PrepareArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "imdb-sentiment",
    version = "0.1.0",
    about = "Prepare IMDB reviews as fixed-shape tensors, then train a sentiment classifier."
)]
pub struct Cli {
    /// The subcommand to run (prepare or train)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Thin router: match on the subcommand, hand off to a use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Prepare(args) => run_prepare(args),
            Commands::Train(args) => run_train(args),
        }
    }
}

fn run_prepare(args: PrepareArgs) -> Result<()> {
    use crate::application::prepare_use_case::PrepareUseCase;

    tracing::info!("Preparing corpus from: {}", args.data_dir);
    PrepareUseCase::new(args.into()).execute()?;

    println!("Preparation complete.");
    Ok(())
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Training on tensors in: {}", args.data_dir);
    let accuracy = TrainUseCase::new(args.into()).execute()?;

    println!("Training complete. Test accuracy: {:.2}%", accuracy * 100.0);
    Ok(())
}
