// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Arguments are parsed
// with clap; all work is delegated to Layer 2 (application).
//
//   1. `train`    — loads the paired corpus and trains the model
//   2. `generate` — loads a checkpoint and prints greedy samples

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, GenerateArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "paired-seq2seq",
    version = "0.1.0",
    about = "Train a recurrent encoder-decoder on a paired corpus, then sample from it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Generate(args) => run_generate(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on corpus in: {}", args.data_dir);

    let report = TrainUseCase::new(args.into()).execute()?;

    println!(
        "Training complete. Best epoch {} (valid_loss={:.4}, test_loss={:.4}).",
        report.best_epoch, report.best_valid_loss, report.test_loss
    );
    print_samples(&report.samples);
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    use crate::application::generate_use_case::GenerateUseCase;

    let use_case = GenerateUseCase::new(&args.checkpoint_dir)?;
    let samples  = use_case.generate(args.num_samples, args.max_len)?;
    print_samples(&samples);
    Ok(())
}

fn print_samples(samples: &[Vec<String>]) {
    for (i, sample) in samples.iter().enumerate() {
        println!("{:>3}: {}", i + 1, sample.join(" "));
    }
}
