// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes each subcommand to its
// use case in Layer 2. This layer only routes and prints.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{CleanArgs, Commands, PrepareArgs, SplitArgs};

use crate::data::splitter::SplitOutcome;

#[derive(Parser, Debug)]
#[command(
    name = "news-splits",
    version,
    about = "Clean a labeled news corpus and cut deterministic, class-balanced train/dev/test splits."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Clean(args) => run_clean(args),
            Commands::Split(args) => run_split(args),
            Commands::Prepare(args) => run_prepare(args),
        }
    }
}

fn run_clean(args: CleanArgs) -> Result<()> {
    use crate::application::clean_use_case::CleanUseCase;

    let output_dir = args.output_dir.clone();
    let corpus = CleanUseCase::new(args.into()).execute()?;

    println!(
        "Cleaned {} records in {} classes → {}",
        corpus.len(),
        corpus.label_map().len(),
        output_dir
    );
    Ok(())
}

fn run_split(args: SplitArgs) -> Result<()> {
    use crate::application::split_use_case::SplitUseCase;

    let output_dir = args.output_dir.clone();
    let outcome = SplitUseCase::new(args.try_into()?).execute()?;
    print_summary(&outcome, &output_dir);
    Ok(())
}

fn run_prepare(args: PrepareArgs) -> Result<()> {
    use crate::application::prepare_use_case::PrepareUseCase;

    let output_dir = args.output_dir.clone();
    let outcome = PrepareUseCase::new(args.try_into()?).execute()?;
    print_summary(&outcome, &output_dir);
    Ok(())
}

fn print_summary(outcome: &SplitOutcome, output_dir: &str) {
    let p = &outcome.partitions;
    println!(
        "Split {} classes ({} pruned), train quota {} per class, {} dev/test rows each: \
         {} train / {} dev / {} test → {}",
        outcome.plan.len(),
        outcome.pruned.len(),
        outcome.plan.base_train(),
        outcome.plan.devtest_n(),
        p.train.len(),
        p.dev.len(),
        p.test.len(),
        output_dir
    );
}
