//! CLI for the offline training pipeline.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use gemprice::{ModelFamily, ModelStore, TrainingPipeline};

/// Train a diamond price model and persist it, promoting it to best if it
/// outperforms the current best by test-set R².
#[derive(Debug, Parser)]
#[command(name = "train", version)]
struct Args {
    /// Path to the training CSV.
    data: PathBuf,

    /// Model family to train (linear | xgboost).
    #[arg(long, short)]
    model: ModelFamily,

    /// Directory for model artifacts and metrics.
    #[arg(long, default_value = "models")]
    models_dir: PathBuf,

    /// Seed for the train/test split.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Fraction of rows held out for evaluation.
    #[arg(long, default_value_t = 0.2)]
    test_fraction: f32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let store = ModelStore::open(&args.models_dir)
        .with_context(|| format!("opening model store at {}", args.models_dir.display()))?;

    let report = TrainingPipeline::new(args.model)
        .with_seed(args.seed)
        .with_test_fraction(args.test_fraction)
        .run(&args.data, &store)
        .context("training pipeline failed")?;

    println!("MAE: {:.4}", report.artifact.metrics.mae);
    println!("R2:  {:.4}", report.artifact.metrics.r2);
    if report.promoted {
        println!("New best model saved.");
    } else {
        println!("Model did not outperform the existing best model.");
    }
    Ok(())
}
