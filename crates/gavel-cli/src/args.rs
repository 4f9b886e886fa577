use clap::{Parser, Subcommand};
use gavel_core::model::PipelineMode;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gavel", version, about = "Hybrid validation router for agent responses")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate a suite of cases and gate on the verdicts.
    Run {
        /// Path to the suite YAML file.
        #[arg(long)]
        suite: PathBuf,

        /// Pipeline mode; overrides the suite file. ONLINE runs the fast
        /// sampled path, OFFLINE full coverage.
        #[arg(long, env = "PIPELINE_MODE")]
        mode: Option<PipelineMode>,

        /// Seed for sampling decisions; overrides the suite file.
        #[arg(long)]
        seed: Option<u64>,

        /// Concurrent case evaluations.
        #[arg(long)]
        parallel: Option<usize>,

        /// Also write a JSON report to this path.
        #[arg(long)]
        json: Option<PathBuf>,

        /// Print every per-case verdict, not only failures.
        #[arg(long)]
        verbose: bool,
    },
    /// Load and validate a suite file without evaluating anything.
    Validate {
        #[arg(long)]
        suite: PathBuf,
    },
}
