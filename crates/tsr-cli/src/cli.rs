//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Manual time-and-motion study recorder.
///
/// Runs a stopwatch against a production run while the operator tags
/// downtime, operator tasks, and pallet completions, then exports the
/// session as CSV.
#[derive(Debug, Parser)]
#[command(name = "tsr", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record a time study interactively.
    Run {
        /// Directory to write exports into (overrides config).
        #[arg(long)]
        export_dir: Option<PathBuf>,

        /// Name of the process under study.
        #[arg(long)]
        process_name: Option<String>,

        /// Description of the product being run.
        #[arg(long)]
        product_description: Option<String>,

        /// Production line identifier.
        #[arg(long)]
        line: Option<String>,

        /// Units packed per bag.
        #[arg(long)]
        units_per_bag: Option<String>,

        /// Bags packed per case.
        #[arg(long)]
        bags_per_case: Option<String>,

        /// Cases stacked per pallet.
        #[arg(long)]
        cases_per_pallet: Option<String>,
    },
}
