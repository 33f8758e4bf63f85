use std::io::{stdin, stdout};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tsr_cli::app::{self, RunOptions};
use tsr_cli::{Cli, Commands, Config};
use tsr_core::ProcessMetadata;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match cli.command {
        Some(Commands::Run {
            export_dir,
            process_name,
            product_description,
            line,
            units_per_bag,
            bags_per_case,
            cases_per_pallet,
        }) => {
            let config =
                Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
            tracing::debug!(?config, "loaded configuration");

            let metadata = ProcessMetadata {
                process_name: process_name.unwrap_or_default(),
                product_description: product_description.unwrap_or_default(),
                line: line.unwrap_or_default(),
                units_per_bag: units_per_bag.unwrap_or_default(),
                bags_per_case: bags_per_case.unwrap_or_default(),
                cases_per_pallet: cases_per_pallet.unwrap_or_default(),
            };
            let options = RunOptions {
                metadata,
                export_dir: export_dir.unwrap_or(config.export_dir),
                live_clock: true,
            };

            let stdin = stdin();
            app::run(stdin.lock(), stdout(), options)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
