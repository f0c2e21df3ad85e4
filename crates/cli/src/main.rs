mod args;
mod commands;
pub mod defaults;
mod printing;
mod report;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use args::{InitArgs, RunArgs};
use commands::{init, run, validate};

/// Drift: A Founder Lineage Simulator
///
/// This tool follows a human population year by year and tracks how much of
/// one founder's genome, lineage and mutation load survives in it.
#[derive(Parser, Debug)]
#[command(name = "drift")]
#[command(author, version, about = "Simulates the spread of a founder's genome through a population", long_about = None)]
struct Cli {
    /// Number of threads used for statistics
    ///
    /// If not specified, defaults to the number of logical CPUs.
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    /// Emit diagnostic logs (filter with RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a configuration file.
    ///
    /// Starts from the built-in defaults and applies the given overrides.
    Init(Box<InitArgs>),

    /// Run every configured model run and write the result files.
    Run(RunArgs),

    /// Check a configuration file and print a summary.
    Validate {
        /// Configuration file
        #[arg(short, long, default_value = defaults::CONFIG_FILE)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Commands::Init(args) => {
            init::init_config(&args)?;
        }
        Commands::Run(args) => {
            run::run_simulation(&args)?;
        }
        Commands::Validate { config } => {
            validate::validate_config(&config)?;
        }
    }

    Ok(())
}
