use clap::Args;
use std::path::PathBuf;

use crate::defaults;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Configuration file to write
    #[arg(short, long, default_value = defaults::CONFIG_FILE)]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,

    /// Number of model runs
    #[arg(short = 'r', long, default_value_t = defaults::RUNS)]
    pub runs: usize,

    /// Starting population size
    #[arg(short = 'n', long, default_value_t = defaults::START_POPULATION)]
    pub start_population: usize,

    /// Last simulated year (inclusive)
    #[arg(short = 'y', long, default_value_t = defaults::END_YEAR)]
    pub end_year: i64,

    /// Year from which a founder is chosen
    #[arg(long, default_value_t = defaults::SEED_YEAR)]
    pub seed_year: i64,

    /// Write statistics every N years
    #[arg(long, default_value_t = defaults::SAVE_INTERVAL)]
    pub save_interval: i64,

    /// Hard population cap
    #[arg(long, default_value_t = defaults::MAX_POPULATION)]
    pub max_population: usize,

    /// Cap on mature non-founders
    #[arg(long)]
    pub max_breeding: Option<usize>,

    /// Bottleneck as START:END:SIZE
    #[arg(long, value_parser = parse_bottleneck)]
    pub bottleneck: Option<(i64, i64, usize)>,

    /// Do not track founder genome markers
    #[arg(long)]
    pub no_genome: bool,

    /// Track de novo mutations and their fitness effects
    #[arg(long)]
    pub track_mutations: bool,

    /// Record every death
    #[arg(long)]
    pub track_deaths: bool,

    /// Mean de novo mutations per birth
    #[arg(long, default_value_t = defaults::MUTATION_RATE)]
    pub mutation_rate: f64,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Configuration file
    #[arg(short, long, default_value = defaults::CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory for result files
    #[arg(short, long, default_value = defaults::OUTPUT_DIR)]
    pub output: PathBuf,

    /// Prefix of result file names
    #[arg(short = 'N', long, default_value = defaults::SIMULATION_NAME)]
    pub name: String,

    /// Override random seed (default: use configured seed)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override number of runs
    #[arg(long)]
    pub runs: Option<usize>,

    /// Override the last simulated year
    #[arg(long)]
    pub years: Option<i64>,

    /// Override statistics interval
    #[arg(long)]
    pub save_every: Option<i64>,

    /// Show progress bar
    #[arg(long, default_value = "true", action = clap::ArgAction::Set)]
    pub progress: bool,
}

fn parse_bottleneck(value: &str) -> Result<(i64, i64, usize), String> {
    let parts: Vec<&str> = value.split(':').collect();
    let [start, end, size] = parts.as_slice() else {
        return Err(format!("expected START:END:SIZE, got '{value}'"));
    };
    let start = start.parse().map_err(|e| format!("start: {e}"))?;
    let end = end.parse().map_err(|e| format!("end: {e}"))?;
    let size = size.parse().map_err(|e| format!("size: {e}"))?;
    Ok((start, end, size))
}
