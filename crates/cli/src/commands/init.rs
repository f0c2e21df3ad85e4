use anyhow::{Context, Result};
use drift_sim::simulation::{Bottleneck, Configuration};

use crate::args::InitArgs;
use crate::printing::print_parameters;

/// Default configuration with the command-line overrides applied.
pub fn build_config(args: &InitArgs) -> Configuration {
    let mut config = Configuration::default();

    let exec = &mut config.execution;
    exec.runs = args.runs;
    exec.start_population = args.start_population;
    exec.end_year = args.end_year;
    exec.seed_year = args.seed_year;
    exec.save_interval = args.save_interval;
    exec.seed = args.seed;

    let demo = &mut config.demography;
    demo.max_population = args.max_population;
    demo.max_breeding = args.max_breeding;
    demo.bottleneck = args
        .bottleneck
        .map(|(start, end, size)| Bottleneck { start, end, size });

    config.tracking.genome = !args.no_genome;
    config.tracking.mutations = args.track_mutations;
    config.tracking.deaths = args.track_deaths;
    config.mutation.rate = args.mutation_rate;

    config
}

pub fn init_config(args: &InitArgs) -> Result<()> {
    println!("🧬 Drift - Founder Lineage Simulator");
    println!("============================================\n");

    let output = &args.output;
    if output.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    let config = build_config(args);
    config.validate().context("Invalid configuration")?;

    println!("Configuration:");
    print_parameters(&config);

    let json = serde_json::to_string_pretty(&config).context("Failed to serialize configuration")?;
    std::fs::write(output, json)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("✓ Configuration written to {}", output.display());
    println!("\n💡 Use 'drift run -c {}' to start", output.display());
    Ok(())
}
