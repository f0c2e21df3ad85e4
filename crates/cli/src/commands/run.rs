use anyhow::{Context, Result};
use drift_sim::simulation::{Simulation, YearOutcome, YearStats};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::args::RunArgs;
use crate::printing::print_parameters;
use crate::report::{write_genome_map, write_histogram, CsvWriter, ReportPaths, DEATH_HEADER};
use crate::utils::load_config;

pub fn run_simulation(args: &RunArgs) -> Result<()> {
    println!("🧬 Drift - Running Simulation");
    println!("============================================\n");

    let mut config = load_config(&args.config)
        .context("Failed to load configuration. Did you run 'drift init' first?")?;
    if let Some(seed) = args.seed {
        config.execution.seed = Some(seed);
    }
    if let Some(runs) = args.runs {
        config.execution.runs = runs;
    }
    if let Some(years) = args.years {
        config.execution.end_year = years;
    }
    if let Some(interval) = args.save_every {
        config.execution.save_interval = interval;
    }
    config.validate().context("Invalid configuration")?;

    println!("Configuration:");
    print_parameters(&config);

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    let paths = ReportPaths::new(&args.output, &args.name);
    let mut results = CsvWriter::create(&paths.results(), &YearStats::HEADER)?;
    let years = u64::try_from(config.execution.end_year + 1).unwrap_or(0);

    for run in 1..=config.execution.runs {
        println!("Run {run}/{}", config.execution.runs);
        let mut sim = Simulation::new(config.clone(), run)
            .with_context(|| format!("Failed to initialize run {run}"))?;
        println!("  Seed: {}", sim.seed());

        let mut deaths = if config.tracking.deaths {
            Some(CsvWriter::create(&paths.deaths(run), &DEATH_HEADER)?)
        } else {
            None
        };

        let pb = if args.progress {
            let pb = ProgressBar::new(years);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
                    )?
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        while !sim.is_finished() {
            let year = sim.next_year();
            let (outcome, emitted) = sim
                .advance()
                .with_context(|| format!("Run {run}, year {year}"))?;

            if let Some(deaths) = deaths.as_mut() {
                deaths.deaths(&sim.drain_death_records())?;
            }
            if let Some(stats) = emitted {
                results.stats(&stats)?;
            }

            if let Some(pb) = &pb {
                pb.set_message(format!("n={}", sim.population().size()));
                pb.inc(1);
            }
            if outcome == YearOutcome::Extinct {
                println!("  ⚠️  Population extinct in year {year}");
            }
        }

        if let Some(pb) = pb {
            pb.finish_with_message("Done");
        }
        if let Some(deaths) = deaths {
            deaths.finish()?;
        }
        if config.tracking.mutations {
            write_histogram(&paths.histogram(run), sim.mutation_histogram())?;
        }
        if config.tracking.genome {
            write_genome_map(&paths.genome_map(run), &sim.genome_map())?;
        }
        info!(run, dir = %args.output.display(), "run files written");

        println!("  ✓ Final population: {}", sim.population().size());
        match sim.founder() {
            Some(founder) => println!("  ✓ Founder: {founder}"),
            None => println!("  ⚠️  No founder was selected"),
        }
    }

    results.finish()?;
    println!("\n✓ Simulation complete!");
    println!("  Results: {}", paths.results().display());
    Ok(())
}
