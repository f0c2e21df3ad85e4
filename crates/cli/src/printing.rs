use drift_sim::simulation::Configuration;

pub fn print_parameters(config: &Configuration) {
    let exec = &config.execution;
    let demo = &config.demography;
    let mutation = &config.mutation;
    let tracking = &config.tracking;

    println!("\n📋 Run Configuration");
    println!("  • Runs: {} [--runs]", exec.runs);
    println!("  • Years: 0..={} [--years]", exec.end_year);
    println!("  • Starting Population: {}", exec.start_population);
    println!("  • Founder Selected From Year: {}", exec.seed_year);
    println!("  • Statistics Every: {} years [--save-every]", exec.save_interval);
    if let Some(seed) = exec.seed {
        println!("  • Random Seed: {seed} [--seed]");
    } else {
        println!("  • Random Seed: Random [--seed]");
    }

    println!("\n👪 Demography");
    println!("  • Maturity Age: {}", demo.maturity_age);
    println!(
        "  • Lifespan: {} (min {}, decay {:.3})",
        demo.initial_lifespan, demo.min_lifespan, demo.lifespan_decay
    );
    println!(
        "  • Fertility: {:.2} per year, spacing {} years",
        demo.fertility_probability, demo.birth_spacing
    );
    println!("  • Population Cap: {}", demo.max_population);
    println!("  • Max Growth Rate: {:.3}", demo.max_growth_rate);
    if let Some(max_breeding) = demo.max_breeding {
        println!("  • Breeding Cap: {max_breeding}");
    }
    if let Some(b) = demo.bottleneck {
        println!("  • Bottleneck: {} in years {}..={}", b.size, b.start, b.end);
    }

    println!("\n🧬 Genome");
    println!(
        "  • Chromosomes: {} ({} bits)",
        config.layout.num_chromosomes(),
        config.layout.genome_bits()
    );
    println!("  • Actuarial Brackets: {}", config.actuarial.brackets.len());

    println!("\n⚡ Tracking");
    println!("  • Founder Genome: {}", on_off(tracking.genome));
    if tracking.mutations {
        println!(
            "  • Mutations: On ({:.2} per birth, {:.1}% neutral, {:.2}% beneficial)",
            mutation.rate,
            mutation.fraction_neutral * 100.0,
            mutation.fraction_beneficial * 100.0
        );
    } else {
        println!("  • Mutations: Off");
    }
    println!("  • Deaths: {}", on_off(tracking.deaths));
    println!();
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "On" } else { "Off" }
}
