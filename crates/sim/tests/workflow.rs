//! End-to-end runs of the yearly engine.

use drift_sim::simulation::{DeathCause, SimulationBuilder, YearOutcome};

fn builder() -> SimulationBuilder {
    SimulationBuilder::new()
        .start_population(300)
        .max_population(400)
        .end_year(120)
        .seed_year(10)
        .save_interval(10)
        .seed(2024)
}

#[test]
fn test_invariants_hold_every_year() {
    let mut sim = builder()
        .track_mutations(true)
        .mutation_rate(3.0)
        .track_deaths(true)
        .build()
        .unwrap();

    while !sim.is_finished() {
        let year = sim.next_year();
        sim.step_year().unwrap();
        let population = sim.population();
        population.check_invariants().unwrap();

        let cap = sim.config().demography.effective_cap(year);
        assert!(population.size() <= cap, "year {year}: {} > {cap}", population.size());
        for ind in population.iter() {
            if let Some(genome) = ind.genome() {
                assert!(genome.allele_count() > 0);
            }
        }
    }
}

#[test]
fn test_mutation_histogram_counts_every_de_novo_mutation() {
    let mut sim = builder()
        .track_mutations(true)
        .mutation_rate(2.0)
        .build()
        .unwrap();
    sim.run().unwrap();

    let histogram = sim.mutation_histogram();
    assert!(!histogram.is_empty());
    let newest = sim.population().pool().iter().map(|m| m.id).max().unwrap_or(0);
    assert!(histogram.total() >= newest);

    let carried: usize = sim.population().iter().map(|i| i.mutation_count()).sum();
    let referenced: u64 = sim
        .population()
        .pool()
        .iter()
        .map(|m| u64::from(m.count()))
        .sum();
    assert_eq!(carried as u64, referenced);
}

#[test]
fn test_death_records_match_counters() {
    let mut sim = builder().track_deaths(true).build().unwrap();
    let mut actuarial = 0;
    let mut culled = 0;
    let mut records = Vec::new();
    for _ in 0..60 {
        if sim.step_year().unwrap() == YearOutcome::Extinct {
            break;
        }
        actuarial += sim.counters().actuarial_deaths;
        culled += sim.counters().culled_deaths;
        sim.reset_counters();
        records.extend(sim.drain_death_records());
    }

    let count = |cause| records.iter().filter(|r| r.cause == cause).count() as u64;
    assert_eq!(count(DeathCause::Actuarial), actuarial);
    assert_eq!(count(DeathCause::Culled), culled);
    assert!(sim.drain_death_records().is_empty());

    if let Some(founder) = sim.founder() {
        assert!(!records
            .iter()
            .any(|r| r.id == founder && r.cause == DeathCause::Culled));
    }
}

#[test]
fn test_same_seed_gives_identical_statistics() {
    let first = builder().track_mutations(true).build().unwrap().run().unwrap();
    let second = builder().track_mutations(true).build().unwrap().run().unwrap();
    assert!(!first.is_empty());
    assert_eq!(first, second);

    let other = builder()
        .seed(7)
        .track_mutations(true)
        .build()
        .unwrap()
        .run()
        .unwrap();
    assert_ne!(first, other);
}

#[test]
fn test_founder_genome_spreads_and_map_matches() {
    let mut sim = builder().build().unwrap();
    for _ in 0..40 {
        sim.step_year().unwrap();
    }
    assert!(sim.founder().is_some());

    let stats = sim.snapshot();
    let map = sim.genome_map();
    assert_eq!(map.len() as u64, stats.genetic_descendants);
    let chromosomes = sim.config().layout.num_chromosomes();
    for entry in map.iter() {
        assert_eq!(entry.copies[0].len(), chromosomes);
        assert_eq!(entry.copies[1].len(), chromosomes);
    }
    assert!(stats.genealogical_descendants >= stats.genetic_descendants);
}

#[test]
fn test_without_genome_tracking_nobody_carries_markers() {
    let mut sim = builder().track_genome(false).build().unwrap();
    let stats = sim.run().unwrap();
    assert!(sim.population().iter().all(|i| i.genome().is_none()));
    assert!(stats.iter().all(|s| s.genetic_descendants == 0 && s.alleles == 0));
    assert!(sim.genome_map().is_empty());
}

#[test]
fn test_bottleneck_limits_population() {
    let mut sim = builder().bottleneck(20, 30, 50).build().unwrap();
    while sim.next_year() <= 30 {
        let year = sim.next_year();
        if sim.step_year().unwrap() == YearOutcome::Extinct {
            break;
        }
        if year >= 20 {
            assert!(sim.population().size() <= 50);
        }
    }
}

#[test]
fn test_fitness_scale_sets_histogram_resolution() {
    let widest_bin = |scale: f64| {
        let mut config = builder()
            .track_mutations(true)
            .mutation_rate(2.0)
            .config()
            .clone();
        config.mutation.fitness_scale = scale;
        let mut sim = SimulationBuilder::from_config(config).build().unwrap();
        sim.run().unwrap();
        sim.mutation_histogram()
            .iter()
            .map(|(bin, _)| bin.abs())
            .max()
            .unwrap_or(0)
    };

    let fine = widest_bin(1_000_000.0);
    let coarse = widest_bin(1_000.0);
    assert!(fine > 0);
    assert!(coarse < fine, "coarse {coarse}, fine {fine}");
}
