use passphaser::catalog::Catalog;
use passphaser::config::{EvolutionConfig, SelectionMethod};
use passphaser::data::{load_population, save_population, FitnessCache};
use passphaser::engines::evaluation::{EvaluationError, FitnessMetric};
use passphaser::engines::generation::{
    Chromosome, EvolutionEngine, GenerationSummary, MutationKind, MutationPolicy, MutationScope,
    Population, ProgressCallback, StopReason,
};
use passphaser::types::Cost;
use std::sync::Arc;

/// Records every summary it sees.
#[derive(Default)]
struct RecordingProgress {
    started: Vec<usize>,
    completed: Vec<GenerationSummary>,
}

impl ProgressCallback for &mut RecordingProgress {
    fn on_generation_start(&mut self, generation: usize) {
        self.started.push(generation);
    }

    fn on_generation_complete(&mut self, summary: &GenerationSummary, _population: &Population) {
        self.completed.push(summary.clone());
    }
}

fn yul_like_catalog() -> Catalog {
    Catalog::from_abbreviations(&[
        ("BlockFlattener", 'f'),
        ("CommonSubexpressionEliminator", 'c'),
        ("DeadCodeEliminator", 'D'),
        ("ExpressionSimplifier", 's'),
        ("FullInliner", 'i'),
        ("UnusedPruner", 'u'),
    ])
    .unwrap()
}

/// Cost is the chromosome length, so the optimum is the empty sequence.
fn length_metric() -> Arc<dyn FitnessMetric> {
    Arc::new(|chromosome: &Chromosome| -> Result<Cost, EvaluationError> {
        Ok(Cost(chromosome.len() as u64))
    })
}

/// Rewards `s` steps and penalises everything else; sequences with `i` fail.
fn picky_metric() -> Arc<dyn FitnessMetric> {
    Arc::new(|chromosome: &Chromosome| -> Result<Cost, EvaluationError> {
        let encoded = chromosome.encode();
        if encoded.contains('i') {
            return Err(EvaluationError::Rejected("inliner not allowed".to_string()));
        }
        let simplifiers = encoded.chars().filter(|c| *c == 's').count() as u64;
        let others = encoded.len() as u64 - simplifiers;
        Ok(Cost(100 + others * 3 - simplifiers.min(5) * 10))
    })
}

fn create_test_evolution_config() -> EvolutionConfig {
    EvolutionConfig {
        population_size: 12,
        elite_count: 2,
        max_generations: Some(8),
        seed: Some(20240611),
        min_chromosome_length: 3,
        max_chromosome_length: 10,
        ..Default::default()
    }
}

fn run(config: EvolutionConfig, catalog: &Catalog, metric: Arc<dyn FitnessMetric>) -> passphaser::engines::generation::EvolutionResult {
    let cache = Arc::new(FitnessCache::new(metric));
    let mut engine = EvolutionEngine::new(config, catalog, cache).unwrap();
    engine.run()
}

#[test]
fn test_same_seed_same_run_regardless_of_workers() {
    let catalog = yul_like_catalog();

    let single = run(
        EvolutionConfig {
            workers: Some(1),
            ..create_test_evolution_config()
        },
        &catalog,
        picky_metric(),
    );
    let parallel = run(
        EvolutionConfig {
            workers: Some(4),
            ..create_test_evolution_config()
        },
        &catalog,
        picky_metric(),
    );

    assert_eq!(single.history, parallel.history);
    assert_eq!(single.best, parallel.best);
    assert_eq!(single.evaluations, parallel.evaluations);
    let single_members: Vec<&Chromosome> = single.final_population.chromosomes().collect();
    let parallel_members: Vec<&Chromosome> = parallel.final_population.chromosomes().collect();
    assert_eq!(single_members, parallel_members);
}

#[test]
fn test_different_seeds_diverge() {
    let catalog = yul_like_catalog();
    let first = run(create_test_evolution_config(), &catalog, picky_metric());
    let second = run(
        EvolutionConfig {
            seed: Some(99),
            ..create_test_evolution_config()
        },
        &catalog,
        picky_metric(),
    );

    let first_members: Vec<String> = first.final_population.chromosomes().map(Chromosome::encode).collect();
    let second_members: Vec<String> = second.final_population.chromosomes().map(Chromosome::encode).collect();
    assert_ne!(first_members, second_members);
}

#[test]
fn test_best_never_gets_worse_with_elitism() {
    let catalog = yul_like_catalog();
    for selection_method in [SelectionMethod::Uniform, SelectionMethod::Rank, SelectionMethod::Tournament] {
        let result = run(
            EvolutionConfig {
                selection_method,
                max_generations: Some(15),
                ..create_test_evolution_config()
            },
            &catalog,
            picky_metric(),
        );

        for pair in result.history.windows(2) {
            assert!(
                pair[1].best <= pair[0].best,
                "{:?}: generation {} got worse",
                selection_method,
                pair[1].generation
            );
        }
        assert_eq!(result.history.last().unwrap().best, result.best.fitness);
    }
}

#[test]
fn test_deletion_only_search_reaches_empty_sequence() {
    let catalog = yul_like_catalog();
    let config = EvolutionConfig {
        population_size: 8,
        elite_count: 1,
        max_generations: Some(60),
        target_cost: Some(0),
        crossover_enabled: false,
        mutation: MutationPolicy::only(MutationKind::Deletion, 1.0, MutationScope::PerChromosome),
        include_empty_baseline: false,
        min_chromosome_length: 2,
        max_chromosome_length: 6,
        ..create_test_evolution_config()
    };

    let result = run(config, &catalog, length_metric());

    assert_eq!(result.stop_reason, StopReason::TargetReached);
    assert!(result.best.chromosome.is_empty());
    assert_eq!(result.best.cost(), Some(Cost(0)));
    assert!(result.history[0].best.unwrap().cost().unwrap().0 >= 2);
}

#[test]
fn test_mixed_mutation_search_reaches_empty_sequence() {
    let catalog = yul_like_catalog();
    for seed in [1u64, 7, 42, 2024] {
        let config = EvolutionConfig {
            population_size: 10,
            elite_count: 1,
            max_generations: Some(200),
            target_cost: Some(0),
            crossover_enabled: false,
            mutation: MutationPolicy {
                probability: 1.0,
                ..MutationPolicy::default()
            },
            include_empty_baseline: false,
            min_chromosome_length: 2,
            max_chromosome_length: 6,
            seed: Some(seed),
            ..create_test_evolution_config()
        };

        let result = run(config, &catalog, length_metric());

        assert_eq!(result.stop_reason, StopReason::TargetReached, "seed {}", seed);
        assert!(result.best.chromosome.is_empty());
        assert!(result.history[0].best.unwrap().cost().unwrap().0 >= 2);
    }
}

#[test]
fn test_cache_accounts_for_every_lookup() {
    let catalog = yul_like_catalog();
    let config = create_test_evolution_config();
    let cache = Arc::new(FitnessCache::new(picky_metric()));
    let mut engine = EvolutionEngine::new(config.clone(), &catalog, Arc::clone(&cache)).unwrap();
    let result = engine.run();

    // Elites keep their fitness, every other member is looked up once.
    let lookups = config.population_size as u64
        + (result.generations as u64 - 1) * (config.population_size - config.elite_count) as u64;
    assert_eq!(result.evaluations + result.cache_hits, lookups);
    assert_eq!(result.evaluations, cache.len() as u64);
    assert_eq!(cache.evaluations(), result.evaluations);
}

#[test]
fn test_failed_evaluations_rank_last_but_run_completes() {
    let catalog = yul_like_catalog();
    let result = run(create_test_evolution_config(), &catalog, picky_metric());

    assert_eq!(result.stop_reason, StopReason::MaxGenerations);
    assert_eq!(result.generations, 8);
    assert!(result.best.cost().is_some());
    assert!(!result.best.chromosome.encode().contains('i'));

    let records = result.final_population.records();
    let first_failed = records.iter().position(|record| record.cost().is_none());
    if let Some(index) = first_failed {
        assert!(records[index..].iter().all(|record| record.cost().is_none()));
    }
}

#[test]
fn test_progress_callback_sees_every_generation() {
    let catalog = yul_like_catalog();
    let cache = Arc::new(FitnessCache::new(length_metric()));
    let mut engine = EvolutionEngine::new(create_test_evolution_config(), &catalog, cache).unwrap();
    let mut progress = RecordingProgress::default();

    let result = engine.run_with_callback(&mut progress);

    assert_eq!(progress.started, (0..8).collect::<Vec<_>>());
    assert_eq!(progress.completed, result.history);
    assert!(progress
        .completed
        .windows(2)
        .all(|pair| pair[1].evaluations >= pair[0].evaluations));
}

#[test]
fn test_resume_from_saved_population() {
    let catalog = yul_like_catalog();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("population.txt");

    let first = run(create_test_evolution_config(), &catalog, picky_metric());
    save_population(&path, first.final_population.chromosomes()).unwrap();

    let seeded = load_population(&path, &catalog).unwrap();
    assert_eq!(seeded.len(), 12);

    let cache = Arc::new(FitnessCache::new(picky_metric()));
    let mut engine = EvolutionEngine::new(
        EvolutionConfig {
            max_generations: Some(1),
            ..create_test_evolution_config()
        },
        &catalog,
        cache,
    )
    .unwrap()
    .with_initial_population(seeded);
    let resumed = engine.run();

    assert_eq!(resumed.best.fitness, first.best.fitness);
}

#[cfg(unix)]
#[test]
fn test_external_command_metric_drives_search() {
    use passphaser::engines::evaluation::CommandMetric;

    let catalog = yul_like_catalog();
    let metric = CommandMetric::new(
        "sh",
        vec![
            "-c".to_string(),
            "printf %s \"$1\" | wc -c".to_string(),
            "sh".to_string(),
            "{chromosome}".to_string(),
        ],
    );
    let config = EvolutionConfig {
        population_size: 6,
        elite_count: 1,
        max_generations: Some(3),
        ..create_test_evolution_config()
    };

    let result = run(config, &catalog, Arc::new(metric));

    assert_eq!(result.best.cost(), Some(Cost(0)));
    assert!(result.best.chromosome.is_empty());
}
