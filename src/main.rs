use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use passphaser::config::AppConfig;
use passphaser::data::{load_population, FitnessCache};
use passphaser::engines::generation::{
    EvolutionEngine, GenerationSummary, LoggingProgress, PopulationAutosave, StopReason,
};
use passphaser::types::Fitness;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Evolves optimiser step sequences against an external cost command.
#[derive(Parser, Debug)]
#[command(name = "passphaser", version, about)]
struct Args {
    /// TOML run configuration
    #[arg(short, long)]
    config: PathBuf,

    /// Overrides `evolution.seed`
    #[arg(long)]
    seed: Option<u64>,

    /// Overrides `evolution.max_generations`
    #[arg(long)]
    generations: Option<usize>,

    /// Overrides `output.initial_population`
    #[arg(long)]
    population_from_file: Option<PathBuf>,
}

#[derive(Serialize)]
struct EliteReport {
    chromosome: String,
    cost: u64,
    generation: usize,
}

#[derive(Serialize)]
struct RunReport {
    finished_at: DateTime<Utc>,
    seed: u64,
    stop_reason: StopReason,
    generations: usize,
    evaluations: u64,
    cache_hits: u64,
    best_chromosome: String,
    best_fitness: Option<Fitness>,
    hall_of_fame: Vec<EliteReport>,
    history: Vec<GenerationSummary>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = AppConfig::load_from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if args.seed.is_some() {
        config.evolution.seed = args.seed;
    }
    if args.generations.is_some() {
        config.evolution.max_generations = args.generations;
    }
    if args.population_from_file.is_some() {
        config.output.initial_population = args.population_from_file;
    }
    config.validate().context("invalid configuration after overrides")?;

    let catalog = config.catalog.build().context("building step catalog")?;
    log::info!("Catalog has {} steps", catalog.len());

    let cache = Arc::new(FitnessCache::new(Arc::new(config.metric.build())));
    let mut engine = EvolutionEngine::new(config.evolution.clone(), &catalog, cache)?;

    if let Some(path) = &config.output.initial_population {
        let chromosomes = load_population(path, &catalog)
            .with_context(|| format!("loading population from {}", path.display()))?;
        log::info!("Loaded {} chromosomes from {}", chromosomes.len(), path.display());
        engine = engine.with_initial_population(chromosomes);
    }

    let result = match &config.output.population_autosave {
        Some(path) => engine.run_with_callback((LoggingProgress::default(), PopulationAutosave::new(path))),
        None => engine.run_with_callback(LoggingProgress::default()),
    };

    let report = RunReport {
        finished_at: Utc::now(),
        seed: result.seed,
        stop_reason: result.stop_reason,
        generations: result.generations,
        evaluations: result.evaluations,
        cache_hits: result.cache_hits,
        best_chromosome: result.best.chromosome.encode(),
        best_fitness: result.best.fitness,
        hall_of_fame: result
            .hall_of_fame
            .iter()
            .map(|elite| EliteReport {
                chromosome: elite.chromosome.encode(),
                cost: elite.cost.0,
                generation: elite.generation,
            })
            .collect(),
        history: result.history,
    };

    let json = serde_json::to_string_pretty(&report)?;
    match &config.output.report {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing report to {}", path.display()))?;
            log::info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
