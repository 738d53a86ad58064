use crate::catalog::Catalog;
use crate::config::{ConfigSection, EvolutionConfig};
use crate::data::FitnessCache;
use crate::engines::generation::{
    chromosome::Chromosome,
    hall_of_fame::{EliteChromosome, HallOfFame},
    operators::{CrossoverOperator, MutationOperator},
    population::{FitnessRecord, Population, Reproduction},
    selection::SelectionStrategy,
};
use crate::error::{PhaserError, Result};
use crate::types::Fitness;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnginePhase {
    Initializing,
    Evaluating,
    Ranking,
    Reproducing,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    MaxGenerations,
    MaxEvaluations,
    Plateau,
    TargetReached,
    Cancelled,
}

/// Statistics of one evaluated and ranked generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationSummary {
    pub generation: usize,
    pub best: Option<Fitness>,
    pub best_chromosome: String,
    pub best_so_far: Option<Fitness>,
    /// Mean over members that did not fail.
    pub mean_cost: Option<f64>,
    pub failed: usize,
    /// Metric invocations since the run started.
    pub evaluations: u64,
    pub stagnation: usize,
}

pub struct EvolutionResult {
    pub best: FitnessRecord,
    pub hall_of_fame: Vec<EliteChromosome>,
    /// Generations evaluated, including the initial one.
    pub generations: usize,
    pub evaluations: u64,
    pub cache_hits: u64,
    pub stop_reason: StopReason,
    pub seed: u64,
    pub history: Vec<GenerationSummary>,
    pub final_population: Population,
}

pub trait ProgressCallback: Send {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, summary: &GenerationSummary, population: &Population);
}

/// Generational genetic algorithm over pass sequences.
///
/// Everything random happens on the calling thread from one seeded `StdRng`;
/// only fitness evaluation is handed to the worker pool, and its results are
/// written back by position. A fixed seed therefore reproduces a run
/// regardless of the number of workers.
pub struct EvolutionEngine<'a> {
    config: EvolutionConfig,
    catalog: &'a Catalog,
    cache: Arc<FitnessCache>,
    selection: Box<dyn SelectionStrategy>,
    crossover: Option<Box<dyn CrossoverOperator>>,
    mutation: Box<dyn MutationOperator>,
    hall_of_fame: HallOfFame,
    pool: ThreadPool,
    seed: u64,
    rng: StdRng,
    initial_population: Option<Vec<Chromosome>>,
    generation: usize,
    best: Option<FitnessRecord>,
    stagnation_count: usize,
    evaluations_at_start: u64,
    hits_at_start: u64,
    phase: EnginePhase,
    cancelled: Arc<AtomicBool>,
}

impl<'a> EvolutionEngine<'a> {
    pub fn new(config: EvolutionConfig, catalog: &'a Catalog, cache: Arc<FitnessCache>) -> Result<Self> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        if config.seed.is_none() {
            log::info!("No seed configured, using {}", seed);
        }

        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("phaser-eval-{}", i));
        if let Some(workers) = config.workers {
            builder = builder.num_threads(workers);
        }
        let pool = builder
            .build()
            .map_err(|e| PhaserError::Configuration(format!("cannot start worker pool: {}", e)))?;

        let selection = config.build_selection();
        let crossover = config.build_crossover();
        let mutation = Box::new(config.mutation.clone());
        let hall_of_fame = HallOfFame::new(config.hall_of_fame_size);

        Ok(Self {
            config,
            catalog,
            cache,
            selection,
            crossover,
            mutation,
            hall_of_fame,
            pool,
            seed,
            rng: StdRng::seed_from_u64(seed),
            initial_population: None,
            generation: 0,
            best: None,
            stagnation_count: 0,
            evaluations_at_start: 0,
            hits_at_start: 0,
            phase: EnginePhase::Initializing,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn with_selection(mut self, selection: Box<dyn SelectionStrategy>) -> Self {
        self.selection = selection;
        self
    }

    /// `None` turns reproduction into mutated copies of single parents.
    pub fn with_crossover(mut self, crossover: Option<Box<dyn CrossoverOperator>>) -> Self {
        self.crossover = crossover;
        self
    }

    pub fn with_mutation(mut self, mutation: Box<dyn MutationOperator>) -> Self {
        self.mutation = mutation;
        self
    }

    /// Start from these chromosomes instead of random ones. Extra members are
    /// dropped; missing ones are filled randomly.
    pub fn with_initial_population(mut self, chromosomes: Vec<Chromosome>) -> Self {
        self.initial_population = Some(chromosomes);
        self
    }

    /// Setting the flag stops the run after the generation being evaluated.
    /// The run that stops on it clears the flag, so the next `run` starts
    /// uncancelled.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn cache(&self) -> &FitnessCache {
        &self.cache
    }

    pub fn get_hall_of_fame(&self) -> &HallOfFame {
        &self.hall_of_fame
    }

    pub fn run(&mut self) -> EvolutionResult {
        self.run_with_callback(())
    }

    /// Run the evolution process
    pub fn run_with_callback<C: ProgressCallback>(&mut self, mut callback: C) -> EvolutionResult {
        self.reset();
        let mut population = self.initialize_population();
        let mut history = Vec::new();

        let stop_reason = loop {
            callback.on_generation_start(self.generation);

            self.phase = EnginePhase::Evaluating;
            population.evaluate(&self.cache, &self.pool);

            self.phase = EnginePhase::Ranking;
            population.rank();
            let summary = self.record_generation(&population);
            callback.on_generation_complete(&summary, &population);
            history.push(summary);

            if let Some(reason) = self.should_stop() {
                break reason;
            }

            self.phase = EnginePhase::Reproducing;
            population = self.create_next_generation(&population);
            self.generation += 1;
        };

        self.phase = EnginePhase::Terminated;
        let best = self
            .best
            .clone()
            .unwrap_or_else(|| FitnessRecord::evaluated(Chromosome::empty(), Fitness::Failed));
        log::info!(
            "Stopped after {} generations ({:?}); best {:?} with cost {}",
            self.generation + 1,
            stop_reason,
            best.chromosome.encode(),
            best.rank_key()
        );

        EvolutionResult {
            best,
            hall_of_fame: self.hall_of_fame.get_all().to_vec(),
            generations: self.generation + 1,
            evaluations: self.evaluations(),
            cache_hits: self.cache.hits() - self.hits_at_start,
            stop_reason,
            seed: self.seed,
            history,
            final_population: population,
        }
    }

    fn reset(&mut self) {
        self.phase = EnginePhase::Initializing;
        self.rng = StdRng::seed_from_u64(self.seed);
        self.generation = 0;
        self.best = None;
        self.stagnation_count = 0;
        self.hall_of_fame.clear();
        self.evaluations_at_start = self.cache.evaluations();
        self.hits_at_start = self.cache.hits();
    }

    fn evaluations(&self) -> u64 {
        self.cache.evaluations() - self.evaluations_at_start
    }

    fn initialize_population(&mut self) -> Population {
        let size = self.config.population_size;

        let Some(seeded) = self.initial_population.clone() else {
            return Population::random(
                self.catalog,
                size,
                self.config.chromosome_lengths(),
                self.config.include_empty_baseline,
                &mut self.rng,
            );
        };

        let mut records: Vec<FitnessRecord> = seeded
            .into_iter()
            .take(size)
            .map(FitnessRecord::new)
            .collect();
        let missing = size - records.len();
        if missing > 0 {
            log::info!("Seed population has {} members, adding {} random ones", records.len(), missing);
            let filler = Population::random(
                self.catalog,
                missing,
                self.config.chromosome_lengths(),
                false,
                &mut self.rng,
            );
            records.extend(filler.into_records());
        }
        Population::new(records)
    }

    fn record_generation(&mut self, population: &Population) -> GenerationSummary {
        let generation_best = population.best().cloned();

        match (&generation_best, &self.best) {
            (Some(candidate), Some(current)) if candidate.rank_key() < current.rank_key() => {
                self.best = generation_best.clone();
                self.stagnation_count = 0;
            }
            (Some(_), None) => {
                self.best = generation_best.clone();
                self.stagnation_count = 0;
            }
            _ => self.stagnation_count += 1,
        }

        for record in population.records() {
            self.hall_of_fame.try_add(record, self.generation);
        }

        let costs: Vec<u64> = population
            .records()
            .iter()
            .filter_map(|record| record.cost().map(|cost| cost.0))
            .collect();
        let mean_cost = if costs.is_empty() {
            None
        } else {
            Some(costs.iter().map(|cost| *cost as f64).sum::<f64>() / costs.len() as f64)
        };

        let summary = GenerationSummary {
            generation: self.generation,
            best: generation_best.as_ref().and_then(|record| record.fitness),
            best_chromosome: generation_best
                .as_ref()
                .map(|record| record.chromosome.encode())
                .unwrap_or_default(),
            best_so_far: self.best.as_ref().and_then(|record| record.fitness),
            mean_cost,
            failed: population.len() - costs.len(),
            evaluations: self.evaluations(),
            stagnation: self.stagnation_count,
        };

        log::info!(
            "Generation {}: best {} ({:?}), best so far {}, mean {}, failed {}, evaluations {}",
            summary.generation,
            summary.best.map_or_else(|| "-".to_string(), |fitness| fitness.to_string()),
            summary.best_chromosome,
            summary.best_so_far.map_or_else(|| "-".to_string(), |fitness| fitness.to_string()),
            summary.mean_cost.map_or_else(|| "-".to_string(), |mean| format!("{:.2}", mean)),
            summary.failed,
            summary.evaluations
        );

        summary
    }

    fn should_stop(&self) -> Option<StopReason> {
        if self.cancelled.swap(false, Ordering::Relaxed) {
            return Some(StopReason::Cancelled);
        }

        if let Some(target) = self.config.target_cost {
            let reached = self
                .best
                .as_ref()
                .and_then(FitnessRecord::cost)
                .map_or(false, |cost| cost.0 <= target);
            if reached {
                return Some(StopReason::TargetReached);
            }
        }

        if let Some(limit) = self.config.max_generations {
            if self.generation + 1 >= limit {
                return Some(StopReason::MaxGenerations);
            }
        }

        if let Some(limit) = self.config.max_evaluations {
            if self.evaluations() >= limit {
                return Some(StopReason::MaxEvaluations);
            }
        }

        if let Some(limit) = self.config.plateau_generations {
            if self.stagnation_count >= limit {
                return Some(StopReason::Plateau);
            }
        }

        None
    }

    fn create_next_generation(&mut self, ranked: &Population) -> Population {
        let reproduction = Reproduction {
            size: self.config.population_size,
            elite_count: self.config.elite_count,
            selection: self.selection.as_ref(),
            crossover: self.crossover.as_deref(),
            mutation: self.mutation.as_ref(),
        };
        ranked.breed(&reproduction, self.catalog, &mut self.rng)
    }
}
