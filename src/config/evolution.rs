use super::traits::{invalid, ConfigSection};
use crate::engines::generation::operators::{
    CrossoverOperator, MutationPolicy, RandomPointCrossover, TwoPointCrossover, UniformCrossover,
};
use crate::engines::generation::selection::{
    RankSelection, SelectionStrategy, TournamentSelection, UniformSelection,
};
use crate::error::PhaserError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub elite_count: usize,
    pub max_generations: Option<usize>,
    /// Upper bound on fitness metric invocations.
    pub max_evaluations: Option<u64>,
    /// Stop after this many generations without a better best cost.
    pub plateau_generations: Option<usize>,
    /// Stop as soon as the best cost is at or below this value.
    pub target_cost: Option<u64>,
    pub crossover_enabled: bool,
    pub crossover_method: CrossoverMethod,
    pub uniform_swap_chance: f64,
    pub mutation: MutationPolicy,
    pub selection_method: SelectionMethod,
    pub tournament_size: usize,
    pub seed: Option<u64>,
    pub min_chromosome_length: usize,
    pub max_chromosome_length: usize,
    pub include_empty_baseline: bool,
    /// Evaluation threads; rayon's default when unset.
    pub workers: Option<usize>,
    pub hall_of_fame_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMethod {
    Uniform,
    Rank,
    Tournament,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverMethod {
    RandomPoint,
    TwoPoint,
    Uniform,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            elite_count: 2,
            max_generations: Some(100),
            max_evaluations: None,
            plateau_generations: None,
            target_cost: None,
            crossover_enabled: true,
            crossover_method: CrossoverMethod::RandomPoint,
            uniform_swap_chance: 0.5,
            mutation: MutationPolicy::default(),
            selection_method: SelectionMethod::Tournament,
            tournament_size: 3,
            seed: None,
            min_chromosome_length: 8,
            max_chromosome_length: 30,
            include_empty_baseline: true,
            workers: None,
            hall_of_fame_size: 5,
        }
    }
}

impl EvolutionConfig {
    pub fn chromosome_lengths(&self) -> RangeInclusive<usize> {
        self.min_chromosome_length..=self.max_chromosome_length
    }

    pub fn build_selection(&self) -> Box<dyn SelectionStrategy> {
        match self.selection_method {
            SelectionMethod::Uniform => Box::new(UniformSelection),
            SelectionMethod::Rank => Box::new(RankSelection),
            SelectionMethod::Tournament => Box::new(TournamentSelection {
                size: self.tournament_size,
            }),
        }
    }

    /// `None` when crossover is disabled.
    pub fn build_crossover(&self) -> Option<Box<dyn CrossoverOperator>> {
        if !self.crossover_enabled {
            return None;
        }
        Some(match self.crossover_method {
            CrossoverMethod::RandomPoint => Box::new(RandomPointCrossover),
            CrossoverMethod::TwoPoint => Box::new(TwoPointCrossover),
            CrossoverMethod::Uniform => Box::new(UniformCrossover {
                swap_chance: self.uniform_swap_chance,
            }),
        })
    }
}

fn is_probability(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), PhaserError> {
        if self.population_size == 0 {
            return Err(invalid::<Self>("population_size must be at least 1"));
        }
        if self.elite_count > self.population_size {
            return Err(invalid::<Self>(format!(
                "elite_count {} exceeds population_size {}",
                self.elite_count, self.population_size
            )));
        }
        if !is_probability(self.mutation.probability) {
            return Err(invalid::<Self>("mutation probability must be between 0 and 1"));
        }
        if !is_probability(self.uniform_swap_chance) {
            return Err(invalid::<Self>("uniform_swap_chance must be between 0 and 1"));
        }
        let weights = [
            self.mutation.insertion_weight,
            self.mutation.deletion_weight,
            self.mutation.substitution_weight,
        ];
        if weights.iter().any(|weight| !weight.is_finite() || *weight < 0.0) {
            return Err(invalid::<Self>("mutation weights must be finite and non-negative"));
        }
        if weights.iter().all(|weight| *weight == 0.0) {
            return Err(invalid::<Self>("at least one mutation weight must be positive"));
        }
        if self.selection_method == SelectionMethod::Tournament && self.tournament_size == 0 {
            return Err(invalid::<Self>("tournament_size must be at least 1"));
        }
        if self.min_chromosome_length > self.max_chromosome_length {
            return Err(invalid::<Self>(format!(
                "min_chromosome_length {} exceeds max_chromosome_length {}",
                self.min_chromosome_length, self.max_chromosome_length
            )));
        }
        if self.workers == Some(0) {
            return Err(invalid::<Self>("workers must be at least 1"));
        }
        if self.max_generations == Some(0) {
            return Err(invalid::<Self>("max_generations must be at least 1"));
        }
        if self.max_evaluations == Some(0) {
            return Err(invalid::<Self>("max_evaluations must be at least 1"));
        }
        if self.plateau_generations == Some(0) {
            return Err(invalid::<Self>("plateau_generations must be at least 1"));
        }
        if self.max_generations.is_none()
            && self.max_evaluations.is_none()
            && self.plateau_generations.is_none()
        {
            return Err(invalid::<Self>(
                "one of max_generations, max_evaluations or plateau_generations must be set",
            ));
        }
        Ok(())
    }
}
