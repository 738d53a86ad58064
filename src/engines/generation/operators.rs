use crate::catalog::Catalog;
use crate::engines::generation::chromosome::Chromosome;
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// Recombines two parents into one child.
pub trait CrossoverOperator: Send + Sync {
    fn crossover(
        &self,
        parent1: &Chromosome,
        parent2: &Chromosome,
        rng: &mut dyn RngCore,
    ) -> Chromosome;
}

/// Produces a perturbed copy of a chromosome.
pub trait MutationOperator: Send + Sync {
    fn mutate(&self, chromosome: &Chromosome, catalog: &Catalog, rng: &mut dyn RngCore) -> Chromosome;
}

/// `parent1[..i] ++ parent2[j..]`. Panics if a cut is past the end of its parent.
pub fn crossover_at(parent1: &Chromosome, parent2: &Chromosome, i: usize, j: usize) -> Chromosome {
    parent1.steps()[..i]
        .iter()
        .chain(parent2.steps()[j..].iter())
        .cloned()
        .collect()
}

/// Single-point crossover with an independent cut in each parent.
///
/// The child length can differ from both parents, so the search explores
/// pipeline lengths as well as orderings.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPointCrossover;

impl CrossoverOperator for RandomPointCrossover {
    fn crossover(
        &self,
        parent1: &Chromosome,
        parent2: &Chromosome,
        rng: &mut dyn RngCore,
    ) -> Chromosome {
        let i = rng.gen_range(0..=parent1.len());
        let j = rng.gen_range(0..=parent2.len());
        crossover_at(parent1, parent2, i, j)
    }
}

/// Exchanges the segment between two random offsets. Positions beyond the
/// shorter parent keep the first parent's steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoPointCrossover;

impl CrossoverOperator for TwoPointCrossover {
    fn crossover(
        &self,
        parent1: &Chromosome,
        parent2: &Chromosome,
        rng: &mut dyn RngCore,
    ) -> Chromosome {
        let shared = parent1.len().min(parent2.len());
        let a = rng.gen_range(0..=shared);
        let b = rng.gen_range(0..=shared);
        let (start, end) = if a <= b { (a, b) } else { (b, a) };

        parent1
            .steps()
            .iter()
            .enumerate()
            .map(|(position, step)| {
                if position >= start && position < end {
                    parent2.steps()[position].clone()
                } else {
                    step.clone()
                }
            })
            .collect()
    }
}

/// Takes each shared position from the second parent with `swap_chance`.
/// The tail of the longer parent is kept with the same chance, as a block.
#[derive(Debug, Clone, Copy)]
pub struct UniformCrossover {
    pub swap_chance: f64,
}

impl CrossoverOperator for UniformCrossover {
    fn crossover(
        &self,
        parent1: &Chromosome,
        parent2: &Chromosome,
        rng: &mut dyn RngCore,
    ) -> Chromosome {
        let shared = parent1.len().min(parent2.len());
        let mut steps = Vec::with_capacity(parent1.len().max(parent2.len()));

        for position in 0..shared {
            if rng.gen_bool(self.swap_chance) {
                steps.push(parent2.steps()[position].clone());
            } else {
                steps.push(parent1.steps()[position].clone());
            }
        }

        let tail = if rng.gen_bool(self.swap_chance) {
            &parent2.steps()[shared..]
        } else {
            &parent1.steps()[shared..]
        };
        steps.extend(tail.iter().cloned());

        Chromosome::new(steps)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    Insertion,
    Deletion,
    Substitution,
}

/// Whether the mutation probability applies once per chromosome or to each
/// position independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationScope {
    PerChromosome,
    PerGene,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationPolicy {
    pub probability: f64,
    pub scope: MutationScope,
    pub insertion_weight: f64,
    pub deletion_weight: f64,
    pub substitution_weight: f64,
}

impl Default for MutationPolicy {
    fn default() -> Self {
        Self {
            probability: 0.3,
            scope: MutationScope::PerChromosome,
            insertion_weight: 1.0,
            deletion_weight: 1.0,
            substitution_weight: 1.0,
        }
    }
}

impl MutationPolicy {
    /// Policy that only ever applies `kind`.
    pub fn only(kind: MutationKind, probability: f64, scope: MutationScope) -> Self {
        Self {
            probability,
            scope,
            insertion_weight: if kind == MutationKind::Insertion { 1.0 } else { 0.0 },
            deletion_weight: if kind == MutationKind::Deletion { 1.0 } else { 0.0 },
            substitution_weight: if kind == MutationKind::Substitution { 1.0 } else { 0.0 },
        }
    }

    fn weights(&self) -> [(MutationKind, f64); 3] {
        [
            (MutationKind::Insertion, self.insertion_weight),
            (MutationKind::Deletion, self.deletion_weight),
            (MutationKind::Substitution, self.substitution_weight),
        ]
    }

    fn choose_kind(&self, rng: &mut dyn RngCore) -> MutationKind {
        let weights = self.weights();
        match WeightedIndex::new(weights.iter().map(|(_, weight)| *weight)) {
            Ok(index) => weights[index.sample(rng)].0,
            // Validated configs never get here; substitution keeps the length.
            Err(_) => MutationKind::Substitution,
        }
    }

    fn mutate_once(&self, chromosome: &Chromosome, catalog: &Catalog, rng: &mut dyn RngCore) -> Chromosome {
        let mut steps = chromosome.steps().to_vec();

        match self.choose_kind(rng) {
            MutationKind::Insertion => {
                let position = rng.gen_range(0..=steps.len());
                steps.insert(position, catalog.random_step(rng));
            }
            MutationKind::Deletion => {
                if !steps.is_empty() {
                    let position = rng.gen_range(0..steps.len());
                    steps.remove(position);
                }
            }
            MutationKind::Substitution => {
                if !steps.is_empty() {
                    let position = rng.gen_range(0..steps.len());
                    steps[position] = catalog.random_step(rng);
                }
            }
        }

        Chromosome::new(steps)
    }

    fn mutate_per_gene(&self, chromosome: &Chromosome, catalog: &Catalog, rng: &mut dyn RngCore) -> Chromosome {
        let mut steps = Vec::with_capacity(chromosome.len() + 1);

        for step in chromosome.steps() {
            if !rng.gen_bool(self.probability) {
                steps.push(step.clone());
                continue;
            }
            match self.choose_kind(rng) {
                MutationKind::Insertion => {
                    steps.push(catalog.random_step(rng));
                    steps.push(step.clone());
                }
                MutationKind::Deletion => {}
                MutationKind::Substitution => steps.push(catalog.random_step(rng)),
            }
        }

        // One extra slot past the end, so empty chromosomes can still grow.
        if self.insertion_weight > 0.0 && rng.gen_bool(self.probability) {
            steps.push(catalog.random_step(rng));
        }

        Chromosome::new(steps)
    }
}

impl MutationOperator for MutationPolicy {
    fn mutate(&self, chromosome: &Chromosome, catalog: &Catalog, rng: &mut dyn RngCore) -> Chromosome {
        match self.scope {
            MutationScope::PerChromosome => {
                if rng.gen_bool(self.probability) {
                    self.mutate_once(chromosome, catalog, rng)
                } else {
                    chromosome.clone()
                }
            }
            MutationScope::PerGene => self.mutate_per_gene(chromosome, catalog, rng),
        }
    }
}
