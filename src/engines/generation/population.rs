use crate::catalog::Catalog;
use crate::data::FitnessCache;
use crate::engines::generation::chromosome::Chromosome;
use crate::engines::generation::operators::{CrossoverOperator, MutationOperator};
use crate::engines::generation::selection::SelectionStrategy;
use crate::types::{Cost, Fitness};
use rand::{Rng, RngCore};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::collections::HashSet;
use std::ops::RangeInclusive;

/// A chromosome and its fitness, `None` until evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitnessRecord {
    pub chromosome: Chromosome,
    pub fitness: Option<Fitness>,
}

impl FitnessRecord {
    pub fn new(chromosome: Chromosome) -> Self {
        Self {
            chromosome,
            fitness: None,
        }
    }

    pub fn evaluated(chromosome: Chromosome, fitness: Fitness) -> Self {
        Self {
            chromosome,
            fitness: Some(fitness),
        }
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    pub fn cost(&self) -> Option<Cost> {
        self.fitness.and_then(|fitness| fitness.cost())
    }

    /// Ordering key; pending records rank with the failed ones.
    pub fn rank_key(&self) -> Fitness {
        self.fitness.unwrap_or(Fitness::Failed)
    }
}

/// How the next generation is bred from a ranked one.
pub struct Reproduction<'a> {
    pub size: usize,
    pub elite_count: usize,
    pub selection: &'a dyn SelectionStrategy,
    /// `None` disables crossover: children are mutated copies of one parent.
    pub crossover: Option<&'a dyn CrossoverOperator>,
    pub mutation: &'a dyn MutationOperator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Population {
    records: Vec<FitnessRecord>,
}

impl Population {
    pub fn new(records: Vec<FitnessRecord>) -> Self {
        Self { records }
    }

    pub fn from_chromosomes<I: IntoIterator<Item = Chromosome>>(chromosomes: I) -> Self {
        Self::new(chromosomes.into_iter().map(FitnessRecord::new).collect())
    }

    /// `size` random chromosomes with lengths drawn from `lengths`. With
    /// `include_empty` the first member is the empty baseline.
    pub fn random(
        catalog: &Catalog,
        size: usize,
        lengths: RangeInclusive<usize>,
        include_empty: bool,
        rng: &mut dyn RngCore,
    ) -> Self {
        let mut records = Vec::with_capacity(size);
        if include_empty && size > 0 {
            records.push(FitnessRecord::new(Chromosome::empty()));
        }
        while records.len() < size {
            let length = rng.gen_range(lengths.clone());
            records.push(FitnessRecord::new(Chromosome::make_random(catalog, length, rng)));
        }
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FitnessRecord] {
        &self.records
    }

    pub fn chromosomes(&self) -> impl Iterator<Item = &Chromosome> {
        self.records.iter().map(|record| &record.chromosome)
    }

    pub fn pending_count(&self) -> usize {
        self.records.iter().filter(|record| !record.is_evaluated()).count()
    }

    /// Fills in every missing fitness through the cache, in parallel on `pool`.
    /// Results land in the record they belong to, so evaluation order never
    /// affects the population.
    ///
    /// Only the first pending record of each distinct chromosome becomes a
    /// pool job. A metric that runs its own rayon work may let the waiting
    /// worker steal another job, and that job must never be for a cache cell
    /// the same thread is already initialising.
    pub fn evaluate(&mut self, cache: &FitnessCache, pool: &ThreadPool) {
        let mut seen = HashSet::new();
        let first: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| !record.is_evaluated() && seen.insert(&record.chromosome))
            .map(|(index, _)| index)
            .collect();

        let records = &self.records;
        let computed: Vec<Fitness> = pool.install(|| {
            first
                .par_iter()
                .map(|&index| cache.get_or_compute(&records[index].chromosome))
                .collect()
        });
        for (index, fitness) in first.into_iter().zip(computed) {
            self.records[index].fitness = Some(fitness);
        }

        // Repeats are cache hits by now.
        for record in self.records.iter_mut().filter(|record| !record.is_evaluated()) {
            record.fitness = Some(cache.get_or_compute(&record.chromosome));
        }
    }

    /// Stable ascending sort by cost; failed and pending records go last.
    pub fn rank(&mut self) {
        self.records.sort_by_key(FitnessRecord::rank_key);
    }

    /// Lowest-cost evaluated record.
    pub fn best(&self) -> Option<&FitnessRecord> {
        self.records
            .iter()
            .filter(|record| record.is_evaluated())
            .min_by_key(|record| record.rank_key())
    }

    /// Next generation from this one, which must already be ranked: the
    /// first `elite_count` records carry over with their fitness, the rest
    /// are fresh children.
    pub fn breed(
        &self,
        reproduction: &Reproduction<'_>,
        catalog: &Catalog,
        rng: &mut dyn RngCore,
    ) -> Population {
        let mut next = Vec::with_capacity(reproduction.size);
        next.extend(
            self.records
                .iter()
                .take(reproduction.elite_count.min(reproduction.size))
                .cloned(),
        );

        if self.records.is_empty() {
            return Population::new(next);
        }

        while next.len() < reproduction.size {
            let first = &self.records[reproduction.selection.select(&self.records, rng)];
            let child = match reproduction.crossover {
                Some(crossover) => {
                    let second = &self.records[reproduction.selection.select(&self.records, rng)];
                    crossover.crossover(&first.chromosome, &second.chromosome, rng)
                }
                None => first.chromosome.clone(),
            };
            let child = reproduction.mutation.mutate(&child, catalog, rng);
            next.push(FitnessRecord::new(child));
        }

        Population::new(next)
    }

    pub fn into_records(self) -> Vec<FitnessRecord> {
        self.records
    }
}
