use crate::engines::generation::chromosome::Chromosome;
use crate::engines::generation::population::FitnessRecord;
use crate::types::Cost;

use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EliteChromosome {
    pub chromosome: Chromosome,
    pub cost: Cost,
    pub generation: usize, // First generation it was evaluated in
}

/// Best distinct chromosomes seen during a run, lowest cost first.
pub struct HallOfFame {
    entries: Vec<EliteChromosome>,
    max_size: usize,
    seen: HashSet<Chromosome>,
}

impl HallOfFame {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_size,
            seen: HashSet::new(),
        }
    }

    /// Attempt to add an evaluated record. Failed, pending and already
    /// present chromosomes are rejected.
    pub fn try_add(&mut self, record: &FitnessRecord, generation: usize) -> bool {
        let Some(cost) = record.cost() else {
            return false;
        };
        if self.max_size == 0 || self.seen.contains(&record.chromosome) {
            return false;
        }
        if self.entries.len() == self.max_size
            && self.entries.last().map_or(false, |worst| worst.cost <= cost)
        {
            return false;
        }

        self.entries.push(EliteChromosome {
            chromosome: record.chromosome.clone(),
            cost,
            generation,
        });
        self.seen.insert(record.chromosome.clone());

        // Stable: earlier discoveries win ties
        self.entries.sort_by_key(|entry| entry.cost);

        while self.entries.len() > self.max_size {
            if let Some(removed) = self.entries.pop() {
                self.seen.remove(&removed.chromosome);
            }
        }

        true
    }

    pub fn best(&self) -> Option<&EliteChromosome> {
        self.entries.first()
    }

    pub fn get_all(&self) -> &[EliteChromosome] {
        &self.entries
    }

    pub fn get_top_n(&self, n: usize) -> &[EliteChromosome] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.seen.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
