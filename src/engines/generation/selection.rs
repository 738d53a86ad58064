use crate::engines::generation::population::FitnessRecord;
use rand::{Rng, RngCore};

/// Picks one parent from a population ranked best first.
///
/// Implementations return an index into `ranked`, which is never empty.
pub trait SelectionStrategy: Send + Sync {
    fn select(&self, ranked: &[FitnessRecord], rng: &mut dyn RngCore) -> usize;
}

/// Every member equally likely.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSelection;

impl SelectionStrategy for UniformSelection {
    fn select(&self, ranked: &[FitnessRecord], rng: &mut dyn RngCore) -> usize {
        rng.gen_range(0..ranked.len())
    }
}

/// Linear rank weighting: the best of N members has weight N, the worst 1.
///
/// Weights depend on position only, so zero or failed costs need no special
/// handling.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankSelection;

impl SelectionStrategy for RankSelection {
    fn select(&self, ranked: &[FitnessRecord], rng: &mut dyn RngCore) -> usize {
        let len = ranked.len();
        let total_rank = len * (len + 1) / 2;
        let mut target = rng.gen_range(0..total_rank);

        for index in 0..len {
            let weight = len - index;
            if target < weight {
                return index;
            }
            target -= weight;
        }

        len - 1
    }
}

/// Best of `size` members sampled with replacement.
#[derive(Debug, Clone, Copy)]
pub struct TournamentSelection {
    pub size: usize,
}

impl SelectionStrategy for TournamentSelection {
    fn select(&self, ranked: &[FitnessRecord], rng: &mut dyn RngCore) -> usize {
        let mut best_idx = rng.gen_range(0..ranked.len());

        for _ in 1..self.size {
            let idx = rng.gen_range(0..ranked.len());
            let challenger = ranked[idx].rank_key();
            let incumbent = ranked[best_idx].rank_key();
            if challenger < incumbent || (challenger == incumbent && idx < best_idx) {
                best_idx = idx;
            }
        }

        best_idx
    }
}
