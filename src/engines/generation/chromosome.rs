//! Chromosome representation for pass-sequence search
//!
//! A chromosome is an ordered sequence of optimisation steps, applied left to
//! right. It is a value type: two chromosomes are equal exactly when their step
//! sequences are equal, which is what lets the fitness cache key on content.
//!
//! Operators never modify a chromosome in place; crossover and mutation build
//! new ones from the parents' steps.
//!
//! # Text encoding
//!
//! Each step is written as its catalog abbreviation, in application order:
//!
//! ```
//! use passphaser::catalog::Catalog;
//! use passphaser::engines::generation::Chromosome;
//!
//! let catalog = Catalog::from_abbreviations(&[("A", 'a'), ("B", 'b'), ("C", 'c')]).unwrap();
//! let chromosome = Chromosome::decode(&catalog, "cab").unwrap();
//! assert_eq!(chromosome.encode(), "cab");
//! ```

use crate::catalog::{Catalog, StepId};
use crate::error::{PhaserError, Result};
use rand::RngCore;
use std::fmt;

#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Chromosome {
    steps: Vec<StepId>,
}

impl Chromosome {
    pub fn new(steps: Vec<StepId>) -> Self {
        Self { steps }
    }

    /// The no-op pipeline.
    pub fn empty() -> Self {
        Self::default()
    }

    /// `length` steps drawn uniformly, with replacement, from the catalog.
    pub fn make_random(catalog: &Catalog, length: usize, rng: &mut dyn RngCore) -> Self {
        (0..length).map(|_| catalog.random_step(rng)).collect()
    }

    /// Looks every name up in the catalog; `None` if any is missing.
    pub fn from_names(catalog: &Catalog, names: &[&str]) -> Option<Self> {
        names
            .iter()
            .map(|name| catalog.step(name).cloned())
            .collect::<Option<Vec<_>>>()
            .map(Self::new)
    }

    pub fn decode(catalog: &Catalog, text: &str) -> Result<Self> {
        text.chars()
            .enumerate()
            .map(|(position, character)| {
                catalog
                    .step_for(character)
                    .cloned()
                    .ok_or(PhaserError::Decode {
                        character,
                        position,
                    })
            })
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }

    pub fn encode(&self) -> String {
        self.steps.iter().map(StepId::abbreviation).collect()
    }

    pub fn steps(&self) -> &[StepId] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn into_steps(self) -> Vec<StepId> {
        self.steps
    }
}

impl FromIterator<StepId> for Chromosome {
    fn from_iter<I: IntoIterator<Item = StepId>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chromosome({:?})", self.encode())
    }
}
