use super::abbreviation::AbbreviationTable;
use crate::error::{PhaserError, Result};
use rand::{Rng, RngCore};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Opaque per-step handle supplied by the compiler tooling. Never invoked by
/// the search itself; metrics look it up through [`Catalog::transform`].
pub type TransformHandle = Arc<dyn Any + Send + Sync>;

/// Identifier of one optimisation step.
///
/// Only a [`Catalog`] can issue a `StepId`, so every id carries the
/// abbreviation it was registered with.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId {
    name: Arc<str>,
    abbreviation: char,
}

impl StepId {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn abbreviation(&self) -> char {
        self.abbreviation
    }
}

impl fmt::Debug for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Catalog input triple: step name, abbreviation and transform handle.
#[derive(Clone)]
pub struct StepDefinition {
    pub name: String,
    pub abbreviation: char,
    pub transform: TransformHandle,
}

impl StepDefinition {
    pub fn new(name: impl Into<String>, abbreviation: char, transform: TransformHandle) -> Self {
        Self {
            name: name.into(),
            abbreviation,
            transform,
        }
    }

    /// Definition without a transform handle, for catalogs built from
    /// configuration.
    pub fn named(name: impl Into<String>, abbreviation: char) -> Self {
        Self::new(name, abbreviation, Arc::new(()))
    }
}

/// Immutable table of every optimisation step the search may use.
pub struct Catalog {
    steps: Vec<StepId>,
    transforms: HashMap<StepId, TransformHandle>,
    table: AbbreviationTable,
}

impl Catalog {
    pub fn new(definitions: Vec<StepDefinition>) -> Result<Self> {
        if definitions.is_empty() {
            return Err(PhaserError::EmptyCatalog);
        }

        let mut steps = Vec::with_capacity(definitions.len());
        let mut transforms = HashMap::with_capacity(definitions.len());

        for definition in definitions {
            let step = StepId {
                name: Arc::from(definition.name),
                abbreviation: definition.abbreviation,
            };
            if steps.iter().any(|existing: &StepId| existing.name == step.name) {
                return Err(PhaserError::DuplicateStep(step.name.to_string()));
            }
            transforms.insert(step.clone(), definition.transform);
            steps.push(step);
        }

        let table = AbbreviationTable::build(&steps)?;
        log::debug!("Catalog built with {} steps", steps.len());

        Ok(Self {
            steps,
            transforms,
            table,
        })
    }

    /// Catalog of `(name, abbreviation)` pairs with unit transform handles.
    pub fn from_abbreviations(pairs: &[(&str, char)]) -> Result<Self> {
        Self::new(
            pairs
                .iter()
                .map(|(name, abbreviation)| StepDefinition::named(*name, *abbreviation))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps in registration order.
    pub fn steps(&self) -> &[StepId] {
        &self.steps
    }

    pub fn step(&self, name: &str) -> Option<&StepId> {
        self.steps.iter().find(|step| step.name() == name)
    }

    pub fn step_for(&self, abbreviation: char) -> Option<&StepId> {
        self.table.to_step(abbreviation)
    }

    pub fn transform(&self, step: &StepId) -> Option<&TransformHandle> {
        self.transforms.get(step)
    }

    pub fn abbreviations(&self) -> &AbbreviationTable {
        &self.table
    }

    /// Uniformly sampled step.
    pub fn random_step(&self, rng: &mut dyn RngCore) -> StepId {
        self.steps[rng.gen_range(0..self.steps.len())].clone()
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog").field("steps", &self.steps).finish()
    }
}
