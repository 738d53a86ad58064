use super::registry::StepId;
use crate::error::{PhaserError, Result};
use std::collections::HashMap;

/// Bijection between steps and their single-character abbreviations.
#[derive(Debug, Clone)]
pub struct AbbreviationTable {
    by_char: HashMap<char, StepId>,
}

impl AbbreviationTable {
    /// Fails on the first abbreviation shared by two steps, or on an
    /// abbreviation that cannot be printed in the text encoding.
    pub fn build(steps: &[StepId]) -> Result<Self> {
        let mut by_char: HashMap<char, StepId> = HashMap::with_capacity(steps.len());

        for step in steps {
            let abbreviation = step.abbreviation();
            if abbreviation.is_control() || abbreviation.is_whitespace() {
                return Err(PhaserError::InvalidAbbreviation {
                    step: step.name().to_string(),
                    abbreviation,
                });
            }
            if let Some(existing) = by_char.get(&abbreviation) {
                return Err(PhaserError::CatalogCollision {
                    abbreviation,
                    first: existing.name().to_string(),
                    second: step.name().to_string(),
                });
            }
            by_char.insert(abbreviation, step.clone());
        }

        Ok(Self { by_char })
    }

    pub fn to_char(&self, step: &StepId) -> char {
        step.abbreviation()
    }

    pub fn to_step(&self, abbreviation: char) -> Option<&StepId> {
        self.by_char.get(&abbreviation)
    }

    pub fn len(&self) -> usize {
        self.by_char.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_char.is_empty()
    }
}
