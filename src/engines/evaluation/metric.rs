use crate::engines::generation::Chromosome;
use crate::types::Cost;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a single chromosome could not be measured. Contained by the fitness
/// cache; never stops a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("metric failed: {0}")]
    Failed(String),

    #[error("pipeline rejected: {0}")]
    Rejected(String),

    #[error("metric crashed: {0}")]
    Crashed(String),
}

/// Maps a chromosome to a cost, lower is better.
///
/// Implementations must be safe to call from several worker threads at once;
/// the cache guarantees they are never called twice for equal chromosomes.
/// They run on the evaluation pool and may use rayon themselves.
pub trait FitnessMetric: Send + Sync {
    fn evaluate(&self, chromosome: &Chromosome) -> Result<Cost, EvaluationError>;
}

impl<F> FitnessMetric for F
where
    F: Fn(&Chromosome) -> Result<Cost, EvaluationError> + Send + Sync,
{
    fn evaluate(&self, chromosome: &Chromosome) -> Result<Cost, EvaluationError> {
        self(chromosome)
    }
}

/// Binds one program to a `(chromosome, program)` measuring function.
pub struct ProgramMetric<P, F> {
    program: P,
    measure: F,
}

impl<P, F> ProgramMetric<P, F>
where
    P: Send + Sync,
    F: Fn(&Chromosome, &P) -> Result<Cost, EvaluationError> + Send + Sync,
{
    pub fn new(program: P, measure: F) -> Self {
        Self { program, measure }
    }

    pub fn program(&self) -> &P {
        &self.program
    }
}

impl<P, F> FitnessMetric for ProgramMetric<P, F>
where
    P: Send + Sync,
    F: Fn(&Chromosome, &P) -> Result<Cost, EvaluationError> + Send + Sync,
{
    fn evaluate(&self, chromosome: &Chromosome) -> Result<Cost, EvaluationError> {
        (self.measure)(chromosome, &self.program)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregation {
    Sum,
    Average,
    Minimum,
    Maximum,
}

/// Aggregates several metrics, e.g. one per program of a corpus. The
/// combination fails as soon as any member does.
pub struct MetricCombination {
    metrics: Vec<Box<dyn FitnessMetric>>,
    aggregation: Aggregation,
}

impl MetricCombination {
    pub fn new(metrics: Vec<Box<dyn FitnessMetric>>, aggregation: Aggregation) -> Self {
        Self {
            metrics,
            aggregation,
        }
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl FitnessMetric for MetricCombination {
    fn evaluate(&self, chromosome: &Chromosome) -> Result<Cost, EvaluationError> {
        if self.metrics.is_empty() {
            return Err(EvaluationError::Failed("combination has no metrics".to_string()));
        }

        let costs = self
            .metrics
            .iter()
            .map(|metric| metric.evaluate(chromosome).map(|cost| cost.0))
            .collect::<Result<Vec<u64>, _>>()?;

        let value = match self.aggregation {
            Aggregation::Sum => costs.iter().fold(0u64, |acc, cost| acc.saturating_add(*cost)),
            Aggregation::Average => {
                let total: u128 = costs.iter().map(|cost| *cost as u128).sum();
                (total / costs.len() as u128) as u64
            }
            Aggregation::Minimum => costs.iter().copied().min().unwrap_or(0),
            Aggregation::Maximum => costs.iter().copied().max().unwrap_or(0),
        };

        Ok(Cost(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn constant(value: u64) -> Box<dyn FitnessMetric> {
        Box::new(move |_: &Chromosome| -> Result<Cost, EvaluationError> { Ok(Cost(value)) })
    }

    fn failing() -> Box<dyn FitnessMetric> {
        Box::new(|_: &Chromosome| -> Result<Cost, EvaluationError> {
            Err(EvaluationError::Failed("no output".to_string()))
        })
    }

    #[test]
    fn test_program_metric_passes_program() {
        let catalog = Catalog::from_abbreviations(&[("A", 'a')]).unwrap();
        // "Program" is a base size; each step adds two.
        let metric = ProgramMetric::new(10u64, |chromosome: &Chromosome, base: &u64| {
            Ok(Cost(base + 2 * chromosome.len() as u64))
        });
        let chromosome = Chromosome::decode(&catalog, "aaa").unwrap();
        assert_eq!(metric.evaluate(&chromosome), Ok(Cost(16)));
        assert_eq!(*metric.program(), 10);
    }

    #[test]
    fn test_aggregations() {
        let chromosome = Chromosome::empty();
        let cases = [
            (Aggregation::Sum, 12),
            (Aggregation::Average, 4),
            (Aggregation::Minimum, 1),
            (Aggregation::Maximum, 8),
        ];
        for (aggregation, expected) in cases {
            let combination =
                MetricCombination::new(vec![constant(1), constant(8), constant(3)], aggregation);
            assert_eq!(combination.evaluate(&chromosome), Ok(Cost(expected)));
        }
    }

    #[test]
    fn test_combination_fails_with_any_member() {
        let combination = MetricCombination::new(vec![constant(1), failing()], Aggregation::Minimum);
        assert!(combination.evaluate(&Chromosome::empty()).is_err());
    }

    #[test]
    fn test_empty_combination_fails() {
        let combination = MetricCombination::new(Vec::new(), Aggregation::Sum);
        assert!(combination.is_empty());
        assert!(combination.evaluate(&Chromosome::empty()).is_err());
    }
}
