pub mod command;
pub mod metric;

pub use command::CommandMetric;
pub use metric::{Aggregation, EvaluationError, FitnessMetric, MetricCombination, ProgramMetric};
