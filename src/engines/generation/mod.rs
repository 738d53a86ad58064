pub mod chromosome;
pub mod evolution_engine;
pub mod hall_of_fame;
pub mod operators;
pub mod population;
pub mod progress;
pub mod selection;

pub use chromosome::Chromosome;
pub use evolution_engine::{
    EnginePhase, EvolutionEngine, EvolutionResult, GenerationSummary, ProgressCallback, StopReason,
};
pub use hall_of_fame::{EliteChromosome, HallOfFame};
pub use operators::{
    crossover_at, CrossoverOperator, MutationKind, MutationOperator, MutationPolicy, MutationScope,
    RandomPointCrossover, TwoPointCrossover, UniformCrossover,
};
pub use population::{FitnessRecord, Population, Reproduction};
pub use progress::{ChannelProgress, LoggingProgress, PopulationAutosave, ProgressMessage};
pub use selection::{RankSelection, SelectionStrategy, TournamentSelection, UniformSelection};
