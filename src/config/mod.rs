pub mod traits;
pub mod evolution;
pub mod manager;

pub use manager::{AppConfig, CatalogConfig, MetricConfig, OutputConfig, StepConfig};
pub use evolution::{CrossoverMethod, EvolutionConfig, SelectionMethod};
pub use traits::ConfigSection;
