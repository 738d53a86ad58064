pub mod cache;
pub mod population_file;

pub use cache::FitnessCache;
pub use population_file::{load_population, save_population};
