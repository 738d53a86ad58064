pub mod abbreviation;
pub mod registry;

pub use abbreviation::AbbreviationTable;
pub use registry::{Catalog, StepDefinition, StepId, TransformHandle};
