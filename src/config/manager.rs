use super::{
    evolution::EvolutionConfig,
    traits::{invalid, ConfigSection},
};
use crate::catalog::{Catalog, StepDefinition};
use crate::engines::evaluation::CommandMetric;
use crate::error::PhaserError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub evolution: EvolutionConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub metric: MetricConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), PhaserError> {
        self.evolution.validate()?;
        self.catalog.validate()?;
        self.metric.validate()?;
        self.output.validate()?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, PhaserError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PhaserError> {
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepConfig {
    pub name: String,
    pub abbreviation: char,
}

/// Steps available to the search. Defaults to the Yul optimiser suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub steps: Vec<StepConfig>,
}

const YUL_OPTIMISER_STEPS: &[(&str, char)] = &[
    ("BlockFlattener", 'f'),
    ("CircularReferencesPruner", 'l'),
    ("CommonSubexpressionEliminator", 'c'),
    ("ConditionalSimplifier", 'C'),
    ("ConditionalUnsimplifier", 'U'),
    ("ControlFlowSimplifier", 'n'),
    ("DeadCodeEliminator", 'D'),
    ("EqualStoreEliminator", 'E'),
    ("EquivalentFunctionCombiner", 'v'),
    ("ExpressionInliner", 'e'),
    ("ExpressionJoiner", 'j'),
    ("ExpressionSimplifier", 's'),
    ("ExpressionSplitter", 'x'),
    ("ForLoopConditionIntoBody", 'I'),
    ("ForLoopConditionOutOfBody", 'O'),
    ("ForLoopInitRewriter", 'o'),
    ("FullInliner", 'i'),
    ("FunctionGrouper", 'g'),
    ("FunctionHoister", 'h'),
    ("FunctionSpecializer", 'F'),
    ("LiteralRematerialiser", 'T'),
    ("LoadResolver", 'L'),
    ("LoopInvariantCodeMotion", 'M'),
    ("ReasoningBasedSimplifier", 'R'),
    ("UnusedAssignEliminator", 'r'),
    ("Rematerialiser", 'm'),
    ("SSAReverser", 'V'),
    ("SSATransform", 'a'),
    ("StructuralSimplifier", 't'),
    ("UnusedFunctionParameterPruner", 'p'),
    ("UnusedPruner", 'u'),
    ("UnusedStoreEliminator", 'S'),
    ("VarDeclInitializer", 'd'),
];

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            steps: YUL_OPTIMISER_STEPS
                .iter()
                .map(|(name, abbreviation)| StepConfig {
                    name: name.to_string(),
                    abbreviation: *abbreviation,
                })
                .collect(),
        }
    }
}

impl CatalogConfig {
    pub fn build(&self) -> Result<Catalog, PhaserError> {
        Catalog::new(
            self.steps
                .iter()
                .map(|step| StepDefinition::named(step.name.clone(), step.abbreviation))
                .collect(),
        )
    }
}

impl ConfigSection for CatalogConfig {
    fn section_name() -> &'static str {
        "catalog"
    }

    fn validate(&self) -> Result<(), PhaserError> {
        self.build().map(|_| ())
    }
}

/// External command that measures one chromosome; see [`CommandMetric`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl MetricConfig {
    pub fn build(&self) -> CommandMetric {
        CommandMetric::new(self.command.clone(), self.args.clone())
    }
}

impl ConfigSection for MetricConfig {
    fn section_name() -> &'static str {
        "metric"
    }

    fn validate(&self) -> Result<(), PhaserError> {
        if self.command.trim().is_empty() {
            return Err(invalid::<Self>("command must be set"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Seed population, one encoded chromosome per line.
    pub initial_population: Option<PathBuf>,
    /// Rewritten with the current population after every generation.
    pub population_autosave: Option<PathBuf>,
    /// JSON run report; stdout when unset.
    pub report: Option<PathBuf>,
}

impl ConfigSection for OutputConfig {
    fn section_name() -> &'static str {
        "output"
    }

    fn validate(&self) -> Result<(), PhaserError> {
        if self.population_autosave.is_some() && self.population_autosave == self.report {
            return Err(invalid::<Self>("population_autosave and report must be different files"));
        }
        Ok(())
    }
}
