use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhaserError {
    #[error("Abbreviation '{abbreviation}' is shared by steps {first} and {second}")]
    CatalogCollision {
        abbreviation: char,
        first: String,
        second: String,
    },

    #[error("Step {0} appears more than once in the catalog")]
    DuplicateStep(String),

    #[error("Step {step} has a non-printable abbreviation {abbreviation:?}")]
    InvalidAbbreviation { step: String, abbreviation: char },

    #[error("Catalog contains no steps")]
    EmptyCatalog,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown abbreviation '{character}' at position {position}")]
    Decode { character: char, position: usize },

    #[error("Line {line}: {source}")]
    PopulationFile {
        line: usize,
        #[source]
        source: Box<PhaserError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, PhaserError>;
