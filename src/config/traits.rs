use crate::error::PhaserError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), PhaserError>;
}

/// Configuration error prefixed with the section it came from.
pub(crate) fn invalid<S: ConfigSection>(message: impl AsRef<str>) -> PhaserError {
    PhaserError::Configuration(format!("{}: {}", S::section_name(), message.as_ref()))
}
