use thiserror::Error;

use crate::models::Source;

/// All errors that can occur in litscope-core.
#[derive(Debug, Error)]
pub enum LitscopeError {
    #[error("record {index} from {origin} has an empty title")]
    EmptyTitle { index: usize, origin: Source },

    #[error("unknown source tag: {0}")]
    UnknownSource(String),

    #[error("unknown identifier type: {0}")]
    UnknownIdentifierType(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, LitscopeError>;
