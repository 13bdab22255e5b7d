//! Error types for FlexSpline

use thiserror::Error;

/// The main error type for FlexSpline operations
#[derive(Debug, Error)]
pub enum FlexError {
    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Duplicate layer name: {0}")]
    DuplicateLayerName(String),

    #[error("Invalid layer name: {0:?}")]
    InvalidLayerName(String),

    #[error("Index out of range: {index} (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },
}

/// Result type alias for FlexSpline operations
pub type Result<T> = std::result::Result<T, FlexError>;

impl From<toml::de::Error> for FlexError {
    fn from(err: toml::de::Error) -> Self {
        FlexError::TomlParseError(err.to_string())
    }
}
