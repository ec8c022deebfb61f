use thiserror::Error;

/// Top-level error type for the core types.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid urn '{urn}': {reason}")]
    InvalidUrn { urn: String, reason: String },

    #[error("Property coercion error: {0}")]
    Coercion(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
