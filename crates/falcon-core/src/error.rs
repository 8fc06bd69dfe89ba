use thiserror::Error;

/// Top-level error type for the FalconCare crates.
///
/// Subsystem crates define their own error enums and wrap this one, so the
/// `?` operator carries configuration and serialization failures upward.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FalconError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl From<toml::de::Error> for FalconError {
    fn from(err: toml::de::Error) -> Self {
        FalconError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for FalconError {
    fn from(err: serde_json::Error) -> Self {
        FalconError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for FalconCare operations.
pub type Result<T> = std::result::Result<T, FalconError>;
