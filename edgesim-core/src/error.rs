use thiserror::Error;

use crate::types::Tier;

#[derive(Error, Debug)]
pub enum EdgeSimError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid input for {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("Load query failed for {tier} tier: {message}")]
    LoadQuery { tier: Tier, message: String },

    #[error("Capacity query failed for {tier} tier: {message}")]
    CapacityQuery { tier: Tier, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl EdgeSimError {
    /// Build a configuration error from anything displayable.
    pub fn configuration(message: impl Into<String>) -> Self {
        EdgeSimError::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EdgeSimError>;
pub type EdgeSimResult<T> = std::result::Result<T, EdgeSimError>;
