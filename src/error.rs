//! Error types for YatraNav

use thiserror::Error;

/// YatraNav error type
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Converter error: {0}")]
    Converter(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for PlanError {
    fn from(e: toml::de::Error) -> Self {
        PlanError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for PlanError {
    fn from(e: serde_json::Error) -> Self {
        PlanError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
