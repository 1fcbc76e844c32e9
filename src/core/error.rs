use thiserror::Error;

use crate::core::types::ParameterKind;

#[derive(Error, Debug)]
pub enum SurvivalError {
    #[error("Invalid modifier: {0}")]
    InvalidModifier(String),

    #[error("No game clock is installed")]
    ClockUnavailable,

    #[error("A game clock is already installed")]
    ClockAlreadyInstalled,

    #[error("Unknown parameter: {0}")]
    UnknownParameter(ParameterKind),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SurvivalError>;
