use thiserror::Error;

use crate::balls::BallType;

/// No legal resting place could be found for a potted colour.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RespotError {
    #[error("no free position for {ball} after {tried} candidates")]
    Exhausted { ball: BallType, tried: usize },
}

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config read error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
