use std::result::Result as StdResult;

use godown_config::ConfigError;
use godown_core::CoreError;
use thiserror::Error;

/// Unified error type for the config, storage and report layers.
#[derive(Error, Debug)]
pub enum GodownError {
    #[error("Book not found: {0}")]
    BookNotFound(String),
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = StdResult<T, GodownError>;

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] GodownError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Output failed: {0}")]
    Output(String),
}

impl From<std::io::Error> for GodownError {
    fn from(err: std::io::Error) -> Self {
        GodownError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for GodownError {
    fn from(err: serde_json::Error) -> Self {
        GodownError::StorageError(err.to_string())
    }
}

impl From<CoreError> for GodownError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::BookNotFound(name) => GodownError::BookNotFound(name),
            CoreError::Serde(message) => GodownError::StorageError(message),
            CoreError::Io(err) => GodownError::StorageError(err.to_string()),
            CoreError::Validation(message) => GodownError::InvalidInput(message),
        }
    }
}

impl From<ConfigError> for GodownError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(io) => GodownError::StorageError(io.to_string()),
            ConfigError::Serde(message) | ConfigError::Invalid(message) => {
                GodownError::ConfigError(message)
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::from(GodownError::from(err))
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::from(GodownError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_user_facing_variants() {
        let missing: GodownError = CoreError::BookNotFound("season".into()).into();
        assert!(matches!(missing, GodownError::BookNotFound(name) if name == "season"));

        let invalid: GodownError = CoreError::Validation("stockist is required".into()).into();
        assert_eq!(invalid.to_string(), "Invalid input: stockist is required");

        let config: CliError = ConfigError::Invalid("bad rate".into()).into();
        assert_eq!(config.to_string(), "Configuration error: bad rate");
    }
}
