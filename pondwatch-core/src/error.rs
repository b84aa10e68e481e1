use thiserror::Error;

#[derive(Debug, Error)]
pub enum PondwatchError {
    #[error("Invalid value for '{parameter}': {reason}")]
    Validation { parameter: String, reason: String },

    #[error("Model '{0}' is unavailable: {1}")]
    ModelUnavailable(String, String),

    #[error("Model '{model}' expected {expected} values but got {actual}")]
    ModelShape {
        model: String,
        expected: usize,
        actual: usize,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("Failed to parse YAML from '{0}': {1}")]
    YamlParsing(String, #[source] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Failed to process CSV file '{0}': {1}")]
    CsvError(String, #[source] csv::Error),

    #[error("An error occurred during logging: {0}")]
    LoggingError(#[from] anyhow::Error),
}

impl PondwatchError {
    pub fn validation(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        PondwatchError::Validation {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's input rather than the host.
    pub fn is_validation(&self) -> bool {
        matches!(self, PondwatchError::Validation { .. })
    }
}
