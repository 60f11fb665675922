use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse simulation config JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to read CSV table: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Malformed row {line} in '{source_name}': {reason}")]
    MalformedRow { source_name: String, line: usize, reason: String },

    #[error("Invalid simulation configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unknown placement policy: '{0}' (expected first-fit, best-fit or worst-fit)")]
    UnknownPlacementPolicy(String),
}

impl Error {
    pub fn malformed_row(source_name: &str, line: usize, reason: impl Into<String>) -> Self {
        Error::MalformedRow { source_name: source_name.to_string(), line, reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
