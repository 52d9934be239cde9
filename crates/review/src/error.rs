use sanad_core::error::CoreError;

use crate::weather::WeatherError;

/// Errors that stop a review run before a report exists.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// Invalid site or thresholds.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed review input: {0}")]
    InvalidInput(#[source] serde_json::Error),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Weather lookup failed: {0}")]
    Weather(#[from] WeatherError),

    /// The site has no design temperatures and no lookup is configured.
    #[error("Site climate unavailable: {0}")]
    MissingClimate(String),
}

pub type ReviewResult<T> = Result<T, ReviewError>;
