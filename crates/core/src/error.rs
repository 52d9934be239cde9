#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Missing or invalid field: {field}")]
    MissingField { field: &'static str },

    #[error("Inconsistent signals: {0}")]
    InconsistentSignals(String),
}
