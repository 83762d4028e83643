use thiserror::Error;

/// Why a single outbound fetch produced nothing usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Parse failure: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Task error: {0}")]
    Task(String),
}

impl AnalysisError {
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, AnalysisError::InsufficientData(_))
    }
}
