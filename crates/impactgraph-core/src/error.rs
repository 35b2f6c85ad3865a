use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImpactError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Graph store unavailable: {0}")]
    GraphUnavailable(String),

    #[error("Analysis timed out after {0} ms")]
    AnalysisTimeout(u64),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),
}

pub type Result<T> = std::result::Result<T, ImpactError>;
