/// Error types for the Scanflow triggers
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanflowError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scanning backend error: {0}")]
    Scanning(String),

    #[error("Build trigger error: {0}")]
    Build(String),

    #[error("Task definition error: {0}")]
    TaskDefinition(String),

    #[error("Parameter store error: {0}")]
    ParameterStore(String),

    #[error("Lambda runtime error: {0}")]
    Lambda(String),
}
