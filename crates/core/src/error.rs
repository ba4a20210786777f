use thiserror::Error;

pub type RecoResult<T> = Result<T, RecoError>;

#[derive(Error, Debug)]
pub enum RecoError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Feedback storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data loading error: {0}")]
    DataLoad(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl RecoError {
    /// Storage failures are recoverable: the caller may retry the write.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RecoError::Storage(_) | RecoError::Io(_))
    }
}
