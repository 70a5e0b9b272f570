use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChurnError {
    #[error("Model not trained. Call train() or load() first.")]
    ModelNotTrained,

    #[error("Model not found at {path}")]
    ModelNotFound { path: String },

    #[error("Data access error: {0}")]
    DataAccess(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ChurnResult<T> = Result<T, ChurnError>;
