use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("embedding provider error: {0}")]
    Embedding(String),
    #[error("graph store error: {0}")]
    Store(String),
    #[error("generation error: {0}")]
    Generation(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl RagError {
    pub fn config<E: std::fmt::Display>(err: E) -> Self {
        RagError::Config(err.to_string())
    }

    pub fn embedding<E: std::fmt::Display>(err: E) -> Self {
        RagError::Embedding(err.to_string())
    }

    pub fn store<E: std::fmt::Display>(err: E) -> Self {
        RagError::Store(err.to_string())
    }

    pub fn generation<E: std::fmt::Display>(err: E) -> Self {
        RagError::Generation(err.to_string())
    }
}
