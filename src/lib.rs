use thiserror::Error;

pub type Result<T> = std::result::Result<T, QaError>;

#[derive(Error, Debug)]
pub enum QaError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Arity mismatch: {chunks} chunks but {vectors} vectors")]
    ArityMismatch { chunks: usize, vectors: usize },

    #[error("Dimension mismatch: expected {expected} dimensions, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Vector {index} contains a non-finite value")]
    NonFiniteVector { index: usize },

    #[error("Query vector contains a non-finite value")]
    NonFiniteQuery,

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Collaborator failure: {0}")]
    CollaboratorFailure(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod answer;
pub mod commands;
pub mod config;
pub mod embeddings;
pub mod extraction;
pub mod session;
pub mod store;
