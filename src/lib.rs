use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Failed to load corpus from {path}: {message}")]
    CorpusLoad { path: String, message: String },

    #[error("Failed to load embedding model '{model}': {message}")]
    ModelLoad { model: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Dimension mismatch at row {row}: expected {expected}, found {found}")]
    DimensionMismatch {
        expected: usize,
        found: usize,
        row: usize,
    },

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Knowledge base has not been initialized")]
    NotInitialized,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod assistant;
pub mod commands;
pub mod config;
pub mod corpus;
pub mod embeddings;
pub mod generation;
pub mod index;
pub mod knowledge;
pub mod prompt;

#[cfg(test)]
pub(crate) mod testing;
