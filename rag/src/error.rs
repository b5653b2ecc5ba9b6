//! Error types for the retrieval crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in retrieval operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// The embedding provider failed or returned an unusable response.
    #[error("embedding failed: {0}")]
    Embedding(#[source] anyhow::Error),

    /// The answer synthesizer failed.
    #[error("answer synthesis failed: {0}")]
    Synthesis(#[source] anyhow::Error),

    /// Raw upload bytes could not be turned into text.
    #[error("text extraction failed: {0}")]
    Extraction(#[from] quarry_pdf_process::PdfProcessError),

    /// Vector index operation failed.
    #[error("index error: {0}")]
    Index(String),

    /// Persistence operation failed.
    #[error("persistence error at {path}: {source}")]
    Persistence {
        /// Path where the error occurred.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// IO operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Embedding width differs from the dimension fixed by the first insertion.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension the index was created with.
        expected: usize,
        /// Dimension of the offending vector.
        actual: usize,
    },

    /// An insertion was attempted with no chunks.
    #[error("cannot add an empty batch of chunks")]
    EmptyBatch,

    /// Configuration violates an invariant.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A caller-supplied argument is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Persisted artifacts disagree with each other.
    #[error("persisted state is corrupt: {0}")]
    Corrupt(String),

    /// Another process holds the persistence directory.
    #[error("persistence directory {0} is locked by another process")]
    Locked(PathBuf),
}

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
