use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VectorStoreError>;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding provider error: {0}")]
    Provider(String),

    #[error("Zero-norm vector for {document}#{chunk_id} (entry {position})")]
    DegenerateVector {
        position: usize,
        document: String,
        chunk_id: usize,
    },

    #[error("Zero-norm query vector")]
    DegenerateQuery,

    #[error("Corrupt index at {}: {}", .path.display(), .reason)]
    CorruptIndex { path: PathBuf, reason: String },

    #[error("Index not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Coarse failure classes callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad chunking parameters or mixed dimensionality; abort.
    Configuration,
    /// Network/auth/quota failure of an external provider; caller may retry.
    Provider,
    /// Zero-norm embedding; upstream anomaly.
    DegenerateVector,
    /// Index file exists but cannot be trusted; alert.
    CorruptIndex,
    /// Index file missing; rebuild.
    NotFound,
    /// Rejected request parameters.
    InvalidInput,
    /// Local filesystem failure while writing.
    Io,
}

impl VectorStoreError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptIndex {
            path: path.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Configuration(_) | Self::DimensionMismatch { .. } => ErrorClass::Configuration,
            Self::Provider(_) => ErrorClass::Provider,
            Self::DegenerateVector { .. } | Self::DegenerateQuery => ErrorClass::DegenerateVector,
            Self::CorruptIndex { .. } => ErrorClass::CorruptIndex,
            Self::NotFound(_) => ErrorClass::NotFound,
            Self::InvalidInput(_) => ErrorClass::InvalidInput,
            Self::IoError(_) | Self::SerializationError(_) => ErrorClass::Io,
        }
    }

    /// Whether a later attempt with the same inputs may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.class(), ErrorClass::Provider)
    }
}

impl From<docqa_chunker::ChunkerError> for VectorStoreError {
    fn from(err: docqa_chunker::ChunkerError) -> Self {
        Self::Configuration(err.to_string())
    }
}
