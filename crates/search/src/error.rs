use docqa_vector_store::{ErrorClass, VectorStoreError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] VectorStoreError),

    #[error("Chat provider error: {0}")]
    Provider(String),

    #[error("Index not loaded")]
    IndexNotLoaded,

    #[error("Empty query")]
    EmptyQuery,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl SearchError {
    /// Rejected before any work was done; the caller sent something unusable.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::EmptyQuery | Self::InvalidInput(_) => true,
            Self::VectorStoreError(err) => err.class() == ErrorClass::InvalidInput,
            _ => false,
        }
    }

    /// An external provider (embedding or chat) failed.
    #[must_use]
    pub fn is_provider_error(&self) -> bool {
        match self {
            Self::Provider(_) => true,
            Self::VectorStoreError(err) => err.class() == ErrorClass::Provider,
            _ => false,
        }
    }
}
