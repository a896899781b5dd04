use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Chunker error: {0}")]
    ChunkerError(#[from] docqa_chunker::ChunkerError),

    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] docqa_vector_store::VectorStoreError),

    #[error("Invalid markup selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid data directory: {0}")]
    InvalidPath(String),

    #[error("No documents with extensions [{}] under {}", .extensions.join(", "), .root.display())]
    NoDocuments {
        root: PathBuf,
        extensions: Vec<String>,
    },
}
