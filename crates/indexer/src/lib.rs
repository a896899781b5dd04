//! # Docqa Indexer
//!
//! Offline build of a document collection into a persisted vector index.
//!
//! ## Pipeline
//!
//! ```text
//! Data directory
//!     │
//!     ├──> DocumentScanner (sorted, extension filter)
//!     │      └─> Document files
//!     │
//!     ├──> MarkupCleaner (.html/.htm) + normalize_text
//!     │      └─> Plain text
//!     │
//!     ├──> Chunker (character windows with overlap)
//!     │      └─> Chunks { source, chunk_id, text }
//!     │
//!     └──> VectorIndex::build (batch embed) + atomic save
//!            └─> index.json
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use docqa_indexer::{CorpusIndexer, IndexerConfig};
//! use docqa_vector_store::StubEmbedder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let indexer = CorpusIndexer::new(IndexerConfig::new("data", "index/index.json"))?;
//!     let stats = indexer.index(&StubEmbedder::default()).await?;
//!
//!     println!("Indexed {} documents, {} chunks", stats.documents, stats.chunks);
//!     Ok(())
//! }
//! ```

mod error;
mod indexer;
mod markup;
mod scanner;
mod stats;

pub use error::{IndexerError, Result};
pub use indexer::{CorpusIndexer, IndexerConfig};
pub use markup::MarkupCleaner;
pub use scanner::{is_markup, DocumentScanner, DEFAULT_EXTENSIONS};
pub use stats::IndexStats;
