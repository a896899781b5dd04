//! # Docqa Vector Store
//!
//! Embedding gateway, unit normalization, the persisted chunk index and exact
//! similarity search.
//!
//! ## Features
//!
//! - **Provider-agnostic embeddings** behind [`EmbeddingProvider`]
//! - **Unit vectors only**: every stored and query vector is normalized once,
//!   so cosine similarity is a plain dot product
//! - **Exact linear scan** with deterministic tie-breaking
//! - **Persistent storage** as one JSON document of three aligned collections
//!
//! ## Architecture
//!
//! ```text
//! Chunk[]
//!     │
//!     ├──> EmbeddingProvider (batched, order-preserving)
//!     │      └─> raw Vec<f32>[dim]
//!     │
//!     ├──> normalize
//!     │      └─> unit vectors (zero norm = error)
//!     │
//!     ├──> VectorIndex { vectors, metas, chunks }
//!     │      └─> index.json (save / load with shape validation)
//!     │
//!     └──> search(query, k)
//!            └─> SearchResult[] (score desc, position asc)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use docqa_chunker::Chunk;
//! use docqa_vector_store::{search_raw, EmbeddingProvider, StubEmbedder, VectorIndex};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let embedder = StubEmbedder::default();
//!     let chunks = vec![Chunk::new("hours.html", 0, "Opening hours: 08:00-16:00")];
//!     let index = VectorIndex::build(chunks, &embedder, 64).await?;
//!     index.save("index/index.json").await?;
//!
//!     let query = embedder.embed_one("when do you open?").await?;
//!     for hit in search_raw(&index, &query, 5)? {
//!         println!("{} #{}: {:.3}", hit.source, hit.chunk_id, hit.score);
//!     }
//!     Ok(())
//! }
//! ```

mod embeddings;
mod error;
mod index;
mod normalize;
mod openai;
mod search;

pub use embeddings::{
    embed_in_batches, EmbeddingMode, EmbeddingProvider, StubEmbedder, EMBEDDING_MODE_ENV,
    STUB_DIMENSION,
};
pub use error::{ErrorClass, Result, VectorStoreError};
pub use index::{IndexEntry, VectorIndex, DEFAULT_EMBED_BATCH};
pub use normalize::{dot, l2_norm, normalize};
pub use openai::{ApiEndpoint, ApiFlavor, OpenAiEmbedder, DEFAULT_AZURE_API_VERSION};
pub use search::{search, search_raw, SearchResult};

// Re-export chunk types for convenience
pub use docqa_chunker::{Chunk, ChunkMeta};
