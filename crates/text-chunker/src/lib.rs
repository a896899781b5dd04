//! # Docqa Chunker
//!
//! Character-window chunking of plain document text for embedding and retrieval.
//!
//! ## Philosophy
//!
//! Source documents are mixed-script prose (tables flattened to lines, several
//! languages side by side). The chunker therefore does not try to find sentence
//! or word boundaries; it cuts fixed-size character windows and relies on the
//! overlap to carry context across arbitrary cut points.
//!
//! ## Architecture
//!
//! ```text
//! Plain text (from the markup cleaner)
//!     │
//!     ├──> normalize_text
//!     │      └─> trimmed, non-empty lines joined by '\n'
//!     │
//!     └──> Chunker (target_size, overlap)
//!            ├─> windows of target_size chars
//!            ├─> start advances by target_size - overlap
//!            └─> Chunk[] { text, source, chunk_id }
//! ```
//!
//! ## Example
//!
//! ```rust
//! use docqa_chunker::{Chunker, ChunkerConfig};
//!
//! let chunker = Chunker::new(ChunkerConfig::new(4, 1)).unwrap();
//! let windows = chunker.split("ABCDEFGHIJ");
//! assert_eq!(windows, vec!["ABCD", "DEFG", "GHIJ"]);
//!
//! let chunks = chunker.chunk_document("letters.txt", "ABCDEFGHIJ");
//! assert_eq!(chunks[2].chunk_id, 2);
//! ```

mod chunker;
mod config;
mod error;
mod normalize;
mod types;

pub use chunker::{chunk, reassemble, Chunker};
pub use config::{ChunkerConfig, DEFAULT_OVERLAP, DEFAULT_TARGET_SIZE};
pub use error::{ChunkerError, Result};
pub use normalize::normalize_text;
pub use types::{Chunk, ChunkMeta};
