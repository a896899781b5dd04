use serde::{Deserialize, Serialize};

/// A contiguous window of one document's normalized text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Identifier of the originating document (relative path or file name)
    pub source: String,

    /// Zero-based ordinal within `source`, in document order
    pub chunk_id: usize,

    /// The window text (never empty)
    pub text: String,
}

impl Chunk {
    /// Create a new chunk
    #[must_use]
    pub fn new(source: impl Into<String>, chunk_id: usize, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            chunk_id,
            text: text.into(),
        }
    }

    /// Attribution record persisted next to the vector.
    #[must_use]
    pub fn meta(&self) -> ChunkMeta {
        ChunkMeta {
            source: self.source.clone(),
            chunk_id: self.chunk_id,
        }
    }

    /// Length in characters
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Per-chunk attribution, the `metas` record of the persisted index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ChunkMeta {
    pub source: String,
    pub chunk_id: usize,
}
