use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistics about a build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Documents read
    pub documents: usize,

    /// Chunks embedded
    pub chunks: usize,

    /// Characters of cleaned text across all documents
    pub characters: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,

    /// Chunk count per source
    pub sources: BTreeMap<String, usize>,

    /// Documents skipped, with the reason
    pub errors: Vec<String>,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document(&mut self, source: &str, characters: usize, chunks: usize) {
        self.documents += 1;
        self.characters += characters;
        self.chunks += chunks;
        *self.sources.entry(source.to_string()).or_insert(0) += chunks;
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }
}
