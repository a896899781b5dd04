use crate::embeddings::{embed_in_batches, EmbeddingProvider};
use crate::error::{Result, VectorStoreError};
use crate::normalize::normalize;
use docqa_chunker::{Chunk, ChunkMeta};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;

/// Default number of texts sent per embedding request.
pub const DEFAULT_EMBED_BATCH: usize = 64;

/// On-disk shape: three aligned collections, position is identity.
#[derive(Debug, Deserialize)]
struct PersistedIndex {
    vectors: Vec<Vec<f32>>,
    metas: Vec<ChunkMeta>,
    chunks: Vec<String>,
}

/// Write-side twin of [`PersistedIndex`] borrowing from the live index.
#[derive(Serialize)]
struct PersistedIndexRef<'a> {
    vectors: &'a [Vec<f32>],
    metas: &'a [ChunkMeta],
    chunks: &'a [String],
}

/// Immutable, exact-scan vector index.
///
/// `vectors[i]`, `metas[i]` and `chunks[i]` always describe the same entry.
/// Vectors are unit length. There is no mutation API; a changed corpus means
/// a new index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorIndex {
    vectors: Vec<Vec<f32>>,
    metas: Vec<ChunkMeta>,
    chunks: Vec<String>,
    dimension: Option<usize>,
}

/// Borrowed view of one stored entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexEntry<'a> {
    pub position: usize,
    pub vector: &'a [f32],
    pub meta: &'a ChunkMeta,
    pub text: &'a str,
}

impl VectorIndex {
    /// An index with zero entries and no dimension yet.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assemble an index from chunks and their raw embeddings (same order).
    ///
    /// Every vector is normalized here, once. Fails on count mismatch, empty
    /// chunk text, mixed dimensionality, or a zero-norm vector; nothing is
    /// partially built.
    pub fn from_parts(chunks: Vec<Chunk>, raw_vectors: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != raw_vectors.len() {
            return Err(VectorStoreError::invalid_input(format!(
                "{} chunks but {} vectors",
                chunks.len(),
                raw_vectors.len()
            )));
        }

        let mut index = Self {
            vectors: Vec::with_capacity(chunks.len()),
            metas: Vec::with_capacity(chunks.len()),
            chunks: Vec::with_capacity(chunks.len()),
            dimension: None,
        };

        for (position, (chunk, raw)) in chunks.into_iter().zip(raw_vectors).enumerate() {
            if chunk.text.is_empty() {
                return Err(VectorStoreError::invalid_input(format!(
                    "empty chunk text for {}#{}",
                    chunk.source, chunk.chunk_id
                )));
            }

            let expected = *index.dimension.get_or_insert(raw.len());
            if raw.len() != expected {
                return Err(VectorStoreError::DimensionMismatch {
                    expected,
                    actual: raw.len(),
                });
            }

            let unit = normalize(&raw).ok_or_else(|| VectorStoreError::DegenerateVector {
                position,
                document: chunk.source.clone(),
                chunk_id: chunk.chunk_id,
            })?;

            index.vectors.push(unit);
            index.metas.push(chunk.meta());
            index.chunks.push(chunk.text);
        }

        Ok(index)
    }

    /// Embed, normalize and assemble `chunks`. Zero chunks give an empty index.
    pub async fn build(
        chunks: Vec<Chunk>,
        provider: &dyn EmbeddingProvider,
        batch_size: usize,
    ) -> Result<Self> {
        if chunks.is_empty() {
            log::info!("Building empty index (no chunks)");
            return Ok(Self::empty());
        }

        log::info!(
            "Embedding {} chunks with {} (batch {})",
            chunks.len(),
            provider.model_id(),
            batch_size
        );
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = embed_in_batches(provider, &texts, batch_size).await?;
        let index = Self::from_parts(chunks, vectors)?;
        log::info!(
            "Built index: {} entries, dimension {}",
            index.len(),
            index.dimension.unwrap_or(0)
        );
        Ok(index)
    }

    /// Write the index atomically (temp file + rename).
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        log::info!("Saving index ({} entries) to {}", self.len(), path.display());
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let persisted = PersistedIndexRef {
            vectors: &self.vectors,
            metas: &self.metas,
            chunks: &self.chunks,
        };
        let bytes = serde_json::to_vec(&persisted)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Load and validate a persisted index.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading index from {}", path.display());
        match tokio::fs::metadata(path).await {
            Ok(metadata) if !metadata.is_file() => {
                return Err(VectorStoreError::corrupt(path, "not a regular file"));
            }
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(VectorStoreError::NotFound(path.to_path_buf()));
            }
            Err(err) => return Err(err.into()),
        }
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(VectorStoreError::NotFound(path.to_path_buf()));
            }
            Err(err) => return Err(err.into()),
        };
        let index = Self::from_json_slice(&bytes, path)?;
        log::info!("Loaded index with {} chunks", index.len());
        Ok(index)
    }

    /// [`load`](Self::load), then require the index dimension to match the
    /// query-side embedder. An empty index matches any dimension.
    pub async fn load_expecting(path: impl AsRef<Path>, dimension: usize) -> Result<Self> {
        let index = Self::load(path).await?;
        match index.dimension {
            Some(actual) if actual != dimension => Err(VectorStoreError::DimensionMismatch {
                expected: dimension,
                actual,
            }),
            _ => Ok(index),
        }
    }

    /// Parse and validate persisted bytes; `path` is only used in errors.
    pub fn from_json_slice(bytes: &[u8], path: &Path) -> Result<Self> {
        let persisted: PersistedIndex = serde_json::from_slice(bytes)
            .map_err(|err| VectorStoreError::corrupt(path, err.to_string()))?;

        let PersistedIndex {
            vectors,
            metas,
            chunks,
        } = persisted;

        if vectors.len() != metas.len() || vectors.len() != chunks.len() {
            return Err(VectorStoreError::corrupt(
                path,
                format!(
                    "misaligned collections: {} vectors, {} metas, {} chunks",
                    vectors.len(),
                    metas.len(),
                    chunks.len()
                ),
            ));
        }

        let dimension = vectors.first().map(Vec::len);
        if dimension == Some(0) {
            return Err(VectorStoreError::corrupt(path, "zero-length vectors"));
        }
        for (position, vector) in vectors.iter().enumerate() {
            if Some(vector.len()) != dimension {
                return Err(VectorStoreError::corrupt(
                    path,
                    format!(
                        "vector {position} has dimension {}, expected {}",
                        vector.len(),
                        dimension.unwrap_or(0)
                    ),
                ));
            }
            if vector.iter().any(|x| !x.is_finite()) {
                return Err(VectorStoreError::corrupt(
                    path,
                    format!("vector {position} has non-finite components"),
                ));
            }
        }

        Ok(Self {
            vectors,
            metas,
            chunks,
            dimension,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Shared vector length, `None` while empty.
    #[must_use]
    pub const fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    #[must_use]
    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    #[must_use]
    pub fn metas(&self) -> &[ChunkMeta] {
        &self.metas
    }

    #[must_use]
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    #[must_use]
    pub fn entry(&self, position: usize) -> Option<IndexEntry<'_>> {
        Some(IndexEntry {
            position,
            vector: self.vectors.get(position)?,
            meta: self.metas.get(position)?,
            text: self.chunks.get(position)?,
        })
    }

    pub fn entries(&self) -> impl Iterator<Item = IndexEntry<'_>> {
        (0..self.len()).filter_map(|position| self.entry(position))
    }

    /// Distinct source ids, in first-seen order.
    #[must_use]
    pub fn sources(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.metas
            .iter()
            .map(|meta| meta.source.as_str())
            .filter(|source| seen.insert(*source))
            .collect()
    }
}
