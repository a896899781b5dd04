use crate::error::{Result, VectorStoreError};
use async_trait::async_trait;
use std::env;

/// Environment variable selecting the embedding backend for a process.
pub const EMBEDDING_MODE_ENV: &str = "DOCQA_EMBEDDING_MODE";

/// Default dimension of the offline stub backend.
pub const STUB_DIMENSION: usize = 64;

/// Narrow contract over an external embedding service.
///
/// `embed_many` must return exactly one vector per input, in input order. A
/// failed call is an error; implementations never substitute placeholder
/// vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Stable identifier of the model/deployment producing the vectors.
    fn model_id(&self) -> &str;

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_many(&[text.to_string()]).await?;
        if vectors.len() != 1 {
            return Err(VectorStoreError::provider(format!(
                "{} returned {} embeddings for 1 input",
                self.model_id(),
                vectors.len()
            )));
        }
        Ok(vectors.remove(0))
    }
}

/// Embed `texts` in sequential batches of at most `batch_size`, preserving order.
pub async fn embed_in_batches(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>> {
    if batch_size == 0 {
        return Err(VectorStoreError::configuration(
            "embedding batch_size must be > 0",
        ));
    }

    let mut vectors = Vec::with_capacity(texts.len());
    for (batch_idx, batch) in texts.chunks(batch_size).enumerate() {
        log::debug!(
            "Embedding batch {} ({} texts) with {}",
            batch_idx,
            batch.len(),
            provider.model_id()
        );
        let embedded = provider.embed_many(batch).await?;
        if embedded.len() != batch.len() {
            return Err(VectorStoreError::provider(format!(
                "{} returned {} embeddings for {} inputs",
                provider.model_id(),
                embedded.len(),
                batch.len()
            )));
        }
        vectors.extend(embedded);
    }
    Ok(vectors)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EmbeddingMode {
    Remote,
    Stub,
}

impl EmbeddingMode {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "remote" | "azure" | "openai" => Ok(Self::Remote),
            "stub" => Ok(Self::Stub),
            other => Err(VectorStoreError::configuration(format!(
                "Unsupported {EMBEDDING_MODE_ENV} '{other}' (expected 'remote' or 'stub')"
            ))),
        }
    }

    /// Reads [`EMBEDDING_MODE_ENV`]; unset means `Remote`.
    pub fn from_env() -> Result<Self> {
        match env::var(EMBEDDING_MODE_ENV) {
            Ok(raw) => Self::parse(&raw),
            Err(_) => Ok(Self::Remote),
        }
    }
}

/// Offline backend: hash-seeded pseudo-random vectors.
///
/// Identical texts always map to identical vectors, so indexes built with it
/// are reproducible without network access.
#[derive(Clone, Debug)]
pub struct StubEmbedder {
    dimension: usize,
    model_id: String,
}

impl StubEmbedder {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            model_id: format!("stub-{dimension}"),
        }
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }
}

impl Default for StubEmbedder {
    fn default() -> Self {
        Self::new(STUB_DIMENSION)
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| stub_embed(text, self.dimension))
            .collect())
    }
}

fn stub_embed(text: &str, dimension: usize) -> Vec<f32> {
    let mut state =
        fnv1a_64(text.as_bytes()) ^ (dimension as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut vec = Vec::with_capacity(dimension);
    for _ in 0..dimension {
        let bits = splitmix64(&mut state);
        let high = (bits >> 32) as u32;
        let mantissa = high >> 9;
        let unit = f32::from_bits(0x3f80_0000 | mantissa) - 1.0;
        vec.push(unit.mul_add(2.0, -1.0));
    }
    vec
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

const fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
