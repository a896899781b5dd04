use crate::error::Result;
use docqa_vector_store::VectorIndex;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

/// Process-wide handle to the serving index.
///
/// Readers take an `Arc` snapshot and search it without holding any lock;
/// a reload builds the new index off to the side and swaps the pointer.
#[derive(Clone, Default)]
pub struct IndexHandle {
    slot: Arc<RwLock<Option<Arc<VectorIndex>>>>,
}

impl IndexHandle {
    #[must_use]
    pub fn new(index: VectorIndex) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(Arc::new(index)))),
        }
    }

    /// A handle with no index yet (the server reports `degraded`).
    #[must_use]
    pub fn unloaded() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Option<Arc<VectorIndex>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.current().is_some()
    }

    /// Install `index`, returning the previous one.
    pub fn replace(&self, index: VectorIndex) -> Option<Arc<VectorIndex>> {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.replace(Arc::new(index))
    }

    /// Load `path` and swap it in. On failure the current index keeps serving.
    pub async fn reload(&self, path: &Path, expected_dimension: Option<usize>) -> Result<usize> {
        let index = match expected_dimension {
            Some(dimension) => VectorIndex::load_expecting(path, dimension).await?,
            None => VectorIndex::load(path).await?,
        };
        let count = index.len();
        self.replace(index);
        log::info!("Swapped in index with {count} chunks from {}", path.display());
        Ok(count)
    }
}
