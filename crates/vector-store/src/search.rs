use crate::error::{Result, VectorStoreError};
use crate::index::VectorIndex;
use crate::normalize::{dot, normalize};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One ranked hit, produced fresh per query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub score: f32,
    pub text: String,
    pub source: String,
    pub chunk_id: usize,
}

/// Exact top-`k` scan over every entry.
///
/// `query` must already be unit length. Results are ordered by descending
/// score, equal scores by ascending insertion position, and hold at most
/// `min(k, index.len())` entries.
pub fn search(index: &VectorIndex, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
    if k == 0 {
        return Err(VectorStoreError::invalid_input("k must be > 0"));
    }
    let Some(dimension) = index.dimension() else {
        return Ok(Vec::new());
    };
    if query.len() != dimension {
        return Err(VectorStoreError::DimensionMismatch {
            expected: dimension,
            actual: query.len(),
        });
    }

    // `+ 0.0` folds -0.0 into 0.0 so that equal scores compare equal.
    let mut scored: Vec<(usize, f32)> = index
        .vectors()
        .iter()
        .enumerate()
        .map(|(position, vector)| (position, dot(query, vector) + 0.0))
        .collect();

    let k = k.min(scored.len());
    if k < scored.len() {
        scored.select_nth_unstable_by(k - 1, rank_order);
        scored.truncate(k);
    }
    scored.sort_unstable_by(rank_order);

    log::debug!("Scanned {} entries, returning {}", index.len(), k);

    Ok(scored
        .into_iter()
        .filter_map(|(position, score)| {
            let entry = index.entry(position)?;
            Some(SearchResult {
                score,
                text: entry.text.to_string(),
                source: entry.meta.source.clone(),
                chunk_id: entry.meta.chunk_id,
            })
        })
        .collect())
}

/// Normalize a raw query embedding, then [`search`].
pub fn search_raw(index: &VectorIndex, raw_query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
    if k == 0 {
        return Err(VectorStoreError::invalid_input("k must be > 0"));
    }
    let query = normalize(raw_query).ok_or(VectorStoreError::DegenerateQuery)?;
    search(index, &query, k)
}

fn rank_order(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}
