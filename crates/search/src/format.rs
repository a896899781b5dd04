use docqa_vector_store::SearchResult;

/// Render results as numbered, source-attributed context blocks.
///
/// Entry `n` (1-based, in the given order) looks like
/// `[n] (source • score=0.873)` followed by the chunk text; entries are
/// separated by a blank line so the answer generator can cite `[n]`.
#[must_use]
pub fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(idx, result)| {
            format!(
                "[{}] ({} • score={:.3})\n{}",
                idx + 1,
                result.source,
                result.score,
                result.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hit(score: f32, source: &str, chunk_id: usize, text: &str) -> SearchResult {
        SearchResult {
            score,
            text: text.to_string(),
            source: source.to_string(),
            chunk_id,
        }
    }

    #[test]
    fn empty_results_render_nothing() {
        assert_eq!(format_context(&[]), "");
    }

    #[test]
    fn numbers_entries_in_given_order() {
        let results = vec![
            hit(0.41, "b.html", 3, "Second by score"),
            hit(0.87321, "a.html", 0, "First by score"),
        ];
        assert_eq!(
            format_context(&results),
            "[1] (b.html • score=0.410)\nSecond by score\n\n[2] (a.html • score=0.873)\nFirst by score"
        );
    }

    #[test]
    fn multiline_chunks_stay_intact() {
        let results = vec![hit(1.0, "table.html", 0, "Tier | Discount\nGold | 50%")];
        let out = format_context(&results);
        assert!(out.ends_with("Tier | Discount\nGold | 50%"));
        assert_eq!(out.matches("[1]").count(), 1);
    }
}
