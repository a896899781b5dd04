use async_trait::async_trait;
use docqa_vector_store::{
    search, search_raw, Chunk, EmbeddingProvider, ErrorClass, Result, StubEmbedder, VectorIndex,
    VectorStoreError,
};
use std::collections::HashMap;
use tempfile::TempDir;

/// Provider with hand-picked vectors per text.
struct FixedProvider {
    vectors: HashMap<String, Vec<f32>>,
}

impl FixedProvider {
    fn new(pairs: &[(&str, &[f32])]) -> Self {
        Self {
            vectors: pairs
                .iter()
                .map(|(text, vector)| ((*text).to_string(), vector.to_vec()))
                .collect(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for FixedProvider {
    fn model_id(&self) -> &str {
        "fixed"
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts
            .iter()
            .map(|text| {
                self.vectors
                    .get(text)
                    .cloned()
                    .ok_or_else(|| VectorStoreError::provider(format!("no vector for {text}")))
            })
            .collect()
    }
}

struct FailingProvider;

#[async_trait]
impl EmbeddingProvider for FailingProvider {
    fn model_id(&self) -> &str {
        "failing"
    }

    async fn embed_many(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(VectorStoreError::provider("401 unauthorized"))
    }
}

#[tokio::test]
async fn rebuilt_index_serves_the_same_ranking_after_reload() {
    let provider = FixedProvider::new(&[
        ("dental coverage gold", &[0.9, 0.1, 0.0]),
        ("dental coverage silver", &[0.7, 0.3, 0.0]),
        ("optometry", &[0.0, 0.2, 0.8]),
        ("dental question", &[2.0, 0.0, 0.0]),
    ]);
    let chunks = vec![
        Chunk::new("dental.html", 0, "dental coverage gold"),
        Chunk::new("dental.html", 1, "dental coverage silver"),
        Chunk::new("optometry.html", 0, "optometry"),
    ];

    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("index").join("phase2_index.json");

    let built = VectorIndex::build(chunks.clone(), &provider, 2).await.unwrap();
    built.save(&path).await.unwrap();

    // A second build over the same input overwrites with identical content.
    let rebuilt = VectorIndex::build(chunks, &provider, 1).await.unwrap();
    rebuilt.save(&path).await.unwrap();
    let loaded = VectorIndex::load(&path).await.unwrap();
    assert_eq!(loaded.metas(), built.metas());
    assert_eq!(loaded.chunks(), built.chunks());

    let query = provider.embed_one("dental question").await.unwrap();
    let before = search_raw(&built, &query, 2).unwrap();
    let after = search_raw(&loaded, &query, 2).unwrap();

    assert_eq!(before.len(), 2);
    assert_eq!(
        after.iter().map(|r| (r.source.as_str(), r.chunk_id)).collect::<Vec<_>>(),
        vec![("dental.html", 0), ("dental.html", 1)]
    );
    for (a, b) in before.iter().zip(&after) {
        assert!((a.score - b.score).abs() < 1e-6);
    }
}

#[tokio::test]
async fn empty_corpus_is_servable() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("index.json");
    let index = VectorIndex::build(Vec::new(), &StubEmbedder::default(), 16)
        .await
        .unwrap();
    index.save(&path).await.unwrap();

    let loaded = VectorIndex::load(&path).await.unwrap();
    assert_eq!(loaded.len(), 0);
    for k in [1, 5, 50] {
        assert!(search(&loaded, &[1.0, 0.0], k).unwrap().is_empty());
    }
}

#[tokio::test]
async fn provider_failures_abort_the_build() {
    let err = VectorIndex::build(vec![Chunk::new("a", 0, "text")], &FailingProvider, 8)
        .await
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Provider);
}

#[tokio::test]
async fn corrupt_and_missing_files_are_distinguished() {
    let tmp = TempDir::new().unwrap();
    let missing = VectorIndex::load(tmp.path().join("nope.json"))
        .await
        .unwrap_err();
    assert_eq!(missing.class(), ErrorClass::NotFound);

    let truncated = tmp.path().join("truncated.json");
    tokio::fs::write(&truncated, br#"{"vectors": [[0.6, 0.8]], "metas": [{"source": "a", "#)
        .await
        .unwrap();
    let corrupt = VectorIndex::load(&truncated).await.unwrap_err();
    assert_eq!(corrupt.class(), ErrorClass::CorruptIndex);

    let directory = tmp.path().join("index.json");
    tokio::fs::create_dir(&directory).await.unwrap();
    let not_a_file = VectorIndex::load(&directory).await.unwrap_err();
    assert_eq!(not_a_file.class(), ErrorClass::CorruptIndex);
}

#[tokio::test]
async fn saved_file_keeps_the_three_aligned_arrays() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("index.json");
    let chunks = vec![Chunk::new("a.txt", 0, "alpha"), Chunk::new("b.txt", 3, "beta")];
    let index = VectorIndex::from_parts(chunks, vec![vec![3.0, 4.0], vec![0.0, 2.0]]).unwrap();
    index.save(&path).await.unwrap();

    let raw: serde_json::Value =
        serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
    assert_eq!(raw["chunks"], serde_json::json!(["alpha", "beta"]));
    assert_eq!(raw["metas"][1]["source"], "b.txt");
    assert_eq!(raw["metas"][1]["chunk_id"], 3);
    let first = raw["vectors"][0].as_array().unwrap();
    assert!((first[0].as_f64().unwrap() - 0.6).abs() < 1e-6);
    assert!((first[1].as_f64().unwrap() - 0.8).abs() < 1e-6);
    assert_eq!(VectorIndex::load(&path).await.unwrap(), index);
}
