use async_trait::async_trait;
use docqa_indexer::{CorpusIndexer, IndexerConfig, IndexerError};
use docqa_vector_store::{
    search_raw, EmbeddingProvider, ErrorClass, StubEmbedder, VectorIndex, VectorStoreError,
};
use std::path::Path;
use tempfile::TempDir;

struct OfflineProvider;

#[async_trait]
impl EmbeddingProvider for OfflineProvider {
    fn model_id(&self) -> &str {
        "offline"
    }

    async fn embed_many(&self, _texts: &[String]) -> docqa_vector_store::Result<Vec<Vec<f32>>> {
        Err(VectorStoreError::provider("network unreachable"))
    }
}

async fn write_corpus(dir: &Path) {
    tokio::fs::create_dir_all(dir.join("plans"))
        .await
        .expect("create plans");
    tokio::fs::write(
        dir.join("plans").join("dental.html"),
        "<html><body><h1>Dental</h1><table>\
         <tr><th>Tier</th><th>Discount</th></tr>\
         <tr><td>Gold</td><td>50%</td></tr></table></body></html>",
    )
    .await
    .expect("write dental");
    tokio::fs::write(dir.join("hours.txt"), "Clinics open Sunday to Thursday.")
        .await
        .expect("write hours");
}

#[tokio::test]
async fn indexes_directory_and_retrieves_by_text() {
    let temp = TempDir::new().expect("tempdir");
    let data = temp.path().join("data");
    write_corpus(&data).await;
    let index_path = temp.path().join("index").join("index.json");

    let indexer = CorpusIndexer::new(IndexerConfig::new(&data, &index_path)).expect("indexer");
    let embedder = StubEmbedder::default();
    let stats = indexer.index(&embedder).await.expect("index");

    assert_eq!(stats.documents, 2);
    assert_eq!(stats.chunks, 2);
    assert!(stats.errors.is_empty());

    let index = VectorIndex::load_expecting(&index_path, embedder.dimension())
        .await
        .expect("load");
    assert_eq!(index.sources(), vec!["hours.txt", "plans/dental.html"]);
    assert_eq!(
        index.chunks()[1],
        "Dental\nTier | Discount\nGold | 50%"
    );

    let query = embedder
        .embed_one("Clinics open Sunday to Thursday.")
        .await
        .expect("embed");
    let results = search_raw(&index, &query, 1).expect("search");
    assert_eq!(results[0].source, "hours.txt");
    assert_eq!(results[0].chunk_id, 0);
}

#[tokio::test]
async fn provider_failure_leaves_previous_index_in_place() {
    let temp = TempDir::new().expect("tempdir");
    let data = temp.path().join("data");
    write_corpus(&data).await;
    let index_path = temp.path().join("index.json");

    let indexer = CorpusIndexer::new(IndexerConfig::new(&data, &index_path)).expect("indexer");
    indexer
        .index(&StubEmbedder::default())
        .await
        .expect("first build");
    let before = tokio::fs::read(&index_path).await.expect("read index");

    tokio::fs::write(data.join("new.txt"), "fresh document")
        .await
        .expect("write new doc");
    let err = indexer.index(&OfflineProvider).await.unwrap_err();
    match err {
        IndexerError::VectorStoreError(inner) => assert_eq!(inner.class(), ErrorClass::Provider),
        other => panic!("unexpected error: {other}"),
    }

    let after = tokio::fs::read(&index_path).await.expect("read index");
    assert_eq!(before, after);
}

#[tokio::test]
async fn rebuild_is_deterministic() {
    let temp = TempDir::new().expect("tempdir");
    let data = temp.path().join("data");
    write_corpus(&data).await;

    let first = temp.path().join("first.json");
    let second = temp.path().join("second.json");
    for path in [&first, &second] {
        CorpusIndexer::new(IndexerConfig::new(&data, path))
            .expect("indexer")
            .index(&StubEmbedder::default())
            .await
            .expect("index");
    }

    assert_eq!(
        tokio::fs::read(&first).await.expect("first"),
        tokio::fs::read(&second).await.expect("second")
    );
}
