use crate::error::{IndexerError, Result};
use crate::markup::MarkupCleaner;
use crate::scanner::{is_markup, DocumentScanner, DEFAULT_EXTENSIONS};
use crate::stats::IndexStats;
use docqa_chunker::{normalize_text, Chunk, Chunker, ChunkerConfig};
use docqa_vector_store::{EmbeddingProvider, VectorIndex, DEFAULT_EMBED_BATCH};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Clone, Debug)]
pub struct IndexerConfig {
    pub data_dir: PathBuf,
    pub index_path: PathBuf,
    pub extensions: Vec<String>,
    pub chunking: ChunkerConfig,
    pub batch_size: usize,
}

impl IndexerConfig {
    pub fn new(data_dir: impl Into<PathBuf>, index_path: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            index_path: index_path.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
            chunking: ChunkerConfig::default(),
            batch_size: DEFAULT_EMBED_BATCH,
        }
    }
}

/// Corpus indexer that scans, cleans, chunks, embeds and persists documents
pub struct CorpusIndexer {
    config: IndexerConfig,
    scanner: DocumentScanner,
    cleaner: MarkupCleaner,
    chunker: Chunker,
}

impl CorpusIndexer {
    pub fn new(config: IndexerConfig) -> Result<Self> {
        if !config.data_dir.is_dir() {
            return Err(IndexerError::InvalidPath(format!(
                "Not a directory: {}",
                config.data_dir.display()
            )));
        }

        let scanner = DocumentScanner::new(&config.data_dir, &config.extensions);
        let chunker = Chunker::new(config.chunking)?;

        Ok(Self {
            scanner,
            cleaner: MarkupCleaner::new()?,
            chunker,
            config,
        })
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Read and chunk every document. Unreadable files are skipped and
    /// recorded in the stats; an empty directory is an error.
    pub async fn collect_chunks(&self) -> Result<(Vec<Chunk>, IndexStats)> {
        let files = self.scanner.scan();
        if files.is_empty() {
            return Err(IndexerError::NoDocuments {
                root: self.config.data_dir.clone(),
                extensions: self.scanner.extensions().to_vec(),
            });
        }

        let mut stats = IndexStats::new();
        let mut chunks = Vec::new();

        for path in &files {
            let source = self.scanner.source_id(path);
            match self.read_document(path).await {
                Ok(text) => {
                    let document_chunks = self.chunker.chunk_document(&source, &text);
                    log::debug!(
                        "{source}: {} chars -> {} chunks",
                        text.chars().count(),
                        document_chunks.len()
                    );
                    stats.add_document(&source, text.chars().count(), document_chunks.len());
                    chunks.extend(document_chunks);
                }
                Err(e) => {
                    log::warn!("Failed to read {}: {e}", path.display());
                    stats.add_error(format!("{source}: {e}"));
                }
            }
        }

        Ok((chunks, stats))
    }

    async fn read_document(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path).await?;
        let raw = String::from_utf8_lossy(&bytes);
        let text = if is_markup(path) {
            self.cleaner.clean(&raw)
        } else {
            raw.into_owned()
        };
        Ok(normalize_text(&text))
    }

    /// Build the index in memory without persisting it.
    pub async fn build(&self, embedder: &dyn EmbeddingProvider) -> Result<(VectorIndex, IndexStats)> {
        let start = Instant::now();
        log::info!(
            "Indexing {} with {}",
            self.config.data_dir.display(),
            embedder.model_id()
        );

        let (chunks, mut stats) = self.collect_chunks().await?;
        let index = VectorIndex::build(chunks, embedder, self.config.batch_size).await?;

        stats.time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        Ok((index, stats))
    }

    /// Build and atomically write the index to `index_path`. The previous
    /// file is untouched when any step fails.
    pub async fn index(&self, embedder: &dyn EmbeddingProvider) -> Result<IndexStats> {
        let start = Instant::now();
        let (index, mut stats) = self.build(embedder).await?;
        index.save(&self.config.index_path).await?;

        stats.time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        log::info!(
            "Indexing completed: {} documents, {} chunks in {} ms -> {}",
            stats.documents,
            stats.chunks,
            stats.time_ms,
            self.config.index_path.display()
        );
        Ok(stats)
    }
}
