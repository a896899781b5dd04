use crate::config::{ApiKind, DocqaConfig};
use anyhow::{Context as AnyhowContext, Result};
use docqa_search::{ChatProvider, OpenAiChat, StubChat};
use docqa_vector_store::{
    ApiEndpoint, ApiFlavor, EmbeddingMode, EmbeddingProvider, OpenAiEmbedder, StubEmbedder,
};
use std::sync::Arc;
use std::time::Duration;

/// Embedding and chat backends resolved from configuration.
pub struct Providers {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub chat: Arc<dyn ChatProvider>,
    /// Same backend as `chat` with the intake token budget.
    pub intake_chat: Arc<dyn ChatProvider>,
    /// Dimension the loaded index must match, when known up front.
    pub expected_dimension: Option<usize>,
}

fn endpoint(config: &DocqaConfig) -> ApiEndpoint {
    let provider = &config.provider;
    let mut endpoint = match provider.kind {
        ApiKind::Azure => ApiEndpoint::azure(&provider.endpoint, &provider.api_key),
        ApiKind::OpenAi => ApiEndpoint::openai(&provider.endpoint, &provider.api_key),
    };
    if let ApiFlavor::Azure { api_version } = &mut endpoint.flavor {
        api_version.clone_from(&provider.api_version);
    }
    endpoint.timeout = Duration::from_secs(provider.timeout_secs);
    endpoint
}

pub fn embedder(config: &DocqaConfig) -> Result<(Arc<dyn EmbeddingProvider>, Option<usize>)> {
    match config.embedding_mode()? {
        EmbeddingMode::Stub => {
            let stub = StubEmbedder::new(config.embedding.stub_dimension);
            let dimension = stub.dimension();
            log::info!("Using stub embeddings ({dimension} dims)");
            Ok((Arc::new(stub), Some(dimension)))
        }
        EmbeddingMode::Remote => {
            let embedder = OpenAiEmbedder::new(&endpoint(config), &config.embedding.model)
                .context("Embedding provider is not configured")?
                .with_dimensions(config.embedding.dimensions);
            Ok((Arc::new(embedder), config.embedding.dimensions))
        }
    }
}

pub fn chat(config: &DocqaConfig) -> Result<Arc<dyn ChatProvider>> {
    chat_with_budget(config, config.chat.max_tokens)
}

fn chat_with_budget(config: &DocqaConfig, max_tokens: usize) -> Result<Arc<dyn ChatProvider>> {
    match config.embedding_mode()? {
        EmbeddingMode::Stub => Ok(Arc::new(StubChat)),
        EmbeddingMode::Remote => {
            let chat = OpenAiChat::new(&endpoint(config), &config.chat.model)
                .context("Chat provider is not configured")?
                .with_sampling(config.chat.temperature, max_tokens);
            Ok(Arc::new(chat))
        }
    }
}

pub fn resolve(config: &DocqaConfig) -> Result<Providers> {
    let (embedder, expected_dimension) = embedder(config)?;
    Ok(Providers {
        embedder,
        chat: chat(config)?,
        intake_chat: chat_with_budget(config, config.chat.collect_max_tokens)?,
        expected_dimension,
    })
}
