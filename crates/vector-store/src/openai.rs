//! OpenAI-compatible and Azure OpenAI embedding client.

use crate::embeddings::EmbeddingProvider;
use crate::error::{Result, VectorStoreError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_AZURE_API_VERSION: &str = "2024-06-01";

/// How requests are addressed and authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiFlavor {
    /// `{endpoint}/openai/deployments/{deployment}/{op}?api-version=…`, `api-key` header.
    Azure { api_version: String },
    /// `{base_url}/{op}`, bearer token, model named in the body.
    OpenAi,
}

/// Base URL + credentials shared by the embedding and chat clients.
#[derive(Debug, Clone)]
pub struct ApiEndpoint {
    pub base_url: String,
    pub api_key: String,
    pub flavor: ApiFlavor,
    pub timeout: Duration,
}

impl ApiEndpoint {
    pub fn azure(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            flavor: ApiFlavor::Azure {
                api_version: DEFAULT_AZURE_API_VERSION.to_string(),
            },
            timeout: Duration::from_secs(60),
        }
    }

    pub fn openai(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            flavor: ApiFlavor::OpenAi,
            timeout: Duration::from_secs(60),
        }
    }

    /// Full URL for an operation (`embeddings`, `chat/completions`) on a deployment.
    #[must_use]
    pub fn operation_url(&self, deployment: &str, operation: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        match &self.flavor {
            ApiFlavor::Azure { api_version } => format!(
                "{base}/openai/deployments/{deployment}/{operation}?api-version={api_version}"
            ),
            ApiFlavor::OpenAi => format!("{base}/{operation}"),
        }
    }

    /// Builds an HTTP client with auth headers baked in.
    pub fn client(&self) -> Result<Client> {
        if self.base_url.trim().is_empty() {
            return Err(VectorStoreError::configuration("missing API endpoint"));
        }
        if self.api_key.trim().is_empty() {
            return Err(VectorStoreError::configuration("missing API key"));
        }

        let mut headers = HeaderMap::new();
        let (name, value) = match self.flavor {
            ApiFlavor::Azure { .. } => (
                HeaderName::from_static("api-key"),
                self.api_key.trim().to_string(),
            ),
            ApiFlavor::OpenAi => (AUTHORIZATION, format!("Bearer {}", self.api_key.trim())),
        };
        let value = HeaderValue::from_str(&value)
            .map_err(|_| VectorStoreError::configuration("API key is not a valid header value"))?;
        headers.insert(name, value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| {
                VectorStoreError::configuration(format!("failed to build HTTP client: {err}"))
            })
    }

    /// Whether the request body must carry the model name.
    #[must_use]
    pub const fn sends_model_in_body(&self) -> bool {
        matches!(self.flavor, ApiFlavor::OpenAi)
    }
}

/// Embedding client for `/embeddings`.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    url: String,
    model: String,
    model_in_body: bool,
    dimensions: Option<usize>,
}

impl OpenAiEmbedder {
    pub fn new(endpoint: &ApiEndpoint, model: impl Into<String>) -> Result<Self> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(VectorStoreError::configuration("missing embedding model name"));
        }
        Ok(Self {
            client: endpoint.client()?,
            url: endpoint.operation_url(&model, "embeddings"),
            model_in_body: endpoint.sends_model_in_body(),
            model,
            dimensions: None,
        })
    }

    /// Ask the provider for shortened vectors (models that support it).
    #[must_use]
    pub const fn with_dimensions(mut self, dimensions: Option<usize>) -> Self {
        self.dimensions = dimensions;
        self
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: self.model_in_body.then_some(self.model.as_str()),
            input: texts,
            dimensions: self.dimensions,
        };
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|err| VectorStoreError::provider(format!("embeddings request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(VectorStoreError::provider(format!(
                "embeddings request returned {status}: {body}"
            )));
        }

        let mut parsed: EmbeddingResponse = response.json().await.map_err(|err| {
            VectorStoreError::provider(format!("failed to parse embeddings response: {err}"))
        })?;
        parsed.data.sort_by_key(|entry| entry.index);
        if parsed.data.len() != texts.len() {
            return Err(VectorStoreError::provider(format!(
                "{} returned {} embeddings for {} inputs",
                self.model,
                parsed.data.len(),
                texts.len()
            )));
        }
        if let Some((position, entry)) = parsed
            .data
            .iter()
            .enumerate()
            .find(|(position, entry)| entry.index != *position)
        {
            return Err(VectorStoreError::provider(format!(
                "{} returned embedding index {} where {position} was expected",
                self.model, entry.index
            )));
        }
        Ok(parsed.data.into_iter().map(|entry| entry.embedding).collect())
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn azure_urls_address_the_deployment() {
        let endpoint = ApiEndpoint::azure("https://example.openai.azure.com/", "k");
        assert_eq!(
            endpoint.operation_url("text-embedding-3-large", "embeddings"),
            "https://example.openai.azure.com/openai/deployments/text-embedding-3-large/embeddings?api-version=2024-06-01"
        );
        let endpoint = ApiEndpoint::openai("https://api.openai.com/v1", "k");
        assert_eq!(
            endpoint.operation_url("m", "chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn missing_credentials_are_configuration_errors() {
        let err = OpenAiEmbedder::new(&ApiEndpoint::azure("https://x", " "), "m")
            .err()
            .unwrap();
        assert!(matches!(err, VectorStoreError::Configuration(_)));
    }

    #[tokio::test]
    async fn responses_are_reordered_by_index() {
        let app = Router::new().route(
            "/embeddings",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "m");
                assert_eq!(body["input"].as_array().map(Vec::len), Some(2));
                Json(json!({
                    "data": [
                        {"index": 1, "embedding": [0.0, 1.0]},
                        {"index": 0, "embedding": [1.0, 0.0]}
                    ]
                }))
            }),
        );
        let base = spawn(app).await;
        let embedder = OpenAiEmbedder::new(&ApiEndpoint::openai(base, "key"), "m").unwrap();

        let vectors = embedder
            .embed_many(&["first".to_string(), "second".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn misaligned_indices_are_rejected() {
        let app = Router::new()
            .route(
                "/duplicate/embeddings",
                post(|| async {
                    Json(json!({
                        "data": [
                            {"index": 0, "embedding": [1.0, 0.0]},
                            {"index": 0, "embedding": [0.0, 1.0]}
                        ]
                    }))
                }),
            )
            .route(
                "/out-of-range/embeddings",
                post(|| async {
                    Json(json!({
                        "data": [
                            {"index": 0, "embedding": [1.0, 0.0]},
                            {"index": 5, "embedding": [0.0, 1.0]}
                        ]
                    }))
                }),
            );
        let base = spawn(app).await;
        let texts = ["first".to_string(), "second".to_string()];

        for route in ["duplicate", "out-of-range"] {
            let endpoint = ApiEndpoint::openai(format!("{base}/{route}"), "key");
            let embedder = OpenAiEmbedder::new(&endpoint, "m").unwrap();
            let err = embedder.embed_many(&texts).await.unwrap_err();
            assert!(matches!(err, VectorStoreError::Provider(_)), "{route}: {err}");
        }
    }

    #[tokio::test]
    async fn http_failures_surface_as_provider_errors() {
        let app = Router::new().route(
            "/embeddings",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "quota exceeded") }),
        );
        let base = spawn(app).await;
        let embedder = OpenAiEmbedder::new(&ApiEndpoint::openai(base, "key"), "m").unwrap();

        let err = embedder.embed_one("question").await.unwrap_err();
        assert!(matches!(err, VectorStoreError::Provider(_)));
        assert!(err.to_string().contains("429"));
    }
}
