//! Answer-generation gateway.

use crate::error::{Result, SearchError};
use async_trait::async_trait;
use docqa_vector_store::ApiEndpoint;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_MAX_TOKENS: usize = 800;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role == "user"
    }
}

/// Free-text completion over a message list.
///
/// Nothing guarantees the provider stays within the supplied context; the
/// reply is passed through as-is.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Chat-completions client (Azure deployment or OpenAI-compatible).
#[derive(Clone)]
pub struct OpenAiChat {
    client: Client,
    url: String,
    model: String,
    model_in_body: bool,
    temperature: f32,
    max_tokens: usize,
}

impl OpenAiChat {
    pub fn new(endpoint: &ApiEndpoint, model: impl Into<String>) -> Result<Self> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(SearchError::InvalidInput(
                "missing chat model name".to_string(),
            ));
        }
        Ok(Self {
            client: endpoint.client()?,
            url: endpoint.operation_url(&model, "chat/completions"),
            model_in_body: endpoint.sends_model_in_body(),
            model,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    #[must_use]
    pub const fn with_sampling(mut self, temperature: f32, max_tokens: usize) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl ChatProvider for OpenAiChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let body = ChatRequest {
            model: self.model_in_body.then_some(self.model.as_str()),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|err| SearchError::Provider(format!("chat request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(SearchError::Provider(format!(
                "chat request returned {status}: {text}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| SearchError::Provider(format!("failed to parse chat response: {err}")))?;
        parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .ok_or_else(|| SearchError::Provider(format!("{} returned no content", self.model)))
    }
}

/// Offline stand-in used with the stub embedding mode: echoes the latest
/// user turn instead of generating an answer.
#[derive(Clone, Debug, Default)]
pub struct StubChat;

#[async_trait]
impl ChatProvider for StubChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let question = messages
            .iter()
            .rev()
            .find(|message| message.is_user())
            .map_or("", |message| message.content.as_str());
        Ok(format!("[stub] {question}"))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: usize,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
