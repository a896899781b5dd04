use crate::chat::{ChatMessage, ChatProvider};
use crate::error::{Result, SearchError};
use crate::format::format_context;
use crate::handle::IndexHandle;
use crate::prompt::PromptTemplate;
use docqa_vector_store::{search_raw, EmbeddingProvider, SearchResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

pub const DEFAULT_TOP_K: i64 = 5;

/// Caller-supplied profile fields (name, plan, tier, ...). Nulls are dropped
/// before the profile reaches the prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(pub Map<String, Value>);

impl UserProfile {
    #[must_use]
    pub fn to_prompt_json(&self) -> String {
        let present: Map<String, Value> = self
            .0
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Value::Object(present).to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaRequest {
    pub history: Vec<ChatMessage>,
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default = "default_top_k")]
    pub top_k: i64,
}

const fn default_top_k() -> i64 {
    DEFAULT_TOP_K
}

impl QaRequest {
    /// The question is the most recent user turn.
    #[must_use]
    pub fn question(&self) -> Option<&str> {
        self.history
            .iter()
            .rev()
            .find(|message| message.is_user())
            .map(|message| message.content.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaResponse {
    pub reply: String,
    pub sources: Vec<SearchResult>,
}

/// Retrieval + answer generation over the serving index.
#[derive(Clone)]
pub struct QaService {
    index: IndexHandle,
    embedder: Arc<dyn EmbeddingProvider>,
    chat: Arc<dyn ChatProvider>,
    prompt: PromptTemplate,
}

impl QaService {
    pub fn new(
        index: IndexHandle,
        embedder: Arc<dyn EmbeddingProvider>,
        chat: Arc<dyn ChatProvider>,
        prompt: PromptTemplate,
    ) -> Self {
        Self {
            index,
            embedder,
            chat,
            prompt,
        }
    }

    #[must_use]
    pub const fn index(&self) -> &IndexHandle {
        &self.index
    }

    /// Embed `question` and return the top `k` chunks.
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Err(SearchError::InvalidInput("top_k must be > 0".to_string()));
        }
        if question.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        let index = self.index.current().ok_or(SearchError::IndexNotLoaded)?;
        if index.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed_one(question).await?;
        let results = search_raw(&index, &query, k)?;
        log::debug!("Retrieved {} chunks for '{}'", results.len(), question);
        Ok(results)
    }

    /// Answer the latest user turn of `request.history` from retrieved context.
    pub async fn answer(&self, request: &QaRequest) -> Result<QaResponse> {
        let top_k = usize::try_from(request.top_k)
            .ok()
            .filter(|k| *k > 0)
            .ok_or_else(|| {
                SearchError::InvalidInput(format!("top_k must be > 0, got {}", request.top_k))
            })?;
        let question = request.question().ok_or(SearchError::EmptyQuery)?;

        let sources = self.retrieve(question, top_k).await?;
        let profile = request
            .user
            .as_ref()
            .map_or_else(|| "{}".to_string(), UserProfile::to_prompt_json);
        let system = self.prompt.render(&profile, &format_context(&sources));

        let mut messages = Vec::with_capacity(request.history.len() + 1);
        messages.push(ChatMessage::system(system));
        messages.extend(request.history.iter().cloned());

        let reply = self.chat.complete(&messages).await?;
        log::info!(
            "Answered with {} sources ({} chars)",
            sources.len(),
            reply.len()
        );
        Ok(QaResponse { reply, sources })
    }
}
