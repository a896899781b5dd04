//! Conversational profile intake.
//!
//! The chat model interviews the user and, once they confirm, emits the
//! collected fields between `<<<JSON>>>` and `<<<END>>>`. Every turn is
//! returned verbatim; the block is parsed when present.

use crate::chat::{ChatMessage, ChatProvider};
use crate::error::Result;
use crate::prompt::PromptTemplate;
use crate::qa::UserProfile;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const COLLECT_MAX_TOKENS: usize = 700;

const PROFILE_BLOCK: &str = r"(?s)<<<JSON>>>(.*?)<<<END>>>";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectRequest {
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectResponse {
    pub reply: String,
    /// `None` until the reply carries a parseable profile block.
    pub extracted_json: Option<UserProfile>,
}

#[derive(Clone)]
pub struct IntakeService {
    chat: Arc<dyn ChatProvider>,
    prompt: PromptTemplate,
    block: Regex,
}

impl IntakeService {
    pub fn new(chat: Arc<dyn ChatProvider>, prompt: PromptTemplate) -> Result<Self> {
        Ok(Self {
            chat,
            prompt,
            block: Regex::new(PROFILE_BLOCK)?,
        })
    }

    /// Run one intake turn over `request.history`.
    pub async fn collect(&self, request: &CollectRequest) -> Result<CollectResponse> {
        let mut messages = Vec::with_capacity(request.history.len() + 1);
        messages.push(ChatMessage::system(self.prompt.as_str()));
        messages.extend(request.history.iter().cloned());

        let reply = self.chat.complete(&messages).await?;
        let extracted_json = self.extract_profile(&reply);
        if extracted_json.is_some() {
            log::info!("Intake completed with a confirmed profile");
        }
        Ok(CollectResponse {
            reply,
            extracted_json,
        })
    }

    /// Parse the first profile block in `reply`. A malformed block is logged
    /// and treated as absent.
    #[must_use]
    pub fn extract_profile(&self, reply: &str) -> Option<UserProfile> {
        let blob = self.block.captures(reply)?.get(1)?.as_str().trim();
        match serde_json::from_str::<UserProfile>(blob) {
            Ok(profile) => Some(profile),
            Err(err) => {
                log::warn!("Failed to parse collected profile: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::StubChat;
    use crate::prompt::DEFAULT_COLLECT_PROMPT;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    fn service() -> IntakeService {
        IntakeService::new(Arc::new(StubChat), PromptTemplate::new(DEFAULT_COLLECT_PROMPT))
            .unwrap()
    }

    #[test]
    fn extracts_confirmed_profile() {
        let reply = "Thanks, saved.\n<<<JSON>>>\n{\"firstName\":\"Dana\",\"age\":34}\n<<<END>>>\n";
        let profile = service().extract_profile(reply).unwrap();
        assert_eq!(profile.0["firstName"], json!("Dana"));
        assert_eq!(profile.0["age"], json!(34));
    }

    #[test]
    fn missing_block_is_none() {
        let intake = service();
        assert!(intake.extract_profile("What is your first name?").is_none());
        assert!(intake.extract_profile("<<<JSON>>> {\"a\":1} without end").is_none());
    }

    #[test]
    fn malformed_block_is_none() {
        let intake = service();
        assert!(intake
            .extract_profile("<<<JSON>>>{\"firstName\": <<<END>>>")
            .is_none());
        assert!(intake.extract_profile("<<<JSON>>>[1, 2]<<<END>>>").is_none());
    }

    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<ChatMessage>>,
    }

    #[async_trait]
    impl ChatProvider for Recording {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            *self.seen.lock().unwrap() = messages.to_vec();
            Ok("<<<JSON>>>{\"tier\":\"gold\"}<<<END>>>".to_string())
        }
    }

    #[tokio::test]
    async fn collect_prepends_intake_prompt() {
        let chat = Arc::new(Recording::default());
        let intake = IntakeService::new(chat.clone(), PromptTemplate::new("collect!")).unwrap();
        let request = CollectRequest {
            history: vec![ChatMessage::user("hi"), ChatMessage::assistant("name?")],
        };

        let response = intake.collect(&request).await.unwrap();
        assert_eq!(response.extracted_json.unwrap().0["tier"], json!("gold"));

        let seen = chat.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], ChatMessage::system("collect!"));
        assert_eq!(seen[2].role, "assistant");
    }
}
