//! Retrieval-augmented question answering over a [`docqa_vector_store::VectorIndex`].
//!
//! ```text
//! question ──► EmbeddingProvider ──► search_raw(index snapshot) ──► SearchResult[]
//!                                                                     │
//!                          format_context ◄────────────────────────────┘
//!                                │
//!   PromptTemplate::render(profile, context) ──► ChatProvider ──► QaResponse
//! ```
//!
//! [`IntakeService`] runs the profile-collection conversation that precedes
//! QA and lifts the confirmed profile out of the model's reply.
//!
//! The serving index lives behind an [`IndexHandle`]; reloads swap it
//! atomically while in-flight queries finish on their snapshot.

mod chat;
mod error;
mod format;
mod handle;
mod intake;
mod prompt;
mod qa;

pub use chat::{
    ChatMessage, ChatProvider, OpenAiChat, StubChat, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};
pub use error::{Result, SearchError};
pub use format::format_context;
pub use handle::IndexHandle;
pub use intake::{CollectRequest, CollectResponse, IntakeService, COLLECT_MAX_TOKENS};
pub use prompt::{
    PromptTemplate, CONTEXT_PLACEHOLDER, DEFAULT_COLLECT_PROMPT, DEFAULT_QA_PROMPT,
    PROFILE_PLACEHOLDER,
};
pub use qa::{QaRequest, QaResponse, QaService, UserProfile, DEFAULT_TOP_K};
