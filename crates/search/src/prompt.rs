use std::path::Path;

pub const PROFILE_PLACEHOLDER: &str = "{{USER_PROFILE}}";
pub const CONTEXT_PLACEHOLDER: &str = "{{CONTEXT}}";

pub const DEFAULT_QA_PROMPT: &str = "\
You answer questions about the document collection using the provided context.
- Answer in the user's language.
- Tailor the answer to the user profile when it is relevant.
- If the answer is not in CONTEXT, say you don't know.

USER PROFILE:
{{USER_PROFILE}}

CONTEXT:
{{CONTEXT}}

Answer clearly and concisely. Cite with [1], [2]... based on the numbered context blocks.
";

pub const DEFAULT_COLLECT_PROMPT: &str = "\
You are a helpful assistant collecting the user's details (match the user's language).
Ask one or two questions per turn and validate each answer:
- first & last name
- 9-digit ID number
- gender
- age (0-120)
- health plan
- 9-digit membership card number
- membership tier

After all fields are gathered, show a compact summary and ask for confirmation.
When the user confirms, output:

<<<JSON>>>
{\"firstName\":\"\",\"lastName\":\"\",\"idNumber\":\"\",\"gender\":\"\",\"age\":0,\"hmo\":\"\",\"hmoCard\":\"\",\"tier\":\"\"}
<<<END>>>
";

/// System prompt with `{{USER_PROFILE}}` / `{{CONTEXT}}` slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_QA_PROMPT)
    }
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Read a template file; a missing or unreadable file falls back to the
    /// built-in QA prompt.
    pub fn from_file_or_default(path: &Path) -> Self {
        Self::from_file_or(path, DEFAULT_QA_PROMPT)
    }

    pub fn from_file_or(path: &Path, fallback: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                log::info!("Loaded prompt template from {}", path.display());
                Self::new(text)
            }
            Err(err) => {
                log::warn!(
                    "Prompt missing at {} ({err}); using built-in default",
                    path.display()
                );
                Self::new(fallback)
            }
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Fill both slots in a single pass, so placeholder-like text inside the
    /// profile or the context is never expanded again.
    #[must_use]
    pub fn render(&self, profile: &str, context: &str) -> String {
        let mut out = String::with_capacity(self.text.len() + profile.len() + context.len());
        let mut rest = self.text.as_str();
        loop {
            let next_profile = rest.find(PROFILE_PLACEHOLDER);
            let next_context = rest.find(CONTEXT_PLACEHOLDER);
            let (at, placeholder, value) = match (next_profile, next_context) {
                (Some(p), Some(c)) if p < c => (p, PROFILE_PLACEHOLDER, profile),
                (Some(p), None) => (p, PROFILE_PLACEHOLDER, profile),
                (_, Some(c)) => (c, CONTEXT_PLACEHOLDER, context),
                (None, None) => break,
            };
            out.push_str(&rest[..at]);
            out.push_str(value);
            rest = &rest[at + placeholder.len()..];
        }
        out.push_str(rest);
        out
    }
}
