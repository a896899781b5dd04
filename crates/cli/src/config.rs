use anyhow::{Context as AnyhowContext, Result};
use docqa_chunker::ChunkerConfig;
use docqa_indexer::{IndexerConfig, DEFAULT_EXTENSIONS};
use docqa_search::{COLLECT_MAX_TOKENS, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TOP_K};
use docqa_vector_store::{
    EmbeddingMode, DEFAULT_AZURE_API_VERSION, DEFAULT_EMBED_BATCH, EMBEDDING_MODE_ENV,
    STUB_DIMENSION,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENDPOINT_ENV: &str = "AZURE_OPENAI_ENDPOINT";
pub const KEY_ENV: &str = "AZURE_OPENAI_KEY";
pub const API_VERSION_ENV: &str = "AZURE_OPENAI_API_VERSION";
pub const EMBEDDINGS_DEPLOYMENT_ENV: &str = "AZURE_OPENAI_EMBEDDINGS_DEPLOYMENT";
pub const CHAT_DEPLOYMENT_ENV: &str = "AZURE_OPENAI_CHAT_DEPLOYMENT";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const INDEX_PATH_ENV: &str = "INDEX_PATH";
pub const API_KEY_ENV: &str = "API_KEY";
pub const CORS_ORIGINS_ENV: &str = "CORS_ALLOW_ORIGINS";

/// Resolved settings: defaults, then the TOML file, then environment, then flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocqaConfig {
    pub data_dir: PathBuf,
    pub index_path: PathBuf,
    pub extensions: Vec<String>,
    pub prompt_path: PathBuf,
    pub collect_prompt_path: PathBuf,
    pub chunking: ChunkerConfig,
    pub provider: ProviderConfig,
    pub embedding: EmbeddingConfig,
    pub chat: ChatConfig,
    pub retrieval: RetrievalConfig,
    pub server: ServerConfig,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKind {
    Azure,
    OpenAi,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ApiKind,
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// `remote` or `stub`.
    pub mode: String,
    pub model: String,
    pub batch_size: usize,
    pub stub_dimension: usize,
    pub dimensions: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
    pub collect_max_tokens: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Required `x-api-key` value; `None` disables the check.
    pub api_key: Option<String>,
    /// Allowed CORS origins; `*` allows any.
    pub cors_origins: Vec<String>,
}

impl Default for DocqaConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            index_path: PathBuf::from("index/index.json"),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
            prompt_path: PathBuf::from("prompts/qa.txt"),
            collect_prompt_path: PathBuf::from("prompts/collect.txt"),
            chunking: ChunkerConfig::default(),
            provider: ProviderConfig::default(),
            embedding: EmbeddingConfig::default(),
            chat: ChatConfig::default(),
            retrieval: RetrievalConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ApiKind::Azure,
            endpoint: String::new(),
            api_key: String::new(),
            api_version: DEFAULT_AZURE_API_VERSION.to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            mode: "remote".to_string(),
            model: "text-embedding-ada-002".to_string(),
            batch_size: DEFAULT_EMBED_BATCH,
            stub_dimension: STUB_DIMENSION,
            dimensions: None,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            collect_max_tokens: COLLECT_MAX_TOKENS,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: usize::try_from(DEFAULT_TOP_K).unwrap_or(5),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            api_key: None,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl DocqaConfig {
    /// Defaults overlaid with `path` (when given) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Overlay variables returned by `lookup`; blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(value) = get(ENDPOINT_ENV) {
            self.provider.endpoint = value;
        }
        if let Some(value) = get(KEY_ENV) {
            self.provider.api_key = value;
        }
        if let Some(value) = get(API_VERSION_ENV) {
            self.provider.api_version = value;
        }
        if let Some(value) = get(EMBEDDINGS_DEPLOYMENT_ENV) {
            self.embedding.model = value;
        }
        if let Some(value) = get(CHAT_DEPLOYMENT_ENV) {
            self.chat.model = value;
        }
        if let Some(value) = get(DATA_DIR_ENV) {
            self.data_dir = PathBuf::from(value);
        }
        if let Some(value) = get(INDEX_PATH_ENV) {
            self.index_path = PathBuf::from(value);
        }
        if let Some(value) = get(API_KEY_ENV) {
            self.server.api_key = Some(value);
        }
        if let Some(value) = get(EMBEDDING_MODE_ENV) {
            self.embedding.mode = value;
        }
        if let Some(value) = get(CORS_ORIGINS_ENV) {
            self.server.cors_origins = value
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect();
        }
    }

    /// Reject unusable settings before any work starts.
    pub fn validate(&self) -> Result<()> {
        self.chunking
            .validate()
            .context("Invalid [chunking] settings")?;
        self.embedding_mode()?;
        if self.embedding.batch_size == 0 {
            anyhow::bail!("embedding.batch_size must be > 0");
        }
        if self.embedding.stub_dimension == 0 {
            anyhow::bail!("embedding.stub_dimension must be > 0");
        }
        if self.retrieval.top_k == 0 {
            anyhow::bail!("retrieval.top_k must be > 0");
        }
        Ok(())
    }

    pub fn embedding_mode(&self) -> Result<EmbeddingMode> {
        EmbeddingMode::parse(&self.embedding.mode).context("Invalid embedding mode")
    }

    pub fn indexer_config(&self) -> IndexerConfig {
        let mut config = IndexerConfig::new(&self.data_dir, &self.index_path);
        config.extensions = self.extensions.clone();
        config.chunking = self.chunking;
        config.batch_size = self.embedding.batch_size;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_valid() {
        let config = DocqaConfig::default();
        config.validate().unwrap();
        assert_eq!(config.chunking, ChunkerConfig::new(1100, 200));
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.provider.api_version, "2024-06-01");
    }

    #[test]
    fn file_then_env_layering() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("docqa.toml");
        std::fs::write(
            &path,
            r#"
data_dir = "corpus"
index_path = "from-file.json"

[chunking]
target_size = 800
overlap = 100

[embedding]
mode = "stub"
stub_dimension = 32
"#,
        )
        .unwrap();

        let mut config = DocqaConfig::from_file(&path).unwrap();
        assert_eq!(config.chunking, ChunkerConfig::new(800, 100));
        assert_eq!(config.embedding.batch_size, DEFAULT_EMBED_BATCH);

        let env: HashMap<&str, &str> = [
            (INDEX_PATH_ENV, "from-env.json"),
            (API_KEY_ENV, "secret"),
            (CHAT_DEPLOYMENT_ENV, "  "),
            (CORS_ORIGINS_ENV, "http://localhost:3000, https://app.example"),
        ]
        .into_iter()
        .collect();
        config.apply_env(|name| env.get(name).map(|v| (*v).to_string()));

        assert_eq!(config.data_dir, PathBuf::from("corpus"));
        assert_eq!(config.index_path, PathBuf::from("from-env.json"));
        assert_eq!(config.server.api_key.as_deref(), Some("secret"));
        assert_eq!(config.chat.model, "gpt-4o-mini");
        assert_eq!(
            config.server.cors_origins,
            vec!["http://localhost:3000", "https://app.example"]
        );
        assert_eq!(config.embedding_mode().unwrap(), EmbeddingMode::Stub);
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut config = DocqaConfig::default();
        config.chunking = ChunkerConfig::new(100, 100);
        assert!(config.validate().is_err());

        let mut config = DocqaConfig::default();
        config.embedding.mode = "quantum".to_string();
        assert!(config.validate().is_err());

        let mut config = DocqaConfig::default();
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_file_is_reported() {
        let tmp = TempDir::new().unwrap();
        let err = DocqaConfig::from_file(&tmp.path().join("none.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read config"));
    }
}
