use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub embeddings: EmbeddingsConfig,
    pub document: DocumentConfig,
    pub retrieval: RetrievalConfig,
    pub llm: Option<LlmConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub local_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsConfig {
    pub model: String,
    pub dimensions: usize,
    pub batch_size: usize,
}

/// Source document settings: which file is indexed at startup and how it is
/// split into chunks.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentConfig {
    pub spec_file_path: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

/// Retrieval and answer-assembly settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Default number of passages fetched per question when the request does
    /// not specify one. The API clamps requests to 1..=10.
    pub max_results: u32,
    /// Cosine-similarity floor; results scoring below it are discarded.
    pub similarity_threshold: f32,
    /// Character budget for the context block fed into generation.
    pub max_context_length: usize,
    /// How many prior messages are fetched from a session per turn.
    pub history_fetch_limit: u32,
    /// How many of the fetched messages are rendered into the prompt.
    /// Must not exceed `history_fetch_limit`.
    pub history_render_limit: usize,
}

/// LLM configuration for the answer-generation model.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub temperature: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("LOREKEEPER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("LOREKEEPER_PORT", 8000),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "file:lorekeeper.db".to_string()),
                auth_token: env::var("DATABASE_AUTH_TOKEN").ok(),
                local_path: env::var("DATABASE_LOCAL_PATH").ok(),
            },
            embeddings: EmbeddingsConfig {
                model: env::var("EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "local/BAAI/bge-small-en-v1.5".to_string()),
                dimensions: parse_env_or("EMBEDDING_DIMENSIONS", 384),
                batch_size: parse_env_or("EMBEDDING_BATCH_SIZE", 256),
            },
            document: DocumentConfig {
                spec_file_path: env::var("SPEC_FILE_PATH")
                    .unwrap_or_else(|_| "docs/spec/game-spec.md".to_string()),
                chunk_size: parse_env_or("CHUNK_SIZE", 1000),
                chunk_overlap: parse_env_or("CHUNK_OVERLAP", 200),
            },
            retrieval: RetrievalConfig {
                max_results: parse_env_or("MAX_RESULTS", 3),
                similarity_threshold: parse_env_or("SIMILARITY_THRESHOLD", 0.35),
                max_context_length: parse_env_or("MAX_CONTEXT_LENGTH", 4000),
                history_fetch_limit: parse_env_or("HISTORY_FETCH_LIMIT", 20),
                history_render_limit: parse_env_or("HISTORY_RENDER_LIMIT", 10),
            },
            llm: env::var("LLM_MODEL").ok().map(|model| LlmConfig {
                model,
                api_key: env::var("LLM_API_KEY").ok(),
                base_url: env::var("LLM_BASE_URL").ok(),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 30),
                max_retries: parse_env_or("LLM_MAX_RETRIES", 3),
                temperature: parse_env_or("LLM_TEMPERATURE", 0.3),
            }),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known embedding providers that use OpenAI-compatible APIs
const KNOWN_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio", "local"];

/// Known LLM providers that use OpenAI-compatible APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Parse a model name into (provider, model) tuple.
pub fn parse_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // No recognized provider prefix: assume a local model name
    ("local", model)
}

/// Parse an LLM model name into (provider, model) tuple.
/// Unlike embeddings, LLM models default to "openai" when no prefix is given.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    ("openai", model)
}
