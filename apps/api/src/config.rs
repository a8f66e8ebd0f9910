use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Built once at startup and threaded into every component — no module
/// reads the environment on its own.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    /// Model used for all CV extraction calls.
    pub llm_model: String,
    /// Vector store backend: "memory" or "chroma".
    pub vector_backend: String,
    pub chroma_url: String,
    pub chroma_collection: String,
    /// Embedding provider: "hash" (deterministic, local) or "openai".
    pub embedding_provider: String,
    pub embedding_model: String,
    pub embedding_dim: usize,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            llm_model: env_or("LLM_MODEL", crate::llm_client::DEFAULT_MODEL),
            vector_backend: env_or("VECTOR_BACKEND", "memory"),
            chroma_url: env_or("CHROMA_URL", "http://localhost:8000"),
            chroma_collection: env_or("CHROMA_COLLECTION", "applicants"),
            embedding_provider: env_or("EMBEDDING_PROVIDER", "hash"),
            embedding_model: env_or("EMBEDDING_MODEL", "text-embedding-3-small"),
            embedding_dim: env_or("EMBEDDING_DIM", "384")
                .parse::<usize>()
                .context("EMBEDDING_DIM must be a positive integer")?,
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            openai_base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
