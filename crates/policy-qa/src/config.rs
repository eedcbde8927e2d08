//! Configuration for the policy assistant

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable holding the provider credential
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable overriding the provider base URL
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
/// Environment variable overriding the chat model
pub const MODEL_ENV: &str = "POLICY_QA_MODEL";

/// Main assistant configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Chat-completion configuration
    pub llm: LlmConfig,
    /// Keyword retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Prompt wording
    pub assistant: AssistantConfig,
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then apply
    /// environment overrides (a `.env` file is read first if present).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(toml::from_str(&raw)?)
    }

    /// `~/.config/policy-qa/config.toml` (platform equivalent)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("policy-qa").join("config.toml"))
    }

    /// Apply environment overrides
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.llm.api_key = Some(key.trim().to_string());
            }
        }
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.llm.base_url = url.trim().trim_end_matches('/').to_string();
            }
        }
        if let Ok(model) = std::env::var(MODEL_ENV) {
            if !model.trim().is_empty() {
                self.llm.model = model.trim().to_string();
            }
        }
    }

    /// Check invariants that the pipeline relies on
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;

        if self.llm.timeout_secs == 0 {
            return Err(Error::config("llm.timeout_secs must be greater than zero"));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(Error::config(format!(
                "llm.temperature must be within 0.0..=2.0, got {}",
                self.llm.temperature
            )));
        }
        if self.server.session_ttl_secs == 0 {
            return Err(Error::config("server.session_ttl_secs must be greater than zero"));
        }
        if self.server.max_sessions == 0 {
            return Err(Error::config("server.max_sessions must be at least 1"));
        }
        if self.retrieval.fallback_chunks == 0 {
            return Err(Error::config("retrieval.fallback_chunks must be at least 1"));
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
    /// Idle time after which a session is dropped
    pub session_ttl_secs: u64,
    /// Live session cap; the least recently used session is evicted beyond it
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            enable_cors: true,
            max_upload_size: 50 * 1024 * 1024,
            session_ttl_secs: 3600,
            max_sessions: 1000,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size in characters (soft limit)
    pub chunk_size: usize,
    /// Trailing characters carried into the next chunk
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::config("chunking.chunk_size must be greater than zero"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Chat-completion provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,
    /// Model used for both key-term extraction and answering
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Bearer credential; usually supplied through the environment
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.0,
            timeout_secs: 120,
            api_key: None,
        }
    }
}

/// Keyword retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Key terms shorter than this many characters are discarded
    pub min_term_length: usize,
    /// Number of leading chunks used when no key term matches
    pub fallback_chunks: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            min_term_length: 3,
            fallback_chunks: 3,
        }
    }
}

/// Prompt wording
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Organization whose HR policies the document describes
    pub organization: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            organization: "Nestlé".to_string(),
        }
    }
}
