//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::core::models::{ModelConfig, ModelMode};

/// Default number of units sent to the model per request
pub const DEFAULT_CHUNK_SIZE: usize = 3000;

/// Default per-request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Configuration for translator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Bearer token for the model service
    pub api_key: String,
    /// Chat or completion endpoint URL
    pub api_endpoint: String,
    /// Model used unless a call overrides it
    pub model: ModelConfig,
    /// Units per request
    pub chunk_size: usize,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("LLM_API_KEY").unwrap_or_default(),
            api_endpoint: std::env::var("LLM_API_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            model: ModelConfig::new("openai", "gpt-4o-mini"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl TranslatorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| anyhow::anyhow!("LLM_API_KEY environment variable is required"))?;

        let api_endpoint =
            std::env::var("LLM_API_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

        let provider = std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let mode = std::env::var("LLM_MODE")
            .unwrap_or_else(|_| "chat".to_string())
            .parse::<ModelMode>()
            .map_err(|e| anyhow::anyhow!(e))?;

        let completion_params = match std::env::var("LLM_COMPLETION_PARAMS") {
            Ok(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw).map_err(|e| {
                anyhow::anyhow!("LLM_COMPLETION_PARAMS must be a JSON object: {}", e)
            })?,
            _ => serde_json::Map::new(),
        };

        let chunk_size = std::env::var("CHUNK_SIZE")
            .unwrap_or_else(|_| DEFAULT_CHUNK_SIZE.to_string())
            .parse::<usize>()?;

        let timeout_ms = std::env::var("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_MS.to_string())
            .parse::<u64>()?;

        Ok(Self {
            api_key,
            api_endpoint,
            model: ModelConfig {
                provider,
                model,
                mode,
                completion_params,
            },
            chunk_size,
            timeout_ms,
        })
    }

    /// Load and validate configuration from the environment
    pub fn load() -> anyhow::Result<Self> {
        let config = Self::from_env()?;
        config.validate()?;

        info!(
            "Using model {}/{} ({} mode), chunk size {}",
            config.model.provider, config.model.model, config.model.mode, config.chunk_size
        );

        Ok(config)
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_key.is_empty() {
            return Err(anyhow::anyhow!("API key is required"));
        }

        if self.api_endpoint.is_empty() {
            return Err(anyhow::anyhow!("API endpoint is required"));
        }

        if self.model.model.is_empty() {
            return Err(anyhow::anyhow!("Model identifier is required"));
        }

        if self.chunk_size == 0 {
            return Err(anyhow::anyhow!("chunk_size must be greater than 0"));
        }

        if self.timeout_ms == 0 {
            return Err(anyhow::anyhow!("timeout_ms must be greater than 0"));
        }

        Ok(())
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
