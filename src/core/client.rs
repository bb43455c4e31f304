//! Translation service clients

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{ModelConfig, ModelMode};

/// External translation collaborator
///
/// Given an ordered list of strings, returns the translated strings in the same
/// order. The returned list may be shorter or longer than the input; callers
/// are expected to tolerate that.
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Translate `texts` following the optional steering `query`
    async fn translate_lines(
        &self,
        texts: &[String],
        query: &str,
        timeout: Duration,
    ) -> Result<Vec<String>>;

    /// The same translator bound to another model
    ///
    /// Returns `None` when the translator has no model to choose, in which
    /// case callers keep using `self`.
    fn for_model(&self, _model: &ModelConfig) -> Option<Arc<dyn Translator>> {
        None
    }
}

/// Build the system instruction sent with every request
pub fn system_prompt(query: &str) -> String {
    let mut prompt = String::from(
        "You are a professional translation engine. Follow these rules strictly:\n\
         1. Translate only the text content and keep every formatting symbol.\n\
         2. Do not modify links, image paths or other non-text content.\n\
         3. Return exactly one output line for every input line, in the same order.\n",
    );

    if !query.trim().is_empty() {
        prompt.push_str(&format!("4. Special user request: {}\n", query.trim()));
    }

    prompt
}

/// Client for an OpenAI-compatible language model endpoint
#[derive(Debug, Clone)]
pub struct LlmTranslator {
    client: reqwest::Client,
    config: Arc<TranslatorConfig>,
}

impl LlmTranslator {
    /// Create a new translator
    pub fn new(config: TranslatorConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| TranslationError::ConfigError {
                message: e.to_string(),
            })?;

        let client = reqwest::Client::builder()
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Clone this client with `model` in place of the configured one
    pub fn with_model(&self, model: ModelConfig) -> Self {
        let mut config = (*self.config).clone();
        config.model = model;
        Self {
            client: self.client.clone(),
            config: Arc::new(config),
        }
    }

    /// Build the JSON request body for one chunk
    pub fn build_body(&self, texts: &[String], query: &str) -> serde_json::Value {
        let model = &self.config.model;
        let system = system_prompt(query);
        let user = texts.join("\n");

        let mut body = match model.mode {
            ModelMode::Chat => serde_json::json!({
                "model": model.model,
                "stream": false,
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": user },
                ],
            }),
            ModelMode::Completion => serde_json::json!({
                "model": model.model,
                "stream": false,
                "prompt": format!("{}\n{}", system, user),
            }),
        };

        if let Some(obj) = body.as_object_mut() {
            for (key, value) in &model.completion_params {
                obj.insert(key.clone(), value.clone());
            }
        }

        body
    }

    /// Pull the generated text out of a response body
    fn extract_text(&self, json: &serde_json::Value) -> Result<String> {
        let choice = json["choices"]
            .get(0)
            .ok_or_else(|| TranslationError::InvalidResponseError {
                message: "No choices in response".to_string(),
            })?;

        let text = match self.config.model.mode {
            ModelMode::Chat => choice["message"]["content"].as_str(),
            ModelMode::Completion => choice["text"].as_str(),
        };

        text.map(|s| s.to_string())
            .ok_or_else(|| TranslationError::InvalidResponseError {
                message: "No translation in response".to_string(),
            })
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    async fn translate_lines(
        &self,
        texts: &[String],
        query: &str,
        timeout: Duration,
    ) -> Result<Vec<String>> {
        let body = self.build_body(texts, query);

        debug!(
            "Sending {} lines to {} ({})",
            texts.len(),
            self.config.model.model,
            self.config.model.provider
        );

        let response = self
            .client
            .post(&self.config.api_endpoint)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TranslationError::TimeoutError
                } else {
                    TranslationError::NetworkError {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let error_text = response.text().await.unwrap_or_default();

            return Err(TranslationError::ServiceError {
                status: status_code,
                message: error_text,
            });
        }

        let json: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| TranslationError::InvalidResponseError {
                    message: e.to_string(),
                })?;

        let translated = self.extract_text(&json)?;
        Ok(split_response(&translated, texts.len()))
    }

    fn for_model(&self, model: &ModelConfig) -> Option<Arc<dyn Translator>> {
        debug!("Per-call model override: {}/{}", model.provider, model.model);
        Some(Arc::new(self.with_model(model.clone())))
    }
}

/// Split a model answer into lines, keeping at most `expected` of them
pub fn split_response(text: &str, expected: usize) -> Vec<String> {
    text.split('\n')
        .take(expected)
        .map(|line| line.to_string())
        .collect()
}

/// Translator that returns its input unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoTranslator;

#[async_trait]
impl Translator for EchoTranslator {
    async fn translate_lines(
        &self,
        texts: &[String],
        _query: &str,
        _timeout: Duration,
    ) -> Result<Vec<String>> {
        Ok(texts.to_vec())
    }
}
