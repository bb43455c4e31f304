//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output MIME type of a translated document
pub const MARKDOWN_MIME: &str = "text/markdown";

/// Fixed file name of the translated document
pub const OUTPUT_FILE_NAME: &str = "translated.md";

/// Invocation mode of the language model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelMode {
    /// Chat completion with system and user messages
    #[default]
    Chat,
    /// Plain text completion with a single prompt
    Completion,
}

impl fmt::Display for ModelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelMode::Chat => write!(f, "chat"),
            ModelMode::Completion => write!(f, "completion"),
        }
    }
}

impl FromStr for ModelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chat" => Ok(ModelMode::Chat),
            "completion" => Ok(ModelMode::Completion),
            other => Err(format!("unknown model mode: {}", other)),
        }
    }
}

/// Translation model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider name, e.g. `openai` or `deepseek`
    pub provider: String,
    /// Model identifier sent in the request body
    pub model: String,
    /// Chat or completion invocation
    #[serde(default)]
    pub mode: ModelMode,
    /// Free-form parameters merged into every request body
    #[serde(default)]
    pub completion_params: serde_json::Map<String, serde_json::Value>,
}

impl ModelConfig {
    /// Chat-mode model with no extra parameters
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            mode: ModelMode::Chat,
            completion_params: serde_json::Map::new(),
        }
    }

    /// Set the invocation mode
    pub fn with_mode(mut self, mode: ModelMode) -> Self {
        self.mode = mode;
        self
    }

    /// Add a completion parameter
    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.completion_params.insert(key.into(), value);
        self
    }
}

/// A file handed to the processor by its host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Name given by the uploader, if any
    pub file_name: Option<String>,
    /// Raw file bytes
    pub blob: Vec<u8>,
}

impl UploadedFile {
    /// Anonymous file with the given bytes
    pub fn new(blob: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: None,
            blob: blob.into(),
        }
    }

    /// Attach the uploader's file name
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }
}

/// Parameters of a single document invocation
#[derive(Debug, Clone, Default)]
pub struct ToolParameters {
    /// The Markdown file; `None` when nothing usable was uploaded
    pub md_file: Option<UploadedFile>,
    /// Free-text steering instructions for the model
    pub query: String,
    /// Model to use for this call instead of the configured one
    pub trans_model: Option<ModelConfig>,
}

/// The translated document produced by one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputDocument {
    /// UTF-8 document bytes
    pub data: Vec<u8>,
    /// Always `text/markdown`
    pub mime_type: String,
    /// Always `translated.md`
    pub file_name: String,
}

impl OutputDocument {
    /// Wrap translated Markdown text
    pub fn markdown(text: String) -> Self {
        Self {
            data: text.into_bytes(),
            mime_type: MARKDOWN_MIME.to_string(),
            file_name: OUTPUT_FILE_NAME.to_string(),
        }
    }
}

/// A message emitted by an invocation, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolMessage {
    /// Human-readable status or failure text
    Text(String),
    /// The terminal document
    Blob(OutputDocument),
}

impl ToolMessage {
    /// The text of a status message, `None` for the document
    pub fn text(&self) -> Option<&str> {
        match self {
            ToolMessage::Text(t) => Some(t.as_str()),
            ToolMessage::Blob(_) => None,
        }
    }
}
