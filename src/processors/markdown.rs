//! Markdown document translation pipeline

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::core::client::{LlmTranslator, Translator};
use crate::core::config::{TranslatorConfig, DEFAULT_CHUNK_SIZE, DEFAULT_TIMEOUT_MS};
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{ModelConfig, OutputDocument, ToolMessage, ToolParameters};
use crate::processors::batch::{translate_all, BatchOptions};
use crate::processors::index::build_index;
use crate::processors::reassemble::reassemble_with_progress;
use crate::processors::segment::segment;

/// Segments reported between two reassembly progress messages
const PROGRESS_EVERY: usize = 10;

/// Markdown processor that preserves code blocks and links
#[derive(Debug, Clone)]
pub struct MarkdownProcessor {
    translator: Arc<dyn Translator>,
    chunk_size: usize,
    timeout: Duration,
}

impl MarkdownProcessor {
    /// Create a new markdown processor
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self {
            translator,
            chunk_size: DEFAULT_CHUNK_SIZE,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Set the number of units per request
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create from a translator configuration
    pub fn from_config(config: TranslatorConfig) -> Result<Self> {
        let chunk_size = config.chunk_size;
        let timeout = config.timeout();
        let translator = LlmTranslator::new(config)?;
        Ok(Self::new(Arc::new(translator))
            .with_chunk_size(chunk_size)
            .with_timeout(timeout))
    }

    /// Create from environment configuration
    pub fn from_env() -> Result<Self> {
        let config = TranslatorConfig::load()?;
        Self::from_config(config)
    }

    /// Run one invocation, reporting every outcome as messages on `tx`
    ///
    /// Never fails: errors become a final text message and no document is sent.
    pub async fn invoke(&self, params: ToolParameters, tx: &UnboundedSender<ToolMessage>) {
        let mut report = |msg: String| {
            debug!("{}", msg);
            let _ = tx.send(ToolMessage::Text(msg));
        };

        match self.run(params, &mut report).await {
            Ok(Some(document)) => {
                info!("Produced {} ({} bytes)", document.file_name, document.data.len());
                let _ = tx.send(ToolMessage::Blob(document));
            }
            Ok(None) => {}
            Err(e) if e.is_chunk_failure() => {
                warn!("{}", e);
                let _ = tx.send(ToolMessage::Text(e.to_string()));
            }
            Err(e) => {
                warn!("Processing failed: {}", e);
                let _ = tx.send(ToolMessage::Text(format!("Processing failed: {}", e)));
            }
        }
    }

    /// Validate the uploaded file and translate it
    ///
    /// Returns `Ok(None)` when the document is empty.
    async fn run(
        &self,
        params: ToolParameters,
        report: &mut (dyn FnMut(String) + Send),
    ) -> Result<Option<OutputDocument>> {
        let file = params
            .md_file
            .ok_or_else(|| TranslationError::invalid_input("Please upload a Markdown file"))?;
        info!(
            "Received {} ({} bytes)",
            file.file_name.as_deref().unwrap_or("unnamed upload"),
            file.blob.len()
        );

        let translator = self.translator_for(params.trans_model.as_ref())?;

        let content = String::from_utf8(file.blob)
            .map_err(|e| TranslationError::invalid_input(format!("File is not valid UTF-8: {}", e)))?;

        if content.trim().is_empty() {
            report("File content is empty".to_string());
            return Ok(None);
        }
        report("File read successfully".to_string());

        let translated = self
            .translate_with_progress(translator.as_ref(), &content, &params.query, report)
            .await?;
        Ok(Some(OutputDocument::markdown(translated)))
    }

    /// The configured translator, or one bound to `model` when given
    fn translator_for(&self, model: Option<&ModelConfig>) -> Result<Arc<dyn Translator>> {
        let Some(model) = model else {
            return Ok(self.translator.clone());
        };
        if model.model.trim().is_empty() {
            return Err(TranslationError::ConfigError {
                message: "trans_model.model is required".to_string(),
            });
        }

        match self.translator.for_model(model) {
            Some(translator) => {
                info!("Using model {} ({}) for this call", model.model, model.provider);
                Ok(translator)
            }
            None => {
                warn!("Translator cannot switch models, ignoring {}", model.model);
                Ok(self.translator.clone())
            }
        }
    }

    /// Translate Markdown content
    pub async fn translate_content(&self, content: &str, query: &str) -> Result<String> {
        self.translate_with_progress(self.translator.as_ref(), content, query, &mut |msg| {
            debug!("{}", msg)
        })
        .await
    }

    async fn translate_with_progress(
        &self,
        translator: &dyn Translator,
        content: &str,
        query: &str,
        report: &mut (dyn FnMut(String) + Send),
    ) -> Result<String> {
        let segments = segment(content);
        report("[progress] Markdown parsing complete".to_string());

        let index = build_index(&segments);
        debug!(
            "{} segments, {} text lines, {} media lines",
            segments.len(),
            index.text_index.len(),
            index.media_index.len()
        );

        let options = BatchOptions {
            chunk_size: self.chunk_size,
            query: query.to_string(),
            timeout: self.timeout,
        };
        let translations = translate_all(&index.batch, translator, &options, &mut |range| {
            report(format!(
                "[progress] Translating lines {}-{}",
                range.start + 1,
                range.end
            ))
        })
        .await?;
        report("[progress] Translation complete, rebuilding document".to_string());

        let output = reassemble_with_progress(&segments, &index, &translations, &mut |pos, total| {
            if pos % PROGRESS_EVERY == 0 {
                report(format!("[progress] Processed {}/{} segments", pos + 1, total));
            }
        });

        Ok(output)
    }

    /// Find Markdown files in directory
    pub fn find_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(TranslationError::FileError {
                path: dir.display().to_string(),
                message: "Not a directory".to_string(),
            });
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && is_markdown_file(&path) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Find Markdown files recursively
    pub fn find_files_recursive(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(TranslationError::FileError {
                path: dir.display().to_string(),
                message: "Not a directory".to_string(),
            });
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && is_markdown_file(path) {
                files.push(path.to_path_buf());
            }
        }

        Ok(files)
    }

    /// Translate a single Markdown file
    pub async fn translate_file(&self, input: &Path, output: &Path, query: &str) -> Result<()> {
        debug!("Translating: {}", input.display());

        let content = tokio::fs::read_to_string(input)
            .await
            .map_err(|e| TranslationError::FileError {
                path: input.display().to_string(),
                message: e.to_string(),
            })?;

        let translated = if content.trim().is_empty() {
            info!("Nothing to translate in {}, copying as is", input.display());
            content
        } else {
            self.translate_content(&content, query).await?
        };

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| TranslationError::FileError {
                        path: parent.display().to_string(),
                        message: e.to_string(),
                    })?;
            }
        }

        tokio::fs::write(output, translated)
            .await
            .map_err(|e| TranslationError::FileError {
                path: output.display().to_string(),
                message: e.to_string(),
            })?;

        info!("Translated: {} -> {}", input.display(), output.display());
        Ok(())
    }
}

/// Check if file is Markdown
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            ext == "md" || ext == "markdown"
        })
        .unwrap_or(false)
}
