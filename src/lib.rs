//! mdtrans - line-oriented Markdown translation
//!
//! Splits a Markdown document into prose, fenced code and link/image lines,
//! sends the translatable strings to a language model in bounded chunks, and
//! splices the answers back without touching code blocks or link targets.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod core;
pub mod processors;
pub mod server;

// Re-export key types for convenience
pub use crate::core::{
    client::{EchoTranslator, LlmTranslator, Translator},
    config::TranslatorConfig,
    errors::TranslationError,
    models::{ModelConfig, ModelMode, OutputDocument, ToolMessage, ToolParameters, UploadedFile},
};

pub use crate::processors::{
    batch::{translate_all, BatchOptions},
    index::{build_index, DocumentIndex, TranslationUnit, Translations, UnitId},
    markdown::MarkdownProcessor,
    reassemble::reassemble,
    segment::{segment, MediaLine, Segment, Segmenter},
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
