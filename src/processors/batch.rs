//! Chunked submission of translation units

use std::ops::Range;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::client::Translator;
use crate::core::config::{DEFAULT_CHUNK_SIZE, DEFAULT_TIMEOUT_MS};
use crate::core::errors::{Result, TranslationError};
use crate::processors::index::{TranslationUnit, Translations};

/// How units are grouped and sent
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Units per request; 0 is treated as 1
    pub chunk_size: usize,
    /// Steering instructions passed with every chunk
    pub query: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            query: String::new(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// Translate `batch` chunk by chunk, sequentially
///
/// `on_chunk` is called with the unit range of each chunk before it is sent.
/// Any failing chunk aborts the run. A short answer leaves the trailing units
/// of that chunk unmapped; extra answer lines are ignored.
pub async fn translate_all<T>(
    batch: &[TranslationUnit],
    translator: &T,
    options: &BatchOptions,
    on_chunk: &mut (dyn FnMut(Range<usize>) + Send),
) -> Result<Translations>
where
    T: Translator + ?Sized,
{
    let chunk_size = options.chunk_size.max(1);
    let mut translations = Translations::with_capacity(batch.len());

    for (chunk_idx, chunk) in batch.chunks(chunk_size).enumerate() {
        let start = chunk_idx * chunk_size;
        let range = start..start + chunk.len();
        on_chunk(range.clone());

        let texts: Vec<String> = chunk.iter().map(|unit| unit.source.clone()).collect();

        let translated = translator
            .translate_lines(&texts, &options.query, options.timeout)
            .await
            .map_err(|e| TranslationError::ChunkFailure {
                first: range.start + 1,
                last: range.end,
                source: Box::new(e),
            })?;

        if translated.len() != texts.len() {
            warn!(
                "Chunk {}-{}: expected {} lines, got {}",
                range.start + 1,
                range.end,
                texts.len(),
                translated.len()
            );
        }

        translations.extend(
            chunk
                .iter()
                .zip(translated)
                .map(|(unit, text)| (unit.id, text)),
        );
    }

    debug!("Translated {}/{} units", translations.len(), batch.len());
    Ok(translations)
}
