//! Translation unit discovery

use std::collections::HashMap;
use std::fmt;

use crate::processors::segment::Segment;

/// Identifier of one translatable unit, unique within an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u64);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// Hands out fresh identifiers
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    /// Start counting at `u0`
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next identifier
    pub fn next_id(&mut self) -> UnitId {
        let id = UnitId(self.next);
        self.next += 1;
        id
    }
}

/// A source string submitted for translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    /// Identifier used to map the translation back
    pub id: UnitId,
    /// Text sent to the model
    pub source: String,
}

/// Translated strings by unit identifier
pub type Translations = HashMap<UnitId, String>;

/// Where each unit lives in the document, plus the ordered batch to translate
#[derive(Debug, Default)]
pub struct DocumentIndex {
    /// (segment position, line position) of non-blank text lines
    pub text_index: HashMap<(usize, usize), UnitId>,
    /// Segment position of media lines
    pub media_index: HashMap<usize, UnitId>,
    /// Units in discovery order
    pub batch: Vec<TranslationUnit>,
}

impl DocumentIndex {
    /// Number of units to translate
    pub fn len(&self) -> usize {
        self.batch.len()
    }

    /// Whether the document has nothing to translate
    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }
}

/// Assign identifiers to every translatable unit in `segments`
///
/// Identical strings at different positions get independent units.
pub fn build_index(segments: &[Segment]) -> DocumentIndex {
    let mut ids = IdGenerator::new();
    let mut index = DocumentIndex::default();

    for (seg_idx, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Text { lines, .. } => {
                for (line_idx, line) in lines.iter().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let id = ids.next_id();
                    index.text_index.insert((seg_idx, line_idx), id);
                    index.batch.push(TranslationUnit {
                        id,
                        source: line.clone(),
                    });
                }
            }
            Segment::Media { line, .. } => {
                let id = ids.next_id();
                index.media_index.insert(seg_idx, id);
                index.batch.push(TranslationUnit {
                    id,
                    source: line.alt_text.clone(),
                });
            }
            Segment::Code { .. } => {}
        }
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::segment::segment;
    use std::collections::HashSet;

    #[test]
    fn test_index_order_and_kinds() {
        let segments = segment("# Title\n\nHello\n```\nskip me\n```\n[Docs](https://x.y)\nBye");
        let index = build_index(&segments);

        let sources: Vec<&str> = index.batch.iter().map(|u| u.source.as_str()).collect();
        assert_eq!(sources, vec!["# Title", "Hello", "Docs", "Bye"]);

        assert_eq!(index.text_index.len(), 3);
        assert_eq!(index.media_index.len(), 1);
        assert_eq!(index.media_index[&2], index.batch[2].id);
        assert_eq!(index.text_index[&(0, 2)], index.batch[1].id);
        assert!(!index.text_index.contains_key(&(0, 1)));
    }

    #[test]
    fn test_identical_lines_get_distinct_ids() {
        let segments = segment("same\nsame\nsame");
        let index = build_index(&segments);

        let ids: HashSet<UnitId> = index.batch.iter().map(|u| u.id).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_every_indexed_id_is_batched_once() {
        let segments = segment("a\n![b](c)\n\nd\n```\ne\n```\n[f](g)");
        let index = build_index(&segments);

        let batched: Vec<UnitId> = index.batch.iter().map(|u| u.id).collect();
        let mut indexed: Vec<UnitId> = index
            .text_index
            .values()
            .chain(index.media_index.values())
            .copied()
            .collect();
        indexed.sort();

        let mut sorted = batched.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), batched.len());
        assert_eq!(indexed, sorted);
    }

    #[test]
    fn test_code_only_document_is_empty() {
        let index = build_index(&segment("```\nlet x = 1;\n```"));
        assert!(index.is_empty());
    }

    #[test]
    fn test_unit_id_display() {
        let mut ids = IdGenerator::new();
        ids.next_id();
        assert_eq!(ids.next_id().to_string(), "u1");
    }
}
