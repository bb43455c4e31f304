//! Line-oriented Markdown segmentation
//!
//! A document is split into [`Segment`]s: runs of prose lines, fenced code
//! blocks kept verbatim, and whole-line link or image references whose alt
//! text is the only translatable part.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Opening fence: three backticks after optional indentation, optional language tag
const FENCE_OPEN: &str = r"^\s*```(\w*)";

/// Whole-line link or image: `[alt](target)` or `![alt](target)`
const MEDIA_LINE: &str = r"(?s)^(\s*)(!?\[)(\s*)(.*?)(\s*)(\])(\s*\(\s*(.*?)\s*\)\s*)$";

/// A link or image line split into its verbatim components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLine {
    /// The full original line
    pub raw: String,
    /// Whitespace before the opener
    pub leading: String,
    /// `[` or `![`
    pub opener: String,
    /// Whitespace between the opener and the alt text
    pub inner_before: String,
    /// Alt text as captured
    pub alt_raw: String,
    /// Whitespace between the alt text and `]`
    pub inner_after: String,
    /// `]`
    pub closer: String,
    /// The whole `(...)` clause with surrounding whitespace
    pub target_clause: String,
    /// Link target inside the parentheses
    pub target: String,
    /// Trimmed alt text, the translatable part
    pub alt_text: String,
}

impl MediaLine {
    /// Rebuild the line with `alt` in place of the alt text
    pub fn with_alt(&self, alt: &str) -> String {
        format!(
            "{}{}{}{}{}{}{}",
            self.leading,
            self.opener,
            self.inner_before,
            alt,
            self.inner_after,
            self.closer,
            self.target_clause
        )
    }

    /// Whether the line is an image (`![...]`) rather than a link
    pub fn is_image(&self) -> bool {
        self.opener.starts_with('!')
    }
}

/// A classified, contiguous run of document lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Prose lines, blank lines included
    Text {
        /// Lines in document order
        lines: Vec<String>,
        /// Index of the first line in the document
        start_line: usize,
    },
    /// A fenced block including both delimiter lines
    Code {
        /// Lines including the fences
        lines: Vec<String>,
        /// Info string of the opening fence, if any
        language: Option<String>,
        /// Index of the opening fence in the document
        start_line: usize,
    },
    /// A single link or image line
    Media {
        /// The parsed line
        line: MediaLine,
        /// Index of the line in the document
        start_line: usize,
    },
}

impl Segment {
    /// Line index in the source document where this segment begins
    pub fn start_line(&self) -> usize {
        match self {
            Segment::Text { start_line, .. }
            | Segment::Code { start_line, .. }
            | Segment::Media { start_line, .. } => *start_line,
        }
    }

    /// The original lines covered by this segment
    pub fn source_lines(&self) -> Vec<&str> {
        match self {
            Segment::Text { lines, .. } | Segment::Code { lines, .. } => {
                lines.iter().map(String::as_str).collect()
            }
            Segment::Media { line, .. } => vec![line.raw.as_str()],
        }
    }

    /// Short name of the segment kind
    pub fn kind(&self) -> &'static str {
        match self {
            Segment::Text { .. } => "text",
            Segment::Code { .. } => "code",
            Segment::Media { .. } => "media",
        }
    }
}

/// Compiled patterns for segmentation
#[derive(Debug, Clone)]
pub struct Segmenter {
    fence_open: Regex,
    media: Regex,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmenter {
    /// Compile the segmentation patterns
    pub fn new() -> Self {
        Self {
            fence_open: Regex::new(FENCE_OPEN).expect("fence pattern is valid"),
            media: Regex::new(MEDIA_LINE).expect("media pattern is valid"),
        }
    }

    /// Split `content` into segments
    pub fn segment(&self, content: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        let mut pending_start = 0;
        let mut in_fence = false;

        for (line_num, line) in content.split('\n').enumerate() {
            if !in_fence {
                if let Some(caps) = self.fence_open.captures(line) {
                    flush_text(&mut segments, &mut pending, pending_start);
                    let language = caps
                        .get(1)
                        .map(|m| m.as_str())
                        .filter(|tag| !tag.is_empty())
                        .map(str::to_string);
                    segments.push(Segment::Code {
                        lines: vec![line.to_string()],
                        language,
                        start_line: line_num,
                    });
                    in_fence = true;
                    continue;
                }
            } else {
                if let Some(Segment::Code { lines, .. }) = segments.last_mut() {
                    lines.push(line.to_string());
                }
                if line.trim() == "```" {
                    in_fence = false;
                }
                continue;
            }

            if let Some(media) = self.parse_media(line) {
                flush_text(&mut segments, &mut pending, pending_start);
                segments.push(Segment::Media {
                    line: media,
                    start_line: line_num,
                });
                continue;
            }

            if pending.is_empty() {
                pending_start = line_num;
            }
            pending.push(line.to_string());
        }

        flush_text(&mut segments, &mut pending, pending_start);

        if in_fence {
            debug!("Document ends inside an unterminated code fence");
        }

        segments
    }

    /// Match a whole line as a link or image reference
    pub fn parse_media(&self, line: &str) -> Option<MediaLine> {
        let caps = self.media.captures(line)?;
        let group = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or("").to_string();

        let alt_raw = group(4);
        Some(MediaLine {
            raw: line.to_string(),
            leading: group(1),
            opener: group(2),
            inner_before: group(3),
            alt_text: alt_raw.trim().to_string(),
            alt_raw,
            inner_after: group(5),
            closer: group(6),
            target_clause: group(7),
            target: group(8),
        })
    }
}

fn flush_text(segments: &mut Vec<Segment>, pending: &mut Vec<String>, start_line: usize) {
    if pending.is_empty() {
        return;
    }
    segments.push(Segment::Text {
        lines: std::mem::take(pending),
        start_line,
    });
}

/// Split `content` into segments using a shared [`Segmenter`]
pub fn segment(content: &str) -> Vec<Segment> {
    static SEGMENTER: OnceLock<Segmenter> = OnceLock::new();
    SEGMENTER.get_or_init(Segmenter::new).segment(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flatten(segments: &[Segment]) -> Vec<String> {
        segments
            .iter()
            .flat_map(|s| s.source_lines())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_text_code_media_sequence() {
        let doc = "# Title\nHello world\n```python\nprint(\"hi\")\n```\n![cat](cat.png)";
        let segments = segment(doc);

        assert_eq!(segments.len(), 3);
        assert!(matches!(&segments[0], Segment::Text { lines, start_line: 0 } if lines.len() == 2));
        match &segments[1] {
            Segment::Code {
                lines,
                language,
                start_line,
            } => {
                assert_eq!(lines.len(), 3);
                assert_eq!(language.as_deref(), Some("python"));
                assert_eq!(*start_line, 2);
            }
            other => panic!("expected code, got {:?}", other),
        }
        match &segments[2] {
            Segment::Media { line, start_line } => {
                assert_eq!(line.alt_text, "cat");
                assert_eq!(line.target, "cat.png");
                assert!(line.is_image());
                assert_eq!(*start_line, 5);
            }
            other => panic!("expected media, got {:?}", other),
        }
    }

    #[test]
    fn test_segmentation_is_total() {
        let doc = "intro\n\n  [docs]( https://example.com )\n```\ncode\n```\n\ntail\n";
        let segments = segment(doc);

        let original: Vec<String> = doc.split('\n').map(str::to_string).collect();
        assert_eq!(flatten(&segments), original);
    }

    #[test]
    fn test_unterminated_fence_absorbs_rest() {
        let doc = "before\n```rust\nfn main() {}\n![img](a.png)\nmore text";
        let segments = segment(doc);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].kind(), "text");
        match &segments[1] {
            Segment::Code { lines, .. } => assert_eq!(lines.len(), 4),
            other => panic!("expected code, got {:?}", other),
        }
    }

    #[test]
    fn test_fence_with_language_inside_block_does_not_close() {
        let doc = "```\n```js\n```\nafter";
        let segments = segment(doc);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].source_lines(), vec!["```", "```js", "```"]);
        assert_eq!(segments[1].source_lines(), vec!["after"]);
    }

    #[test]
    fn test_indented_fence_closes() {
        let doc = "  ```\n  x\n  ```  \ntext";
        let segments = segment(doc);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].kind(), "text");
    }

    #[test]
    fn test_media_must_span_whole_line() {
        let segments = segment("see ![alt](x) here");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind(), "text");
    }

    #[test]
    fn test_link_components_preserved() {
        let segmenter = Segmenter::new();
        let line = "  [  Read more  ] ( ./docs/guide.md )  ";
        let media = segmenter.parse_media(line).unwrap();

        assert_eq!(media.leading, "  ");
        assert_eq!(media.opener, "[");
        assert_eq!(media.inner_before, "  ");
        assert_eq!(media.alt_text, "Read more");
        assert_eq!(media.inner_after, "  ");
        assert_eq!(media.target_clause, " ( ./docs/guide.md )  ");
        assert_eq!(media.target, "./docs/guide.md");
        assert!(!media.is_image());
        assert_eq!(media.with_alt(&media.alt_text), line);
        assert_eq!(
            media.with_alt("Mehr lesen"),
            "  [  Mehr lesen  ] ( ./docs/guide.md )  "
        );
    }

    #[test]
    fn test_blank_lines_stay_in_text() {
        let segments = segment("a\n\n   \nb");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].source_lines(), vec!["a", "", "   ", "b"]);
    }

    #[test]
    fn test_text_start_line_after_media() {
        let segments = segment("![x](y)\nline one\nline two");
        assert_eq!(segments[1].start_line(), 1);
    }

    #[test]
    fn test_empty_document() {
        let segments = segment("");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].source_lines(), vec![""]);
    }
}
