//! Rebuild a document from its segments and translated units

use crate::processors::index::{DocumentIndex, Translations};
use crate::processors::segment::Segment;

/// Serialize `segments`, substituting translated units by identifier
///
/// Untranslated units keep their original text, so an empty `translations`
/// map reproduces the source document.
pub fn reassemble(segments: &[Segment], index: &DocumentIndex, translations: &Translations) -> String {
    reassemble_with_progress(segments, index, translations, &mut |_, _| {})
}

/// Like [`reassemble`], calling `on_segment(position, total)` after each segment
pub fn reassemble_with_progress(
    segments: &[Segment],
    index: &DocumentIndex,
    translations: &Translations,
    on_segment: &mut (dyn FnMut(usize, usize) + Send),
) -> String {
    let mut output: Vec<String> = Vec::with_capacity(segments.len());

    for (seg_idx, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Code { lines, .. } => {
                output.extend(lines.iter().cloned());
            }
            Segment::Media { line, .. } => {
                let translated = index
                    .media_index
                    .get(&seg_idx)
                    .and_then(|id| translations.get(id));
                match translated {
                    Some(alt) => output.push(line.with_alt(alt)),
                    None => output.push(line.raw.clone()),
                }
            }
            Segment::Text { lines, .. } => {
                let rebuilt: Vec<&str> = lines
                    .iter()
                    .enumerate()
                    .map(|(line_idx, line)| {
                        index
                            .text_index
                            .get(&(seg_idx, line_idx))
                            .and_then(|id| translations.get(id))
                            .map(String::as_str)
                            .unwrap_or(line.as_str())
                    })
                    .collect();
                output.push(rebuilt.join("\n"));
            }
        }

        on_segment(seg_idx, segments.len());
    }

    output.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::index::build_index;
    use crate::processors::segment::segment;

    fn identity(index: &DocumentIndex) -> Translations {
        index
            .batch
            .iter()
            .map(|unit| (unit.id, unit.source.clone()))
            .collect()
    }

    const DOC: &str = "# Heading\n\nSome prose.\n  ![ A cat ]( img/cat.png \"title\" )\n```sh\necho hi\n```\n\n[link](https://x.y)\ntrailing\n";

    #[test]
    fn test_identity_roundtrip() {
        let segments = segment(DOC);
        let index = build_index(&segments);

        assert_eq!(reassemble(&segments, &index, &identity(&index)), DOC);
    }

    #[test]
    fn test_no_translations_roundtrip() {
        let segments = segment(DOC);
        let index = build_index(&segments);

        assert_eq!(reassemble(&segments, &index, &Translations::new()), DOC);
    }

    #[test]
    fn test_media_only_alt_text_replaced() {
        let segments = segment("  ![ A cat ]( img/cat.png )");
        let index = build_index(&segments);
        let mut translations = Translations::new();
        translations.insert(index.batch[0].id, "Eine Katze".to_string());

        assert_eq!(
            reassemble(&segments, &index, &translations),
            "  ![ Eine Katze ]( img/cat.png )"
        );
    }

    #[test]
    fn test_partial_translation_falls_back() {
        let segments = segment("one\n\ntwo\nthree");
        let index = build_index(&segments);
        let mut translations = Translations::new();
        translations.insert(index.batch[0].id, "eins".to_string());
        translations.insert(index.batch[2].id, "drei".to_string());

        assert_eq!(
            reassemble(&segments, &index, &translations),
            "eins\n\ntwo\ndrei"
        );
    }

    #[test]
    fn test_code_block_verbatim() {
        let segments = segment("```\nsecret\n```");
        let index = build_index(&segments);

        assert_eq!(reassemble(&segments, &index, &Translations::new()), "```\nsecret\n```");
    }

    #[test]
    fn test_progress_called_per_segment() {
        let segments = segment("a\n```\nb\n```\n[c](d)");
        let index = build_index(&segments);
        let mut seen = Vec::new();
        reassemble_with_progress(&segments, &index, &Translations::new(), &mut |i, n| {
            seen.push((i, n))
        });

        assert_eq!(seen, vec![(0, 3), (1, 3), (2, 3)]);
    }
}
