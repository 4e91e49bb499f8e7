//! Document selector/combiner: turn a tender's documents into one bounded
//! text blob for the LLM prompt.

use std::collections::HashSet;

use tenderlens_shared::{Category, ChunkingResult, DocumentPayload, DocumentSet, ProcessingConfig};

use crate::taxonomy::CRITERIA_SPECS;

/// Separator between chunks and between whole files.
pub const CHUNK_SEPARATOR: &str = "\n\n---\n\n";

/// Divider between the relevant-chunk preamble and the whole-file text.
pub const SECTION_DIVIDER: &str = "\n\n==========\n\n";

/// Build the combined context text for one tender.
///
/// Pre-joined payloads pass through unchanged. For per-file payloads the
/// relevance pipeline runs first; when it yields enough unique chunks the
/// result is chunks only, otherwise the largest files are appended as a
/// fallback. Output is deterministic for identical input content and
/// ordering. No overall length cap is applied; the model's own input
/// ceiling is the final guard.
pub fn combine(payload: &DocumentPayload, config: &ProcessingConfig) -> String {
    match payload {
        DocumentPayload::Combined(text) => text.clone(),
        DocumentPayload::Files(files) => combine_files(files, config),
    }
}

fn combine_files(files: &DocumentSet, config: &ProcessingConfig) -> String {
    if files.is_empty() {
        return String::new();
    }

    let analysis = crate::analyze(files, config.context_size);
    let unique_chunks = collect_unique_chunks(&analysis);
    let top = config.top_files_to_use;

    // Enough relevant chunks: use twice as many chunks as we would files.
    if unique_chunks.len() >= top {
        tracing::debug!(chunks = unique_chunks.len(), "using relevant chunks only");
        let take = (top * 2).min(unique_chunks.len());
        return unique_chunks[..take].join(CHUNK_SEPARATOR);
    }

    tracing::debug!(
        chunks = unique_chunks.len(),
        files = files.len(),
        "insufficient relevant chunks, supplementing with whole files"
    );

    if files.len() > config.max_files_to_process {
        // Keep only the largest files, by raw character length descending.
        let mut by_size: Vec<(usize, &str)> = files
            .values()
            .map(|text| (text.chars().count(), text.as_str()))
            .collect();
        by_size.sort_by(|a, b| b.0.cmp(&a.0));

        let file_text = by_size
            .iter()
            .take(top)
            .map(|(_, text)| *text)
            .collect::<Vec<_>>()
            .join(CHUNK_SEPARATOR);

        prepend_chunks(&unique_chunks[..top.min(unique_chunks.len())], file_text)
    } else {
        let file_text = files
            .values()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(CHUNK_SEPARATOR);

        prepend_chunks(&unique_chunks, file_text)
    }
}

/// Flatten chunk and criteria texts into one ordered, exact-deduplicated list.
///
/// Category chunks come first in the fixed selection order (`other` is
/// excluded), followed by criteria sections in canonical criteria order.
fn collect_unique_chunks(analysis: &ChunkingResult) -> Vec<&str> {
    let mut candidates: Vec<&str> = Vec::new();

    for category in Category::SELECTABLE {
        if let Some(chunks) = analysis.categorized_chunks.get(&category) {
            candidates.extend(chunks.iter().map(|c| c.text.as_str()));
        }
    }

    for spec in &CRITERIA_SPECS {
        if let Some(sections) = analysis.specific_criteria.get(spec.key) {
            candidates.extend(sections.iter().map(|s| s.text.as_str()));
        }
    }

    let mut seen = HashSet::new();
    candidates.into_iter().filter(|text| seen.insert(*text)).collect()
}

/// Put the relevant chunks ahead of the whole-file text, if there are any.
fn prepend_chunks(chunks: &[&str], file_text: String) -> String {
    if chunks.is_empty() {
        return file_text;
    }
    let chunk_text = chunks.join(CHUNK_SEPARATOR);
    format!("{chunk_text}{SECTION_DIVIDER}{file_text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProcessingConfig {
        ProcessingConfig {
            max_files_to_process: 5,
            top_files_to_use: 5,
            context_size: 500,
        }
    }

    fn doc_set(entries: &[(&str, &str)]) -> DocumentSet {
        entries
            .iter()
            .map(|(name, text)| (name.to_string(), text.to_string()))
            .collect()
    }

    #[test]
    fn empty_set_combines_to_empty_string() {
        let payload = DocumentPayload::Files(DocumentSet::new());
        assert_eq!(combine(&payload, &config()), "");
    }

    #[test]
    fn pre_joined_text_passes_through() {
        let payload = DocumentPayload::Combined("already combined".into());
        assert_eq!(combine(&payload, &config()), "already combined");
    }

    #[test]
    fn fallback_picks_largest_files_in_descending_order() {
        // Six keyword-free documents of strictly increasing size: no chunks
        // survive (each is under the 100-char document floor), so the five
        // largest whole files win, largest first.
        let d10 = "a".repeat(10);
        let d20 = "b".repeat(20);
        let d30 = "c".repeat(30);
        let d40 = "d".repeat(40);
        let d50 = "e".repeat(50);
        let d60 = "f".repeat(60);
        let payload = DocumentPayload::Files(doc_set(&[
            ("f1.txt", &d10),
            ("f2.txt", &d20),
            ("f3.txt", &d30),
            ("f4.txt", &d40),
            ("f5.txt", &d50),
            ("f6.txt", &d60),
        ]));

        let combined = combine(&payload, &config());
        let expected = [d60, d50, d40, d30, d20].join(CHUNK_SEPARATOR);
        assert_eq!(combined, expected);
    }

    #[test]
    fn enough_chunks_skips_whole_file_fallback() {
        // Five classifiable paragraphs in one document: the combined text is
        // exactly those chunks, never raw file joins.
        let paragraphs: Vec<String> = (1..=5)
            .map(|i| {
                format!(
                    "Clause {i}: the technical qualification requirement number {i} \
demands proof of equivalent completed assignments from each bidder."
                )
            })
            .collect();
        let text = paragraphs.join("\n\n");
        let payload = DocumentPayload::Files(doc_set(&[("quals.txt", &text)]));

        let combined = combine(&payload, &config());
        let expected = paragraphs.join(CHUNK_SEPARATOR);
        assert_eq!(combined, expected);
        assert!(!combined.contains(SECTION_DIVIDER));
    }

    #[test]
    fn chunk_list_is_capped_at_twice_top_files() {
        let paragraphs: Vec<String> = (1..=14)
            .map(|i| {
                format!(
                    "Clause {i:02}: the technical qualification requirement number {i:02} \
demands proof of equivalent completed assignments from each bidder."
                )
            })
            .collect();
        let text = paragraphs.join("\n\n");
        let payload = DocumentPayload::Files(doc_set(&[("quals.txt", &text)]));

        let combined = combine(&payload, &config());
        let expected = paragraphs[..10].join(CHUNK_SEPARATOR);
        assert_eq!(combined, expected);
    }

    #[test]
    fn few_chunks_are_prepended_to_all_files() {
        // One relevant paragraph, three files: chunks first, divider, then
        // every file in document-set order.
        let relevant = "The earnest money deposit shall be two percent of the estimated \
cost and shall accompany the technical bid envelope.";
        let filler_a = "General submission instructions for bidders, covering envelope \
markings, signatures, and page numbering requirements in detail.";
        let filler_b = "Schedule of quantities and the applicable measurement rules for \
all items of work included in this contract package.";
        let payload = DocumentPayload::Files(doc_set(&[
            ("a.txt", filler_a),
            ("b.txt", filler_b),
            ("c.txt", relevant),
        ]));

        let combined = combine(&payload, &config());
        let divider_pos = combined.find(SECTION_DIVIDER).expect("divider present");
        let (chunk_part, file_part) = combined.split_at(divider_pos);

        assert!(chunk_part.contains("earnest money deposit"));
        let expected_files = [filler_a, filler_b, relevant].join(CHUNK_SEPARATOR);
        assert_eq!(&file_part[SECTION_DIVIDER.len()..], expected_files);
    }

    #[test]
    fn output_is_deterministic() {
        let text = "The earnest money deposit shall be two percent of the estimated \
cost and shall accompany the technical bid envelope.";
        let payload = DocumentPayload::Files(doc_set(&[("doc.txt", text)]));

        let first = combine(&payload, &config());
        let second = combine(&payload, &config());
        assert_eq!(first, second);
    }
}
