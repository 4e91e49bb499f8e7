//! Paragraph chunker: split documents on blank lines, classify each
//! paragraph, and attach neighboring paragraphs as context.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tenderlens_shared::{Category, Chunk, DocumentSet};

use crate::classifier::classify;

/// Documents with fewer trimmed chars than this are skipped entirely.
pub const MIN_DOCUMENT_CHARS: usize = 100;

/// Paragraphs with fewer trimmed chars than this never become chunks.
pub const MIN_PARAGRAPH_CHARS: usize = 50;

/// One or more blank lines (possibly whitespace-only) between paragraphs.
static PARAGRAPH_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

/// Chunk every document into classified paragraphs.
///
/// Each surviving paragraph becomes one [`Chunk`] filed under every
/// category it matches, or under [`Category::Other`] when it matches none.
/// Chunk order inside a category follows document-then-paragraph order.
/// Categories with no chunks are absent from the result.
pub fn chunk_documents(documents: &DocumentSet) -> BTreeMap<Category, Vec<Chunk>> {
    let mut by_category: BTreeMap<Category, Vec<Chunk>> = BTreeMap::new();

    for (filename, content) in documents {
        if content.trim().chars().count() < MIN_DOCUMENT_CHARS {
            continue;
        }

        let paragraphs: Vec<&str> = PARAGRAPH_SPLIT
            .split(content)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        for (i, paragraph) in paragraphs.iter().enumerate() {
            if paragraph.chars().count() < MIN_PARAGRAPH_CHARS {
                continue;
            }

            let prev = if i > 0 { Some(paragraphs[i - 1]) } else { None };
            let next = paragraphs.get(i + 1).copied();
            let context: String = [prev, Some(*paragraph), next]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join("\n\n");

            // Classification looks at the paragraph alone, not its context.
            let categories = classify(paragraph);

            let chunk = Chunk {
                text: (*paragraph).to_string(),
                context,
                source: filename.clone(),
                categories: categories.clone(),
            };

            if categories.is_empty() {
                by_category.entry(Category::Other).or_default().push(chunk);
            } else {
                for category in categories {
                    by_category.entry(category).or_default().push(chunk.clone());
                }
            }
        }
    }

    by_category
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_set(entries: &[(&str, &str)]) -> DocumentSet {
        entries
            .iter()
            .map(|(name, text)| (name.to_string(), text.to_string()))
            .collect()
    }

    const FINANCIAL_PARA: &str = "The average annual turnover of the bidder shall not be \
less than rupees ten crore over the last three financial years.";
    const TECHNICAL_PARA: &str = "Bidders shall have completed similar work of value not \
less than forty percent of the estimated cost, supported by a completion certificate.";
    const PLAIN_PARA: &str = "All pages of the bid shall be numbered sequentially and \
signed by the authorized signatory of the bidding entity.";

    #[test]
    fn short_documents_are_skipped() {
        let docs = doc_set(&[("tiny.txt", "way too short to matter")]);
        assert!(chunk_documents(&docs).is_empty());
    }

    #[test]
    fn short_paragraphs_never_become_chunks() {
        let text = format!("Short line.\n\n{FINANCIAL_PARA}\n\nAlso short.");
        let docs = doc_set(&[("doc.txt", &text)]);
        let chunks = chunk_documents(&docs);

        let financial = &chunks[&Category::Financial];
        assert_eq!(financial.len(), 1);
        // The short neighbors were excluded as chunks in their own right.
        assert!(!chunks.contains_key(&Category::Other));
    }

    #[test]
    fn context_includes_neighboring_paragraphs() {
        let text = format!("{TECHNICAL_PARA}\n\n{FINANCIAL_PARA}\n\n{PLAIN_PARA}");
        let docs = doc_set(&[("doc.txt", &text)]);
        let chunks = chunk_documents(&docs);

        let financial = &chunks[&Category::Financial];
        assert_eq!(financial.len(), 1);
        assert_eq!(financial[0].text, FINANCIAL_PARA);
        assert_eq!(
            financial[0].context,
            format!("{TECHNICAL_PARA}\n\n{FINANCIAL_PARA}\n\n{PLAIN_PARA}")
        );
        assert_eq!(financial[0].source, "doc.txt");
    }

    #[test]
    fn edge_paragraphs_skip_absent_neighbors() {
        let text = format!("{TECHNICAL_PARA}\n\n{PLAIN_PARA}");
        let docs = doc_set(&[("doc.txt", &text)]);
        let chunks = chunk_documents(&docs);

        let technical = &chunks[&Category::Technical];
        assert_eq!(
            technical[0].context,
            format!("{TECHNICAL_PARA}\n\n{PLAIN_PARA}")
        );
    }

    #[test]
    fn unmatched_paragraphs_go_to_other() {
        let text = format!("{PLAIN_PARA}\n\n{PLAIN_PARA} Again, with more detail.");
        let docs = doc_set(&[("doc.txt", &text)]);
        let chunks = chunk_documents(&docs);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[&Category::Other].len(), 2);
        assert!(chunks[&Category::Other][0].categories.is_empty());
    }

    #[test]
    fn multi_category_paragraph_is_filed_under_each() {
        let para = "The joint venture shall furnish an annual turnover certificate \
for every member, and the lead partner carries primary responsibility.";
        let text = format!("{para}\n\n{PLAIN_PARA}");
        let docs = doc_set(&[("doc.txt", &text)]);
        let chunks = chunk_documents(&docs);

        assert_eq!(chunks[&Category::Financial][0].text, para);
        assert_eq!(chunks[&Category::JointVenture][0].text, para);
        assert_eq!(
            chunks[&Category::Financial][0].categories,
            vec![Category::Financial, Category::JointVenture]
        );
    }

    #[test]
    fn chunks_preserve_document_then_paragraph_order() {
        let text_a = format!("{FINANCIAL_PARA}\n\n{PLAIN_PARA}");
        let text_b = format!("{FINANCIAL_PARA} Second document copy with extra words.");
        let docs = doc_set(&[("a.txt", &text_a), ("b.txt", &text_b)]);
        let chunks = chunk_documents(&docs);

        let financial = &chunks[&Category::Financial];
        assert_eq!(financial.len(), 2);
        assert_eq!(financial[0].source, "a.txt");
        assert_eq!(financial[1].source, "b.txt");
    }

    #[test]
    fn blank_lines_with_whitespace_still_split() {
        let text = format!("{FINANCIAL_PARA}\n   \n{TECHNICAL_PARA}");
        let docs = doc_set(&[("doc.txt", &text)]);
        let chunks = chunk_documents(&docs);

        assert_eq!(chunks[&Category::Financial].len(), 1);
        assert_eq!(chunks[&Category::Technical].len(), 1);
    }
}
